//! Menu publishing service.
//!
//! Orchestrates menu reads and writes against a [`MenuStore`]:
//! - full-menu reads that join a menu with its ordered categories and items
//! - replace-all saves of a menu's categories and items
//! - slug assignment when a menu is published
//!
//! Every operation receives the acting owner explicitly; nothing here reads
//! ambient session state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::identity::OwnerId;
use crate::models::{Menu, MenuDraft, MenuSummary};
use crate::services::slug::{is_valid_slug, public_url, slugify, with_random_suffix};
use crate::store::{
    CategoryRecord, ItemRecord, MAX_PRICE, MenuContents, MenuStore, MenuUpdate, NewMenu,
    StoreError,
};

/// How many slugs a first-time publish tries before giving up on collisions.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Errors from menu operations.
///
/// A menu that does not exist on a read is `Ok(None)`, not an error.
#[derive(Debug, Error)]
pub enum MenuError {
    /// The draft was rejected before anything was written.
    #[error("invalid menu: {0}")]
    Validation(String),

    /// The menu does not exist or is not owned by the caller (writes only).
    #[error("menu not found")]
    NotFound,

    /// The store failed or rejected the write.
    #[error(transparent)]
    DataAccess(#[from] StoreError),
}

impl MenuError {
    fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Menu publishing service.
pub struct MenuPublishingService {
    store: Arc<dyn MenuStore>,
    /// Origin that public URLs are built under, e.g. `https://quickmenu.app`.
    site_url: String,
}

impl MenuPublishingService {
    /// Create a new publishing service.
    pub fn new(store: Arc<dyn MenuStore>, site_url: impl Into<String>) -> Self {
        Self {
            store,
            site_url: site_url.into(),
        }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &Arc<dyn MenuStore> {
        &self.store
    }

    /// Origin used for public URLs.
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Menus owned by `owner`, newest first, without categories or items.
    pub async fn list_owned_menus(&self, owner: OwnerId) -> Result<Vec<MenuSummary>, MenuError> {
        let menus = self.store.list_menus_by_owner(owner.as_uuid()).await?;
        Ok(menus.into_iter().map(MenuSummary::from).collect())
    }

    /// Load a menu with its categories and items.
    ///
    /// No ownership check happens here. Items whose category reference does
    /// not resolve come back with an empty category name.
    pub async fn get_full_menu(&self, menu_id: Uuid) -> Result<Option<Menu>, MenuError> {
        let Some(record) = self.store.find_menu(menu_id).await? else {
            return Ok(None);
        };

        let categories = self.store.list_categories(menu_id).await?;
        let items = self.store.list_items(menu_id).await?;

        Ok(Some(Menu::assemble(record, categories, items)))
    }

    /// Load a published menu by slug.
    ///
    /// Unknown slugs and unpublished menus both yield `None`.
    pub async fn get_public_menu(&self, slug: &str) -> Result<Option<Menu>, MenuError> {
        if slug.is_empty() {
            return Ok(None);
        }

        let Some(record) = self.store.find_published_by_slug(slug).await? else {
            debug!(slug = %slug, "no published menu for slug");
            return Ok(None);
        };

        self.get_full_menu(record.id).await
    }

    /// Create an empty, unpublished menu and return its id.
    pub async fn create_menu(
        &self,
        owner: OwnerId,
        business_name: &str,
        currency: &str,
    ) -> Result<Uuid, MenuError> {
        if business_name.trim().is_empty() {
            return Err(MenuError::validation("business name is required"));
        }

        let record = self
            .store
            .insert_menu(NewMenu {
                user_id: owner.as_uuid(),
                business_name: business_name.to_string(),
                currency: currency.to_string(),
            })
            .await?;

        info!(menu_id = %record.id, owner_id = %owner, "menu created");
        Ok(record.id)
    }

    /// Whether no menu currently holds `slug`.
    ///
    /// Advisory only: another save may claim the slug before this caller's
    /// save lands, in which case the store's constraint rejects it.
    pub async fn check_slug_availability(&self, slug: &str) -> Result<bool, MenuError> {
        if slug.is_empty() {
            return Ok(false);
        }
        Ok(self.store.slug_holder(slug).await?.is_none())
    }

    /// Replace a menu's details, categories, and items with `draft`.
    ///
    /// Categories get fresh ids and `sort_order` equal to their position.
    /// Items keep their id when one is supplied and reference categories by
    /// the new ids; an item naming a category absent from `draft.categories`
    /// is stored unassigned. The menu is published iff `draft.public_url` is
    /// non-empty, and the stored URL is always rebuilt from the site origin
    /// and slug. The whole replacement is applied atomically.
    pub async fn save_full_menu(&self, draft: &MenuDraft, owner: OwnerId) -> Result<(), MenuError> {
        validate_draft(draft)?;

        let url = if draft.public_url.is_empty() {
            String::new()
        } else {
            public_url(&self.site_url, &draft.slug)
        };
        let contents = build_contents(draft, owner, url);
        let unassigned = contents
            .items
            .iter()
            .filter(|i| i.category_id.is_none())
            .count();
        if unassigned > 0 {
            warn!(
                menu_id = %draft.id,
                count = unassigned,
                "items reference categories missing from the saved list"
            );
        }

        let published = contents.menu.is_published;
        let (categories, items) = (contents.categories.len(), contents.items.len());

        if !self.store.replace_menu_contents(contents).await? {
            return Err(MenuError::NotFound);
        }

        info!(
            menu_id = %draft.id,
            owner_id = %owner,
            published,
            categories,
            items,
            "menu saved"
        );
        Ok(())
    }

    /// Publish a menu: assign its slug and public URL, then save `draft`.
    ///
    /// An already-published menu keeps its slug. Otherwise the slug is derived
    /// from the business name, with a random `-N` suffix when another menu holds
    /// it; if the store still rejects the slug, a new suffix is tried, up to
    /// [`MAX_SLUG_ATTEMPTS`] times.
    pub async fn publish_menu(
        &self,
        mut draft: MenuDraft,
        owner: OwnerId,
    ) -> Result<Menu, MenuError> {
        let existing = self
            .store
            .find_menu(draft.id)
            .await?
            .filter(|m| m.user_id == owner.as_uuid())
            .ok_or(MenuError::NotFound)?;

        let existing_slug = existing
            .slug
            .filter(|s| existing.is_published && !s.is_empty());
        let first_publish = existing_slug.is_none();

        let base = slugify(&draft.business_name);
        let mut slug = match existing_slug {
            Some(slug) => slug,
            None => {
                if base.is_empty() {
                    return Err(MenuError::validation(
                        "business name must contain at least one ASCII letter or digit",
                    ));
                }
                match self.store.slug_holder(&base).await? {
                    Some(holder) if holder != draft.id => with_random_suffix(&base),
                    _ => base.clone(),
                }
            }
        };

        let mut attempt = 1;
        loop {
            draft.public_url = public_url(&self.site_url, &slug);
            draft.slug = slug;

            match self.save_full_menu(&draft, owner).await {
                Ok(()) => break,
                Err(MenuError::DataAccess(StoreError::SlugConflict(taken)))
                    if first_publish && attempt < MAX_SLUG_ATTEMPTS =>
                {
                    warn!(menu_id = %draft.id, slug = %taken, attempt, "slug taken, retrying");
                    attempt += 1;
                    slug = with_random_suffix(&base);
                }
                Err(e) => return Err(e),
            }
        }

        info!(menu_id = %draft.id, slug = %draft.slug, "menu published");

        self.get_full_menu(draft.id)
            .await?
            .ok_or(MenuError::NotFound)
    }

    /// Delete a menu owned by `owner`, with its categories and items.
    pub async fn delete_menu(&self, menu_id: Uuid, owner: OwnerId) -> Result<bool, MenuError> {
        let deleted = self.store.delete_menu(menu_id, owner.as_uuid()).await?;
        if deleted {
            info!(menu_id = %menu_id, owner_id = %owner, "menu deleted");
        }
        Ok(deleted)
    }
}

/// Reject drafts the store would refuse, before anything is written.
pub fn validate_draft(draft: &MenuDraft) -> Result<(), MenuError> {
    if draft.business_name.trim().is_empty() {
        return Err(MenuError::validation("business name is required"));
    }

    if !draft.slug.is_empty() && !is_valid_slug(&draft.slug) {
        return Err(MenuError::validation(format!(
            "slug {:?} may only contain lowercase letters, digits, and single hyphens",
            draft.slug
        )));
    }

    if !draft.public_url.is_empty() && draft.slug.is_empty() {
        return Err(MenuError::validation("a published menu needs a slug"));
    }

    let mut names = HashSet::new();
    for name in &draft.categories {
        if name.trim().is_empty() {
            return Err(MenuError::validation("category names must not be empty"));
        }
        if !names.insert(name.as_str()) {
            return Err(MenuError::validation(format!("duplicate category {name:?}")));
        }
    }

    let mut ids = HashSet::new();
    for item in &draft.items {
        if item.name.trim().is_empty() {
            return Err(MenuError::validation("item names must not be empty"));
        }
        if !item.price.is_finite() || !(0.0..=MAX_PRICE).contains(&item.price) {
            return Err(MenuError::validation(format!(
                "item {:?} has an invalid price",
                item.name
            )));
        }
        if let Some(id) = item.id {
            if !ids.insert(id) {
                return Err(MenuError::validation(format!("duplicate item id {id}")));
            }
        }
    }

    Ok(())
}

/// Turn a draft into the rows written by a save, with `public_url` as the
/// stored URL.
fn build_contents(draft: &MenuDraft, owner: OwnerId, public_url: String) -> MenuContents {
    let categories: Vec<CategoryRecord> = draft
        .categories
        .iter()
        .enumerate()
        .map(|(position, name)| CategoryRecord {
            id: Uuid::now_v7(),
            menu_id: draft.id,
            name: name.clone(),
            sort_order: sort_order(position),
        })
        .collect();

    let by_name: HashMap<&str, Uuid> = categories
        .iter()
        .map(|c| (c.name.as_str(), c.id))
        .collect();

    let items = draft
        .items
        .iter()
        .enumerate()
        .map(|(position, item)| ItemRecord {
            id: item.id.unwrap_or_else(Uuid::now_v7),
            menu_id: draft.id,
            category_id: by_name.get(item.category.as_str()).copied(),
            name: item.name.clone(),
            price: item.price,
            description: item.description.clone(),
            has_image: item.has_image,
            image_url: item.image_url.clone(),
            is_available: item.is_available,
            sort_order: sort_order(position),
        })
        .collect();

    MenuContents {
        menu_id: draft.id,
        owner_id: owner.as_uuid(),
        menu: MenuUpdate {
            business_name: draft.business_name.clone(),
            currency: draft.currency.clone(),
            slug: (!draft.slug.is_empty()).then(|| draft.slug.clone()),
            is_published: !public_url.is_empty(),
            public_url,
        },
        categories,
        items,
    }
}

fn sort_order(position: usize) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::MenuItemDraft;

    fn item(name: &str, category: &str, price: f64) -> MenuItemDraft {
        MenuItemDraft {
            id: None,
            name: name.to_string(),
            price,
            description: String::new(),
            category: category.to_string(),
            has_image: false,
            image_url: None,
            is_available: true,
        }
    }

    fn draft() -> MenuDraft {
        MenuDraft {
            id: Uuid::now_v7(),
            business_name: "Roma".to_string(),
            currency: "EUR".to_string(),
            categories: vec!["Mains".to_string(), "Drinks".to_string()],
            items: vec![item("Lasagne", "Mains", 12.5), item("Chinotto", "Drinks", 3.0)],
            ..MenuDraft::default()
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate_draft(&draft()).is_ok());
    }

    #[test]
    fn rejects_blank_business_name() {
        let mut d = draft();
        d.business_name = "   ".to_string();
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_categories() {
        let mut d = draft();
        d.categories.push("Mains".to_string());
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));
    }

    #[test]
    fn rejects_negative_and_nan_prices() {
        let mut d = draft();
        d.items[0].price = -1.0;
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));

        d.items[0].price = f64::NAN;
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));
    }

    #[test]
    fn rejects_prices_beyond_column_range() {
        let mut d = draft();
        d.items[0].price = MAX_PRICE;
        assert!(validate_draft(&d).is_ok());

        d.items[0].price = 1e8;
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));
    }

    #[test]
    fn rejects_public_url_without_slug() {
        let mut d = draft();
        d.public_url = "https://quickmenu.app/menu/".to_string();
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));
    }

    #[test]
    fn rejects_malformed_slug() {
        let mut d = draft();
        d.slug = "Roma Cafe".to_string();
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_item_ids() {
        let mut d = draft();
        let id = Uuid::now_v7();
        d.items[0].id = Some(id);
        d.items[1].id = Some(id);
        assert!(matches!(validate_draft(&d), Err(MenuError::Validation(_))));
    }

    #[test]
    fn build_contents_orders_and_links() {
        let mut d = draft();
        d.items.push(item("Mystery", "Desserts", 5.0));
        let contents = build_contents(&d, OwnerId(Uuid::now_v7()), String::new());

        assert_eq!(contents.categories[0].name, "Mains");
        assert_eq!(contents.categories[0].sort_order, 0);
        assert_eq!(contents.categories[1].sort_order, 1);

        assert_eq!(contents.items[0].category_id, Some(contents.categories[0].id));
        assert_eq!(contents.items[1].category_id, Some(contents.categories[1].id));
        assert_eq!(contents.items[2].category_id, None);
        assert_eq!(contents.items[2].sort_order, 2);

        assert!(!contents.menu.is_published);
        assert_eq!(contents.menu.slug, None);
    }

    #[test]
    fn build_contents_keeps_item_ids_and_publish_flag() {
        let mut d = draft();
        let id = Uuid::now_v7();
        d.items[0].id = Some(id);
        d.slug = "roma".to_string();

        let contents = build_contents(
            &d,
            OwnerId(Uuid::now_v7()),
            "https://quickmenu.app/menu/roma".to_string(),
        );
        assert_eq!(contents.items[0].id, id);
        assert!(contents.menu.is_published);
        assert_eq!(contents.menu.slug.as_deref(), Some("roma"));
    }
}

//! In-process menu store.
//!
//! Mirrors the PostgreSQL schema's constraints (unique slug, unique category
//! name per menu, primary keys, category foreign key) so that services behave
//! the same against either backend. Writes take a single lock, which makes
//! [`MenuStore::replace_menu_contents`] atomic.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{
    CategoryRecord, ItemRecord, MAX_PRICE, MenuContents, MenuRecord, MenuStore, NewMenu,
    StoreError,
};

#[derive(Debug, Default)]
struct Tables {
    menus: Vec<MenuRecord>,
    categories: Vec<CategoryRecord>,
    items: Vec<ItemRecord>,
}

/// Menu store holding all rows in memory.
#[derive(Debug, Default)]
pub struct MemoryMenuStore {
    tables: RwLock<Tables>,
}

impl MemoryMenuStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a single category, leaving its items unassigned.
    ///
    /// Matches `ON DELETE SET NULL` on `items.category_id`.
    pub fn delete_category(&self, category_id: Uuid) -> bool {
        let mut tables = self.tables.write();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != category_id);
        for item in &mut tables.items {
            if item.category_id == Some(category_id) {
                item.category_id = None;
            }
        }
        tables.categories.len() != before
    }
}

/// Check the replacement rows against the constraints the SQL schema enforces.
fn check_constraints(tables: &Tables, contents: &MenuContents) -> Result<(), StoreError> {
    let menu_id = contents.menu_id;

    if let Some(slug) = &contents.menu.slug {
        let taken = tables
            .menus
            .iter()
            .any(|m| m.id != menu_id && m.slug.as_deref() == Some(slug.as_str()));
        if taken {
            return Err(StoreError::SlugConflict(slug.clone()));
        }
    }

    let mut names = HashSet::new();
    let mut category_ids = HashSet::new();
    for category in &contents.categories {
        if !names.insert(category.name.as_str()) {
            return Err(StoreError::Constraint(format!(
                "duplicate category name {:?}",
                category.name
            )));
        }
        let foreign = tables
            .categories
            .iter()
            .any(|c| c.id == category.id && c.menu_id != menu_id);
        if foreign || !category_ids.insert(category.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate category id {}",
                category.id
            )));
        }
    }

    let mut item_ids = HashSet::new();
    for item in &contents.items {
        let foreign = tables
            .items
            .iter()
            .any(|i| i.id == item.id && i.menu_id != menu_id);
        if foreign || !item_ids.insert(item.id) {
            return Err(StoreError::Constraint(format!("duplicate item id {}", item.id)));
        }
        if let Some(category_id) = item.category_id {
            if !category_ids.contains(&category_id) {
                return Err(StoreError::Constraint(format!(
                    "item {} references unknown category {category_id}",
                    item.id
                )));
            }
        }
        if item.price.is_nan() || item.price < 0.0 {
            return Err(StoreError::Constraint(format!(
                "item {} has negative price",
                item.id
            )));
        }
        if item.price > MAX_PRICE {
            return Err(StoreError::Constraint(format!(
                "item {} price overflows",
                item.id
            )));
        }
    }

    Ok(())
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn list_menus_by_owner(&self, owner_id: Uuid) -> Result<Vec<MenuRecord>, StoreError> {
        let tables = self.tables.read();
        let mut menus: Vec<MenuRecord> = tables
            .menus
            .iter()
            .filter(|m| m.user_id == owner_id)
            .cloned()
            .collect();
        menus.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(menus)
    }

    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, StoreError> {
        let tables = self.tables.read();
        Ok(tables.menus.iter().find(|m| m.id == id).cloned())
    }

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<MenuRecord>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .menus
            .iter()
            .find(|m| m.is_published && m.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn slug_holder(&self, slug: &str) -> Result<Option<Uuid>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .menus
            .iter()
            .find(|m| m.slug.as_deref() == Some(slug))
            .map(|m| m.id))
    }

    async fn list_categories(&self, menu_id: Uuid) -> Result<Vec<CategoryRecord>, StoreError> {
        let tables = self.tables.read();
        let mut categories: Vec<CategoryRecord> = tables
            .categories
            .iter()
            .filter(|c| c.menu_id == menu_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| (c.sort_order, c.id));
        Ok(categories)
    }

    async fn list_items(&self, menu_id: Uuid) -> Result<Vec<ItemRecord>, StoreError> {
        let tables = self.tables.read();
        let mut items: Vec<ItemRecord> = tables
            .items
            .iter()
            .filter(|i| i.menu_id == menu_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.sort_order, i.id));
        Ok(items)
    }

    async fn insert_menu(&self, input: NewMenu) -> Result<MenuRecord, StoreError> {
        let record = MenuRecord {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            business_name: input.business_name,
            slug: None,
            public_url: String::new(),
            currency: input.currency,
            is_published: false,
            created_at: Utc::now(),
        };
        self.tables.write().menus.push(record.clone());
        Ok(record)
    }

    async fn replace_menu_contents(&self, contents: MenuContents) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();

        let Some(position) = tables
            .menus
            .iter()
            .position(|m| m.id == contents.menu_id && m.user_id == contents.owner_id)
        else {
            return Ok(false);
        };

        check_constraints(&tables, &contents)?;

        let menu = &mut tables.menus[position];
        menu.business_name = contents.menu.business_name;
        menu.currency = contents.menu.currency;
        menu.slug = contents.menu.slug;
        menu.public_url = contents.menu.public_url;
        menu.is_published = contents.menu.is_published;

        let menu_id = contents.menu_id;
        tables.items.retain(|i| i.menu_id != menu_id);
        tables.categories.retain(|c| c.menu_id != menu_id);
        tables.categories.extend(contents.categories);
        tables.items.extend(contents.items);

        Ok(true)
    }

    async fn delete_menu(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        let before = tables.menus.len();
        tables.menus.retain(|m| !(m.id == id && m.user_id == owner_id));
        if tables.menus.len() == before {
            return Ok(false);
        }
        tables.items.retain(|i| i.menu_id != id);
        tables.categories.retain(|c| c.menu_id != id);
        Ok(true)
    }

    async fn health(&self) -> bool {
        true
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MenuUpdate;

    fn update(slug: Option<&str>) -> MenuUpdate {
        MenuUpdate {
            business_name: "Roma".to_string(),
            currency: "EUR".to_string(),
            slug: slug.map(String::from),
            public_url: String::new(),
            is_published: false,
        }
    }

    async fn menu(store: &MemoryMenuStore, owner: Uuid) -> MenuRecord {
        store
            .insert_menu(NewMenu {
                user_id: owner,
                business_name: "Roma".to_string(),
                currency: "EUR".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn replace_rejects_slug_held_by_other_menu() {
        let store = MemoryMenuStore::new();
        let owner = Uuid::now_v7();
        let first = menu(&store, owner).await;
        let second = menu(&store, owner).await;

        let written = store
            .replace_menu_contents(MenuContents {
                menu_id: first.id,
                owner_id: owner,
                menu: update(Some("roma")),
                categories: Vec::new(),
                items: Vec::new(),
            })
            .await
            .unwrap();
        assert!(written);

        let err = store
            .replace_menu_contents(MenuContents {
                menu_id: second.id,
                owner_id: owner,
                menu: update(Some("roma")),
                categories: Vec::new(),
                items: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SlugConflict(s) if s == "roma"));
    }

    #[tokio::test]
    async fn replace_ignores_other_owners() {
        let store = MemoryMenuStore::new();
        let record = menu(&store, Uuid::now_v7()).await;

        let written = store
            .replace_menu_contents(MenuContents {
                menu_id: record.id,
                owner_id: Uuid::now_v7(),
                menu: update(None),
                categories: Vec::new(),
                items: Vec::new(),
            })
            .await
            .unwrap();
        assert!(!written);
    }

    #[tokio::test]
    async fn deleting_category_leaves_items_unassigned() {
        let store = MemoryMenuStore::new();
        let owner = Uuid::now_v7();
        let record = menu(&store, owner).await;
        let category = CategoryRecord {
            id: Uuid::now_v7(),
            menu_id: record.id,
            name: "Mains".to_string(),
            sort_order: 0,
        };
        let item = ItemRecord {
            id: Uuid::now_v7(),
            menu_id: record.id,
            category_id: Some(category.id),
            name: "Lasagne".to_string(),
            price: 12.0,
            description: String::new(),
            has_image: false,
            image_url: None,
            is_available: true,
            sort_order: 0,
        };
        store
            .replace_menu_contents(MenuContents {
                menu_id: record.id,
                owner_id: owner,
                menu: update(None),
                categories: vec![category.clone()],
                items: vec![item],
            })
            .await
            .unwrap();

        assert!(store.delete_category(category.id));

        let items = store.list_items(record.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category_id, None);
    }

    #[tokio::test]
    async fn delete_menu_cascades() {
        let store = MemoryMenuStore::new();
        let owner = Uuid::now_v7();
        let record = menu(&store, owner).await;
        store
            .replace_menu_contents(MenuContents {
                menu_id: record.id,
                owner_id: owner,
                menu: update(None),
                categories: vec![CategoryRecord {
                    id: Uuid::now_v7(),
                    menu_id: record.id,
                    name: "Drinks".to_string(),
                    sort_order: 0,
                }],
                items: Vec::new(),
            })
            .await
            .unwrap();

        assert!(!store.delete_menu(record.id, Uuid::now_v7()).await.unwrap());
        assert!(store.delete_menu(record.id, owner).await.unwrap());
        assert!(store.find_menu(record.id).await.unwrap().is_none());
        assert!(store.list_categories(record.id).await.unwrap().is_empty());
    }
}

//! Menu models.
//!
//! Three shapes of the same data:
//! - [`Menu`]: the fully joined read model (menu + ordered categories + items)
//! - [`MenuSummary`]: the shallow dashboard view, without categories or items
//! - [`MenuDraft`]: the owner's in-memory menu submitted on save
//!
//! [`PublicMenu`] is what unauthenticated readers get: the content of a
//! [`Menu`] without its owner or bookkeeping fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{CategoryRecord, ItemRecord, MenuRecord};

/// A menu with its categories and items resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Owning user.
    pub owner_id: Uuid,

    /// Business name shown on the menu.
    pub business_name: String,

    /// Public lookup key. Empty until the menu is published.
    pub slug: String,

    /// Full public URL (origin + `/menu/` + slug). Empty when unpublished.
    pub public_url: String,

    /// Currency code, free text.
    pub currency: String,

    /// When the menu was created.
    pub created_at: DateTime<Utc>,

    /// Whether unauthenticated readers may see the menu.
    pub is_published: bool,

    /// Category names in display order.
    pub categories: Vec<String>,

    /// Items in display order.
    pub items: Vec<MenuItem>,
}

/// A single dish or drink on a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,

    /// Category name. Empty when the stored category reference does not
    /// resolve to a category of the same menu.
    pub category: String,

    /// Image toggle, independent of whether `image_url` is set.
    pub has_image: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// False when the item is sold out.
    pub is_available: bool,

    pub sort_order: i32,
}

/// Published menu as served to the public viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicMenu {
    pub id: Uuid,
    pub business_name: String,
    pub slug: String,
    pub public_url: String,
    pub currency: String,
    pub categories: Vec<String>,
    pub items: Vec<MenuItem>,
}

impl From<Menu> for PublicMenu {
    fn from(menu: Menu) -> Self {
        Self {
            id: menu.id,
            business_name: menu.business_name,
            slug: menu.slug,
            public_url: menu.public_url,
            currency: menu.currency,
            categories: menu.categories,
            items: menu.items,
        }
    }
}

/// Dashboard view of a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSummary {
    pub id: Uuid,
    pub business_name: String,
    pub slug: String,
    pub public_url: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub is_published: bool,
}

/// The owner's full menu as submitted to a save.
///
/// Categories are given by name, in display order. Items reference their
/// category by name and are stored in the order given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuDraft {
    pub id: Uuid,
    pub business_name: String,
    pub currency: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub items: Vec<MenuItemDraft>,
}

/// An item inside a [`MenuDraft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemDraft {
    /// Existing item id. Omitted for items added since the last save.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Menu {
    /// Assemble a menu from its three stored parts.
    ///
    /// Each item's category identifier is resolved against `categories`;
    /// an identifier that does not resolve (or is absent) yields an empty
    /// category name rather than an error.
    pub fn assemble(
        record: MenuRecord,
        categories: Vec<CategoryRecord>,
        items: Vec<ItemRecord>,
    ) -> Self {
        let items = items
            .into_iter()
            .map(|item| {
                let category = item
                    .category_id
                    .and_then(|cid| categories.iter().find(|c| c.id == cid))
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                MenuItem {
                    id: item.id,
                    name: item.name,
                    price: item.price,
                    description: item.description,
                    category,
                    has_image: item.has_image,
                    image_url: item.image_url,
                    is_available: item.is_available,
                    sort_order: item.sort_order,
                }
            })
            .collect();

        Self {
            id: record.id,
            owner_id: record.user_id,
            business_name: record.business_name,
            slug: record.slug.unwrap_or_default(),
            public_url: record.public_url,
            currency: record.currency,
            created_at: record.created_at,
            is_published: record.is_published,
            categories: categories.into_iter().map(|c| c.name).collect(),
            items,
        }
    }

    /// Whether the menu resolves for public readers.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_published && !self.slug.is_empty()
    }

    /// Convert back into a draft, e.g. to re-save or publish it.
    pub fn to_draft(&self) -> MenuDraft {
        MenuDraft {
            id: self.id,
            business_name: self.business_name.clone(),
            currency: self.currency.clone(),
            slug: self.slug.clone(),
            public_url: self.public_url.clone(),
            categories: self.categories.clone(),
            items: self
                .items
                .iter()
                .map(|item| MenuItemDraft {
                    id: Some(item.id),
                    name: item.name.clone(),
                    price: item.price,
                    description: item.description.clone(),
                    category: item.category.clone(),
                    has_image: item.has_image,
                    image_url: item.image_url.clone(),
                    is_available: item.is_available,
                })
                .collect(),
        }
    }
}

impl From<MenuRecord> for MenuSummary {
    fn from(record: MenuRecord) -> Self {
        Self {
            id: record.id,
            business_name: record.business_name,
            slug: record.slug.unwrap_or_default(),
            public_url: record.public_url,
            currency: record.currency,
            created_at: record.created_at,
            is_published: record.is_published,
        }
    }
}

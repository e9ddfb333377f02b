//! Relational storage for menus, categories, and items.
//!
//! [`MenuStore`] is the seam between the publishing service and the database.
//! Two backends implement it: [`PgMenuStore`] (PostgreSQL via sqlx) and
//! [`MemoryMenuStore`] (in-process tables, used for tests and `memory://`).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryMenuStore;
pub use postgres::PgMenuStore;

/// Name of the unique constraint on `menus.slug`.
pub const SLUG_CONSTRAINT: &str = "menus_slug_key";

/// Largest price `items.price NUMERIC(10, 2)` can hold.
pub const MAX_PRICE: f64 = 99_999_999.99;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another menu already holds the slug.
    #[error("slug already taken: {0}")]
    SlugConflict(String),

    /// Any other integrity violation (duplicate key, foreign key, check).
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Row of the `menus` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    /// `NULL` until published.
    pub slug: Option<String>,
    pub public_url: String,
    pub currency: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Row of the `categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub name: String,
    pub sort_order: i32,
}

/// Row of the `items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemRecord {
    pub id: Uuid,
    pub menu_id: Uuid,
    /// `NULL` when unassigned or when the category was deleted.
    pub category_id: Option<Uuid>,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub has_image: bool,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
}

/// Input for creating a menu row.
#[derive(Debug, Clone)]
pub struct NewMenu {
    pub user_id: Uuid,
    pub business_name: String,
    pub currency: String,
}

/// Column values written to the menu row on save.
#[derive(Debug, Clone)]
pub struct MenuUpdate {
    pub business_name: String,
    pub currency: String,
    /// `None` clears the slug.
    pub slug: Option<String>,
    pub public_url: String,
    pub is_published: bool,
}

/// Everything written by one save: the menu row plus the full replacement
/// set of categories and items.
#[derive(Debug, Clone)]
pub struct MenuContents {
    pub menu_id: Uuid,
    pub owner_id: Uuid,
    pub menu: MenuUpdate,
    pub categories: Vec<CategoryRecord>,
    pub items: Vec<ItemRecord>,
}

/// Storage backend for menus.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Menus owned by `owner_id`, newest first.
    async fn list_menus_by_owner(&self, owner_id: Uuid) -> Result<Vec<MenuRecord>, StoreError>;

    /// A menu row by id.
    async fn find_menu(&self, id: Uuid) -> Result<Option<MenuRecord>, StoreError>;

    /// The menu holding `slug`, only if it is published.
    async fn find_published_by_slug(&self, slug: &str)
    -> Result<Option<MenuRecord>, StoreError>;

    /// Id of the menu currently holding `slug`, published or not.
    async fn slug_holder(&self, slug: &str) -> Result<Option<Uuid>, StoreError>;

    /// Categories of a menu ordered by `sort_order`.
    async fn list_categories(&self, menu_id: Uuid) -> Result<Vec<CategoryRecord>, StoreError>;

    /// Items of a menu ordered by `sort_order`.
    async fn list_items(&self, menu_id: Uuid) -> Result<Vec<ItemRecord>, StoreError>;

    /// Create an unpublished menu with no categories or items.
    async fn insert_menu(&self, input: NewMenu) -> Result<MenuRecord, StoreError>;

    /// Atomically update the menu row and replace all of its categories and
    /// items.
    ///
    /// Returns `false` without writing anything when no menu with that id is
    /// owned by `contents.owner_id`. On error nothing is written.
    async fn replace_menu_contents(&self, contents: MenuContents) -> Result<bool, StoreError>;

    /// Delete a menu owned by `owner_id`; categories and items cascade.
    async fn delete_menu(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError>;

    /// Whether the backend is reachable.
    async fn health(&self) -> bool;
}

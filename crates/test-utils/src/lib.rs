//! QuickMenu test utilities.
//!
//! Helpers for integration testing: draft fixtures, an in-memory wiring of
//! the kernel services, and a canned AI generator.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use quickmenu_kernel::file::{ImageUploadService, LocalFileStorage};
use quickmenu_kernel::identity::{MemoryIdentityProvider, OwnerId};
use quickmenu_kernel::models::{MenuDraft, MenuItemDraft};
use quickmenu_kernel::services::{
    GeneratedItem, GeneratedMenu, GeneratorError, MenuGenerator, MenuPublishingService,
};
use quickmenu_kernel::state::AppState;
use quickmenu_kernel::store::{MemoryMenuStore, MenuStore};

/// Origin used for public URLs in tests.
pub const TEST_SITE_URL: &str = "https://quickmenu.test";

/// A fresh owner id that is not tied to any account.
pub fn test_owner() -> OwnerId {
    OwnerId(Uuid::now_v7())
}

/// A publishing service over a fresh in-memory store.
///
/// The store is returned as well so tests can inspect or tamper with rows.
pub fn memory_service() -> (MenuPublishingService, Arc<MemoryMenuStore>) {
    let store = Arc::new(MemoryMenuStore::new());
    let service = MenuPublishingService::new(
        Arc::clone(&store) as Arc<dyn MenuStore>,
        TEST_SITE_URL,
    );
    (service, store)
}

/// Application state backed entirely by in-memory adapters.
///
/// Uploads are written under `uploads_dir` and served from `/files`.
pub fn memory_state(uploads_dir: &Path, generator: Option<Arc<dyn MenuGenerator>>) -> AppState {
    let (menus, _) = memory_service();
    AppState::from_parts(
        menus,
        Arc::new(MemoryIdentityProvider::new()),
        ImageUploadService::new(Arc::new(LocalFileStorage::new(uploads_dir, "/files"))),
        generator,
    )
}

/// Start building a draft for `menu_id`.
pub fn test_draft(menu_id: Uuid, business_name: &str) -> DraftBuilder {
    DraftBuilder {
        draft: MenuDraft {
            id: menu_id,
            business_name: business_name.to_string(),
            currency: "EUR".to_string(),
            ..MenuDraft::default()
        },
    }
}

/// A menu draft builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct DraftBuilder {
    draft: MenuDraft,
}

impl DraftBuilder {
    /// Set the currency.
    pub fn currency(mut self, currency: &str) -> Self {
        self.draft.currency = currency.to_string();
        self
    }

    /// Append a category.
    pub fn category(mut self, name: &str) -> Self {
        self.draft.categories.push(name.to_string());
        self
    }

    /// Append an item in `category`.
    pub fn item(mut self, name: &str, price: f64, category: &str) -> Self {
        self.draft.items.push(test_item(name, price, category));
        self
    }

    /// Append a fully specified item.
    pub fn with_item(mut self, item: MenuItemDraft) -> Self {
        self.draft.items.push(item);
        self
    }

    /// Mark the draft as published under `slug`.
    pub fn published(mut self, slug: &str) -> Self {
        self.draft.slug = slug.to_string();
        self.draft.public_url = format!("{TEST_SITE_URL}/menu/{slug}");
        self
    }

    pub fn build(self) -> MenuDraft {
        self.draft
    }
}

/// An available item without an image.
pub fn test_item(name: &str, price: f64, category: &str) -> MenuItemDraft {
    MenuItemDraft {
        id: None,
        name: name.to_string(),
        price,
        description: format!("{name}, freshly made"),
        category: category.to_string(),
        has_image: false,
        image_url: None,
        is_available: true,
    }
}

/// Menu generator that always returns the same suggestion.
#[derive(Debug, Clone)]
pub struct StubGenerator {
    pub menu: GeneratedMenu,
}

impl StubGenerator {
    /// A small coffee-shop suggestion.
    pub fn coffee() -> Self {
        Self {
            menu: GeneratedMenu {
                categories: vec!["Coffee".to_string(), "Pastries".to_string()],
                items: vec![
                    GeneratedItem {
                        name: "Flat White".to_string(),
                        description: "Double ristretto, steamed milk".to_string(),
                        price: 3.8,
                        category: "Coffee".to_string(),
                    },
                    GeneratedItem {
                        name: "Croissant".to_string(),
                        description: "Butter, laminated".to_string(),
                        price: 2.5,
                        category: "Pastries".to_string(),
                    },
                ],
            },
        }
    }
}

#[async_trait]
impl MenuGenerator for StubGenerator {
    async fn generate_menu(
        &self,
        _cuisine: &str,
        _business_name: &str,
    ) -> Result<GeneratedMenu, GeneratorError> {
        Ok(self.menu.clone())
    }
}

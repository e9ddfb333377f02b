//! Domain models.

pub mod menu;
pub mod user;

pub use menu::{Menu, MenuDraft, MenuItem, MenuItemDraft, MenuSummary, PublicMenu};
pub use user::User;

//! Menu services.
//!
//! The publishing service owns all menu business rules. Slug handling,
//! photo compression and AI auto-fill are small helpers around it.

pub mod ai;
pub mod image;
pub mod publishing;
pub mod slug;

pub use ai::{GeminiMenuGenerator, GeneratedItem, GeneratedMenu, GeneratorError, MenuGenerator};
pub use publishing::{MAX_SLUG_ATTEMPTS, MenuError, MenuPublishingService};

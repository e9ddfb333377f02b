//! QuickMenu Kernel Library
//!
//! Menu publishing service, its storage and identity adapters, and the HTTP
//! API. The server entry point is the `quickmenu` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod identity;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use identity::OwnerId;
pub use services::{MenuError, MenuPublishingService};
pub use state::AppState;

//! QuickMenu server
//!
//! HTTP API for building and publishing digital menus.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use quickmenu_kernel::config::Config;
use quickmenu_kernel::routes;
use quickmenu_kernel::session;
use quickmenu_kernel::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting QuickMenu");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, site_url = %config.site_url, "Configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let same_site = session::parse_same_site(&config.cookie_same_site);
    let secure = config.site_url.starts_with("https://");

    let app = if config.uses_memory_store() {
        routes::app(state, session::memory_session_layer(same_site, secure))
    } else {
        let session_layer = session::create_session_layer(&config.redis_url, same_site, secure)
            .await
            .context("failed to create session layer")?;
        info!("Redis session store connected");
        routes::app(state, session_layer)
    };

    let app = serve_uploads(app, &config).layer(build_cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Serve locally stored uploads under `FILES_URL` when it is a path.
fn serve_uploads(app: Router, config: &Config) -> Router {
    let mount = config.files_url.trim_end_matches('/');
    if mount.starts_with('/') && mount.len() > 1 {
        app.nest_service(mount, ServeDir::new(&config.uploads_dir))
    } else {
        app
    }
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([axum::http::header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

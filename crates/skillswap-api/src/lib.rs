//! HTTP boundary
//!
//! JSON endpoints over the directory and the swap request ledger:
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/health` | liveness and record counts |
//! | GET | `/api/directory` | search with `query`, `availability`, `page`, `pageSize` |
//! | POST | `/api/profiles` | register |
//! | GET / PUT | `/api/profiles/{id}` | view, owner edit (`x-member-id`) |
//! | GET | `/api/profiles/{id}/swap-options` | pick-lists for `requester` |
//! | GET / POST | `/api/swap-requests` | list for `viewer`, create |
//! | GET | `/api/swap-requests/{id}` | view as `viewer` |
//! | POST | `/api/swap-requests/{id}/{action}` | accept, decline, complete, cancel |

pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiResult};

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use skillswap_core::store::SwapStore;
use skillswap_core::{Result, SwapError};
use skillswap_directory::ProfileDirectory;
use skillswap_ledger::{RequestQueryService, SwapRequestLedger};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Browser origin allowed to call the API; empty disables CORS
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Shared handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<ProfileDirectory>,
    pub ledger: Arc<SwapRequestLedger>,
    pub queries: Arc<RequestQueryService>,
    pub requests: Arc<dyn SwapStore>,
}

impl AppState {
    pub fn new(directory: Arc<ProfileDirectory>, requests: Arc<dyn SwapStore>) -> Self {
        let ledger = Arc::new(SwapRequestLedger::new(directory.clone(), requests.clone()));
        let queries = Arc::new(RequestQueryService::new(requests.clone()));
        AppState {
            directory,
            ledger,
            queries,
            requests,
        }
    }
}

/// Routes without middleware
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/directory", get(handlers::search_directory))
        .route("/api/profiles", post(handlers::register_profile))
        .route(
            "/api/profiles/{id}",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/api/profiles/{id}/swap-options",
            get(handlers::swap_options),
        )
        .route(
            "/api/swap-requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/api/swap-requests/{id}", get(handlers::get_request))
        .route(
            "/api/swap-requests/{id}/{action}",
            post(handlers::transition_request),
        )
        .with_state(state)
}

/// Full application router with CORS applied
pub fn router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let app = routes(state);
    let origin = config.cors_origin.trim();
    if origin.is_empty() {
        return Ok(app);
    }

    let origin = HeaderValue::from_str(origin)
        .map_err(|e| SwapError::InvalidInput(format!("invalid CORS origin {:?}: {}", origin, e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(handlers::MEMBER_HEADER),
        ]);

    info!("CORS enabled for {}", config.cors_origin);
    Ok(app.layer(cors))
}

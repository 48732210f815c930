//! API routes
//!
//! | Path | Method | Body |
//! |------|--------|------|
//! | /exec | GET | legacy read, query `action=...` |
//! | /exec | POST | legacy write, JSON `{"action": ...}` |
//! | /api/v2/read | GET | read, [`Outcome`] envelope |
//! | /api/v2/write | POST | write, [`Outcome`] envelope |
//! | /health | GET | liveness |

pub mod actions;
pub mod envelope;
pub mod handler;
pub mod legacy;
pub mod router;

pub use actions::{ReadAction, ReadRequest, WriteAction, WriteRequest};
pub use envelope::Outcome;
pub use legacy::to_legacy;
pub use router::{RequestRouter, RouterOptions};

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/exec", get(handler::legacy_read).post(handler::legacy_write))
        .route("/api/v2/read", get(handler::v2_read))
        .route("/api/v2/write", post(handler::v2_write))
        .route("/health", get(handler::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

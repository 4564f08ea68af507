//! podpool-api — HTTP control surface for the container scaler.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/health` | Liveness and runtime connectivity |
//! | POST | `/scale/up` | Add one container |
//! | POST | `/scale/down` | Remove one container |
//! | POST | `/scale/set` | Scale to `{"count": n}` containers |
//! | GET | `/status` | Pool bounds and every managed container |
//!
//! Failures are always JSON `{"success": false, "message": ...}`: 400 for
//! bound and validation errors, 500 for runtime errors.

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use podpool_scaler::Scaler;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub scaler: Scaler,
}

/// Build the complete API router.
pub fn build_router(scaler: Scaler) -> Router {
    let state = ApiState { scaler };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/scale/up", post(handlers::scale_up))
        .route("/scale/down", post(handlers::scale_down))
        .route("/scale/set", post(handlers::scale_set))
        .route("/status", get(handlers::status))
        .with_state(state)
}

//! REST API handlers.
//!
//! Each handler runs one scaler operation to completion and reports the
//! running count before and after it.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use podpool_scaler::{ScaleError, parse_target};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::ApiState;

/// Failure body shared by every endpoint.
#[derive(Serialize)]
struct Failure {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_count: Option<u32>,
}

fn error_response(err: &ScaleError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(Failure {
            success: false,
            message: err.to_string(),
            current_count: err.current_count(),
        }),
    )
        .into_response()
}

// ── Health ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    docker: &'static str,
    timestamp: String,
}

/// GET /health
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let docker = if state.scaler.runtime_connected() {
        "connected"
    } else {
        "disconnected"
    };
    Json(HealthBody {
        status: "healthy",
        docker,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// ── Scaling ────────────────────────────────────────────────────

#[derive(Serialize)]
struct ScaleUpBody {
    success: bool,
    message: &'static str,
    container_name: String,
    previous_count: u32,
    current_count: u32,
}

/// POST /scale/up
pub async fn scale_up(State(state): State<ApiState>) -> Response {
    match state.scaler.scale_up().await {
        Ok(outcome) => Json(ScaleUpBody {
            success: true,
            message: "Scaled up successfully",
            container_name: outcome.container_name,
            previous_count: outcome.previous_count,
            current_count: outcome.current_count,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "scale up failed");
            error_response(&e)
        }
    }
}

#[derive(Serialize)]
struct ScaleDownBody {
    success: bool,
    message: &'static str,
    removed_container: String,
    previous_count: u32,
    current_count: u32,
}

/// POST /scale/down
pub async fn scale_down(State(state): State<ApiState>) -> Response {
    match state.scaler.scale_down().await {
        Ok(outcome) => Json(ScaleDownBody {
            success: true,
            message: "Scaled down successfully",
            removed_container: outcome.removed_container,
            previous_count: outcome.previous_count,
            current_count: outcome.current_count,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "scale down failed");
            error_response(&e)
        }
    }
}

#[derive(Serialize)]
struct ScaleSetBody {
    success: bool,
    message: String,
    previous_count: u32,
    current_count: u32,
}

/// POST /scale/set
///
/// Body: `{"count": n}`. The body is parsed by hand so that malformed JSON
/// gets the same failure shape as a bad `count`.
pub async fn scale_set(State(state): State<ApiState>, body: Bytes) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return error_response(&ScaleError::InvalidInput(format!(
                "Invalid JSON body: {e}"
            )));
        }
    };

    let result = match parse_target(request.get("count")) {
        Ok(target) => state.scaler.scale_to(target).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => Json(ScaleSetBody {
            success: true,
            message: format!("Scaled to {} containers", outcome.target),
            previous_count: outcome.previous_count,
            current_count: outcome.current_count,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "scale set failed");
            error_response(&e)
        }
    }
}

// ── Status ─────────────────────────────────────────────────────

/// GET /status
pub async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.scaler.status().await)
}

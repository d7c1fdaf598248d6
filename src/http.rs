//! HTTP status/command surface.
//!
//! Endpoints:
//! - POST /start  - Begin a firing: `{"set_point": 950, "hold_time": 600}`
//! - POST /stop   - End the firing and release the heater
//! - GET /status  - Point-in-time [`KilnStatus`](crate::app::events::KilnStatus)
//! - GET /health  - Liveness check
//!
//! Handlers only ever hold the service lock for the duration of one call;
//! they never wait on the control loop.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;

use crate::app::commands::{KilnCommand, StartCommand};
use crate::app::events::KilnStatus;
use crate::app::ports::{EventSink, HeaterPort};
use crate::app::service::KilnHandle;
use crate::error::CommandError;

/// Start/stop response
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub running: bool,
}

/// Create the API router
pub fn create_router<H, E>(handle: KilnHandle<H, E>) -> Router
where
    H: HeaterPort + Send + 'static,
    E: EventSink + Send + 'static,
{
    Router::new()
        .route("/start", post(start::<H, E>))
        .route("/stop", post(stop::<H, E>))
        .route("/status", get(status::<H, E>))
        .route("/health", get(health::<H, E>))
        .with_state(handle)
}

async fn start<H, E>(State(handle): State<KilnHandle<H, E>>, body: Bytes) -> impl IntoResponse
where
    H: HeaterPort + Send + 'static,
    E: EventSink + Send + 'static,
{
    let parsed = serde_json::from_slice::<Value>(&body)
        .map_err(|_| CommandError::Malformed)
        .and_then(|payload| StartCommand::from_json(&payload));

    match parsed {
        Ok(cmd) => {
            handle.command(KilnCommand::Start(cmd));
            (
                StatusCode::OK,
                Json(CommandResponse {
                    success: true,
                    error: None,
                }),
            )
        }
        Err(e) => {
            log::error!("Error starting kiln: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(CommandResponse {
                    success: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

async fn stop<H, E>(State(handle): State<KilnHandle<H, E>>) -> Json<CommandResponse>
where
    H: HeaterPort + Send + 'static,
    E: EventSink + Send + 'static,
{
    handle.command(KilnCommand::Stop);
    Json(CommandResponse {
        success: true,
        error: None,
    })
}

async fn status<H, E>(State(handle): State<KilnHandle<H, E>>) -> Json<KilnStatus>
where
    H: HeaterPort + Send + 'static,
    E: EventSink + Send + 'static,
{
    Json(handle.status())
}

async fn health<H, E>(State(handle): State<KilnHandle<H, E>>) -> Json<HealthResponse>
where
    H: HeaterPort + Send + 'static,
    E: EventSink + Send + 'static,
{
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        running: handle.is_running(),
    })
}

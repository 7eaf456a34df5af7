//! HTTP command surface.
//!
//! A thin axum adapter over the tick loop. Handlers never touch the core
//! components directly: each request is turned into an [`ApiRequest`] and
//! pushed onto an mpsc queue the tick loop drains once per tick, and the
//! handler awaits its oneshot reply. While a macro is running the loop is
//! blocked, so the reply simply arrives after the next tick — overlapping
//! commands are neither queued by the core nor dropped, they wait here.
//!
//! Status-code mapping lives in this adapter, not in the core: Unauthorized
//! → 401, NotConnected → 503, BadRequest → 400, NotFound → 404. The one
//! route-specific wrinkle is `/type`, which reports a disconnected emitter
//! as 400, as the original appliance did.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use keyfob_core::{CommandOutcome, CommandResult};

/// Header carrying the optional shared secret.
pub const AUTH_HEADER: &str = "x-auth-token";

/// One remote request, handed to the tick loop for processing.
#[derive(Debug)]
pub enum ApiRequest {
    /// Dispatch a named macro command.
    Command {
        name: String,
        credential: Option<String>,
        reply: oneshot::Sender<CommandResult>,
    },
    /// Type arbitrary text in chunks.
    TypeText {
        msg: String,
        reply: oneshot::Sender<CommandResult>,
    },
    /// Invert the indicator; replies with the new value.
    ToggleIndicator { reply: oneshot::Sender<bool> },
    /// Snapshot appliance health.
    Status { reply: oneshot::Sender<StatusSnapshot> },
}

/// Appliance health as reported by `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub hid_connected: bool,
    pub link_up: bool,
    pub flashing: bool,
    pub indicator_lit: bool,
    pub uptime_secs: u64,
}

#[derive(Clone)]
struct ApiState {
    queue: mpsc::Sender<ApiRequest>,
}

/// Builds the router over the request queue.
pub fn build_router(queue: mpsc::Sender<ApiRequest>) -> Router {
    Router::new()
        .route("/", get(help))
        .route("/ctrlaltdel", get(ctrl_alt_del))
        .route("/sleep", get(sleep_command))
        .route("/led/toggle", get(led_toggle))
        .route("/type", get(type_text))
        .route("/status", get(status))
        .fallback(not_found)
        .with_state(ApiState { queue })
}

/// Serves the command surface until the listener dies.
pub async fn serve(
    listener: tokio::net::TcpListener,
    queue: mpsc::Sender<ApiRequest>,
) -> std::io::Result<()> {
    info!("command surface listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(queue)).await
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn help() -> &'static str {
    concat!(
        "keyfob remote trigger\n",
        "\n",
        "GET /ctrlaltdel   send Ctrl+Alt+Del        (x-auth-token header if configured)\n",
        "GET /sleep        sleep the target machine (x-auth-token header if configured)\n",
        "GET /type?msg=..  type text on the target\n",
        "GET /led/toggle   invert the status LED\n",
        "GET /status       appliance health as JSON\n",
    )
}

async fn ctrl_alt_del(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    named_command(&state, "ctrlaltdel", credential(&headers)).await
}

async fn sleep_command(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    named_command(&state, "sleep", credential(&headers)).await
}

#[derive(Debug, Deserialize)]
struct TypeParams {
    msg: Option<String>,
}

async fn type_text(State(state): State<ApiState>, Query(params): Query<TypeParams>) -> Response {
    let Some(msg) = params.msg else {
        return (StatusCode::BAD_REQUEST, "missing msg parameter\n").into_response();
    };

    let (tx, rx) = oneshot::channel();
    if state
        .queue
        .send(ApiRequest::TypeText { msg, reply: tx })
        .await
        .is_err()
    {
        return loop_gone();
    }
    match rx.await {
        // This route reports a disconnected emitter as 400, not 503.
        Ok(result) => render(result, StatusCode::BAD_REQUEST),
        Err(_) => loop_gone(),
    }
}

async fn led_toggle(State(state): State<ApiState>) -> Response {
    let (tx, rx) = oneshot::channel();
    if state
        .queue
        .send(ApiRequest::ToggleIndicator { reply: tx })
        .await
        .is_err()
    {
        return loop_gone();
    }
    match rx.await {
        Ok(lit) => {
            let text = if lit { "indicator on\n" } else { "indicator off\n" };
            (StatusCode::OK, text).into_response()
        }
        Err(_) => loop_gone(),
    }
}

async fn status(State(state): State<ApiState>) -> Response {
    let (tx, rx) = oneshot::channel();
    if state
        .queue
        .send(ApiRequest::Status { reply: tx })
        .await
        .is_err()
    {
        return loop_gone();
    }
    match rx.await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(_) => loop_gone(),
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found\n").into_response()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn credential(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn named_command(state: &ApiState, name: &str, credential: Option<String>) -> Response {
    let (tx, rx) = oneshot::channel();
    let request = ApiRequest::Command {
        name: name.to_string(),
        credential,
        reply: tx,
    };
    if state.queue.send(request).await.is_err() {
        return loop_gone();
    }
    match rx.await {
        Ok(result) => render(result, StatusCode::SERVICE_UNAVAILABLE),
        Err(_) => loop_gone(),
    }
}

/// Maps a core outcome to a transport status; `not_connected` varies by route.
fn map_status(outcome: CommandOutcome, not_connected: StatusCode) -> StatusCode {
    match outcome {
        CommandOutcome::Ok => StatusCode::OK,
        CommandOutcome::NotConnected => not_connected,
        CommandOutcome::Unauthorized => StatusCode::UNAUTHORIZED,
        CommandOutcome::BadRequest => StatusCode::BAD_REQUEST,
        CommandOutcome::NotFound => StatusCode::NOT_FOUND,
    }
}

fn render(result: CommandResult, not_connected: StatusCode) -> Response {
    let status = map_status(result.outcome, not_connected);
    (status, format!("{}\n", result.message)).into_response()
}

/// The tick loop dropped its end of the queue; nothing can be dispatched.
fn loop_gone() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "appliance loop stopped\n").into_response()
}

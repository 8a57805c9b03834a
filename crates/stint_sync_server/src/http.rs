//! HTTP front for the sync server.
//!
//! Routes follow the stint wire protocol: `POST /lock`,
//! `POST /unlock`, `GET /database`, `POST /database/changes`. Every
//! endpoint authenticates the `X-API-Token` header against the token
//! registry before touching the core. Store work runs on the blocking
//! pool; sqlite has no business on an async worker thread.

use crate::auth::{TokenRegistry, SYNC_PERMISSION};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::lock::AdvisoryLock;
use crate::server::SyncServer;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use stint_sync_protocol::{
    Changeset, Snapshot, API_TOKEN_HEADER, CHANGES_PATH, LOCK_PATH, SNAPSHOT_PATH, UNLOCK_PATH,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

struct AppState<L: AdvisoryLock> {
    server: Arc<SyncServer<L>>,
    registry: Arc<TokenRegistry>,
}

impl<L: AdvisoryLock> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            server: Arc::clone(&self.server),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Locked { .. } => StatusCode::CONFLICT,
            ServerError::NotHolder { .. }
            | ServerError::UnknownToken
            | ServerError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ServerError::MalformedToken | ServerError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

/// Builds the router for a sync server and its token registry.
pub fn router<L: AdvisoryLock + 'static>(
    server: Arc<SyncServer<L>>,
    registry: Arc<TokenRegistry>,
) -> Router {
    let state = AppState { server, registry };
    Router::new()
        .route(LOCK_PATH, post(lock::<L>))
        .route(UNLOCK_PATH, post(unlock::<L>))
        .route(SNAPSHOT_PATH, get(snapshot::<L>))
        .route(CHANGES_PATH, post(changes::<L>))
        .with_state(state)
}

/// Serves sync requests on an already-bound listener until shutdown.
pub async fn serve_on<L: AdvisoryLock + 'static>(
    listener: TcpListener,
    server: Arc<SyncServer<L>>,
    registry: Arc<TokenRegistry>,
) -> ServerResult<()> {
    let router = router(server, registry);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Binds the configured address and serves sync requests until
/// shutdown.
pub async fn serve<L: AdvisoryLock + 'static>(
    config: &ServerConfig,
    server: Arc<SyncServer<L>>,
    registry: Arc<TokenRegistry>,
) -> ServerResult<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "sync server listening");
    serve_on(listener, server, registry).await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn authorize<L: AdvisoryLock>(state: &AppState<L>, headers: &HeaderMap) -> ServerResult<String> {
    let token = headers
        .get(API_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    state.registry.authorize(token, SYNC_PERMISSION)
}

fn join_error(err: tokio::task::JoinError) -> ServerError {
    ServerError::Internal(format!("blocking task failed: {err}"))
}

async fn lock<L: AdvisoryLock + 'static>(
    State(state): State<AppState<L>>,
    headers: HeaderMap,
) -> Result<StatusCode, ServerError> {
    let identity = authorize(&state, &headers)?;
    debug!(identity, "lock requested");
    state.server.handle_lock(&identity)?;
    Ok(StatusCode::OK)
}

async fn unlock<L: AdvisoryLock + 'static>(
    State(state): State<AppState<L>>,
    headers: HeaderMap,
) -> Result<StatusCode, ServerError> {
    let identity = authorize(&state, &headers)?;
    debug!(identity, "unlock requested");
    state.server.handle_unlock(&identity)?;
    Ok(StatusCode::OK)
}

async fn snapshot<L: AdvisoryLock + 'static>(
    State(state): State<AppState<L>>,
    headers: HeaderMap,
) -> Result<Json<Snapshot>, ServerError> {
    let identity = authorize(&state, &headers)?;
    debug!(identity, "snapshot requested");
    let server = Arc::clone(&state.server);
    let snapshot = tokio::task::spawn_blocking(move || server.handle_snapshot())
        .await
        .map_err(join_error)??;
    Ok(Json(snapshot))
}

async fn changes<L: AdvisoryLock + 'static>(
    State(state): State<AppState<L>>,
    headers: HeaderMap,
    payload: Result<Json<Changeset>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let identity = authorize(&state, &headers)?;
    // Authenticated clients get 400 for any undecodable body, not the
    // extractor's default 422.
    let Json(changes) = payload.map_err(|err| ServerError::InvalidRequest(err.body_text()))?;
    let server = Arc::clone(&state.server);
    tokio::task::spawn_blocking(move || server.handle_changes(&identity, &changes))
        .await
        .map_err(join_error)??;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_wire_statuses() {
        let cases: Vec<(ServerError, StatusCode)> = vec![
            (
                ServerError::Locked {
                    holder: "laptop".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                ServerError::NotHolder {
                    identity: "desktop".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (ServerError::MalformedToken, StatusCode::BAD_REQUEST),
            (ServerError::UnknownToken, StatusCode::FORBIDDEN),
            (
                ServerError::PermissionDenied("database:sync".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                ServerError::Internal("oops".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}

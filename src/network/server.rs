use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{
        HeaderMap, HeaderName, Method, StatusCode,
        header::CONTENT_TYPE,
    },
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;

use crate::common::Message;
use crate::gateway::{DEFAULT_RECENT_LIMIT, GatewayError, MutationGateway};

use super::api::GuestbookApi;

pub const API_PATH: &str = "/api/guestbook";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

type SharedGateway = Arc<MutationGateway>;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Submission => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Deletion => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

pub fn router(gateway: SharedGateway) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_KEY_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(API_PATH, get(list_handler).post(create_handler))
        .route("/api/guestbook/{id}", delete(delete_handler))
        .layer(cors)
        .with_state(gateway)
}

async fn list_handler(
    State(gateway): State<SharedGateway>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Message>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, DEFAULT_RECENT_LIMIT);
    Json(GuestbookApi::list_recent(gateway.as_ref(), limit).await)
}

async fn create_handler(
    State(gateway): State<SharedGateway>,
    Json(payload): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), GatewayError> {
    let id = GuestbookApi::create(gateway.as_ref(), payload.author, payload.body).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn delete_handler(
    State(gateway): State<SharedGateway>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, GatewayError> {
    let secret = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    GuestbookApi::delete(gateway.as_ref(), id, secret).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serves the gateway on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    gateway: SharedGateway,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let address = listener.local_addr()?;
    log::info!("Guestbook gateway running on {address}");

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown)
        .await
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }

        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                log::error!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

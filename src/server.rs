//! Long-lived batch endpoint.
//!
//! Every path accepts a `POST` whose body is a batch; the response body is a
//! stream of outcome lines, written as each request completes.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures::StreamExt;
use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::report::{render, OutputFormat};
use crate::request::{Batch, Dispatcher};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub max_body_bytes: usize,
    pub format: OutputFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            format: OutputFormat::Text,
        }
    }
}

#[derive(Clone)]
struct AppState {
    dispatcher: Dispatcher,
    max_body_bytes: usize,
    format: OutputFormat,
}

pub fn app(dispatcher: Dispatcher, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        dispatcher,
        max_body_bytes: config.max_body_bytes,
        format: config.format,
    });
    Router::new().fallback(handle_batch).with_state(state)
}

fn plain_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{}\n", message),
    )
        .into_response()
}

async fn handle_batch(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if request.method() != Method::POST {
        return plain_error(StatusCode::METHOD_NOT_ALLOWED, "Only POST method is supported");
    }

    let bytes = match to_bytes(request.into_body(), state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "failed to read batch body");
            return plain_error(StatusCode::BAD_REQUEST, "Failed to read request body");
        }
    };

    let batch = match Batch::from_slice(&bytes) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse batch body");
            return plain_error(StatusCode::BAD_REQUEST, "Failed to parse request body");
        }
    };

    tracing::info!(requests = batch.len(), "dispatching batch");
    let format = state.format;
    let lines = state
        .dispatcher
        .dispatch_reported(&batch.requests)
        .map(move |dispatched| Ok::<_, Infallible>(render(&dispatched, format)));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, format.content_type())],
        Body::from_stream(lines),
    )
        .into_response()
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|source| Error::Bind {
        addr: addr.to_string(),
        source,
    })
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Starting HTTP server on {}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(Error::Serve)
}

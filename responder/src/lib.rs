//! Slow local HTTP endpoint used to make request cancellation observable.
//!
//! # Design
//! Every request, whatever its method or path, is logged, held for a fixed
//! delay, and then answered with [`GREETING`]. [`spawn`] binds an ephemeral
//! loopback port and hands back a [`ResponderHandle`] that tears the server
//! down when dropped. Only a spawned responder records requests, and it does
//! so before the delay starts, so a caller that gives up early still leaves a
//! trace.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, Uri},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock, task::JoinHandle};
use uuid::Uuid;

/// Body returned once the delay has elapsed.
pub const GREETING: &str = "Hello, client\n";

/// A request as the responder saw it on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub id: Uuid,
    pub method: String,
    pub uri: String,
    pub content_type: Option<String>,
    pub body: String,
}

pub type Received = Arc<RwLock<Vec<ReceivedRequest>>>;

#[derive(Clone)]
struct AppState {
    delay: Duration,
    /// Only set when a `ResponderHandle` can read the log back.
    received: Option<Received>,
}

/// Build the router. Requests are logged but not recorded.
pub fn app(delay: Duration) -> Router {
    router(delay, None)
}

fn router(delay: Duration, received: Option<Received>) -> Router {
    Router::new()
        .fallback(respond)
        .with_state(AppState { delay, received })
}

pub async fn run(listener: TcpListener, delay: Duration) -> Result<(), std::io::Error> {
    axum::serve(listener, app(delay)).await
}

/// Start a responder on `127.0.0.1:0` in a background task.
pub async fn spawn(delay: Duration) -> Result<ResponderHandle, std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let received = Received::default();
    let app = router(delay, Some(received.clone()));

    let task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(error = %err, "responder stopped");
        }
    });

    tracing::info!(address = %addr, delay_ms = delay.as_millis() as u64, "responder listening");
    Ok(ResponderHandle {
        addr,
        received,
        task,
    })
}

/// Owner of a running responder. The server task is aborted on drop.
#[derive(Debug)]
pub struct ResponderHandle {
    addr: SocketAddr,
    received: Received,
    task: JoinHandle<()>,
}

impl ResponderHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Snapshot of every request seen so far, oldest first.
    pub async fn received(&self) -> Vec<ReceivedRequest> {
        self.received.read().await.clone()
    }

    pub fn shutdown(self) {
        tracing::debug!(address = %self.addr, "responder shutting down");
    }
}

impl Drop for ResponderHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> &'static str {
    let record = ReceivedRequest {
        id: Uuid::new_v4(),
        method: method.to_string(),
        uri: uri.to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    tracing::info!(
        request_id = %record.id,
        method = %record.method,
        uri = %record.uri,
        headers = ?headers,
        body = %record.body,
        "request received"
    );

    let id = record.id;
    if let Some(received) = &state.received {
        received.write().await.push(record);
    }

    tokio::time::sleep(state.delay).await;

    tracing::info!(request_id = %id, "responding");
    GREETING
}

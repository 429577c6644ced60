//! Mock cart REST backend served with axum on an ephemeral port.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use reelcart_core::{BuyerInfo, CartItem, CartSnapshot, MovieId, Price};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// One request as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
    pub authorization: Option<String>,
}

/// A running mock backend. Shut down on drop.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct BackendState {
    inner: Mutex<BackendInner>,
}

#[derive(Debug, Default)]
struct BackendInner {
    cart: CartSnapshot,
    requests: Vec<RecordedRequest>,
    orders: Vec<BuyerInfo>,
    forced_failure: Option<(u16, String)>,
    delay: Option<Duration>,
}

impl BackendState {
    fn lock(&self) -> MutexGuard<'_, BackendInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MockBackend {
    /// Bind to `127.0.0.1:0` and start serving an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(BackendState::default());

        let app = Router::new()
            .route("/cart", get(list))
            .route("/cart/add", post(add))
            .route("/cart/remove/{id}", delete(remove))
            .route("/cart/empty", delete(empty))
            .route("/cart/status/{id}", get(status))
            .route("/cart/total", get(total))
            .route("/cart/complete", post(complete))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Mock backend stopped: {e}");
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the backend.
    ///
    /// # Panics
    ///
    /// Never; a socket address always forms a valid URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Replace the cart contents.
    pub fn seed(&self, items: impl IntoIterator<Item = CartItem>) {
        self.state.lock().cart = items.into_iter().collect();
    }

    /// Items currently in the cart.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state.lock().cart.items().to_vec()
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Buyers of completed purchases.
    #[must_use]
    pub fn orders(&self) -> Vec<BuyerInfo> {
        self.state.lock().orders.clone()
    }

    /// Answer every later request with this status and body.
    pub fn fail_with(&self, status: u16, body: &str) {
        self.state.lock().forced_failure = Some((status, body.to_string()));
    }

    /// Stop failing requests.
    pub fn recover(&self) {
        self.state.lock().forced_failure = None;
    }

    /// Delay every later response.
    pub fn delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Record the request, then apply any injected delay or failure.
async fn record(State(state): State<Arc<BackendState>>, request: Request, next: Next) -> Response {
    let recorded = {
        let headers = request.headers();
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            request_id: header("x-request-id"),
            authorization: header("authorization"),
        }
    };

    let (delay, failure) = {
        let mut inner = state.lock();
        inner.requests.push(recorded);
        (inner.delay, inner.forced_failure.clone())
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, body)) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, body).into_response();
    }
    next.run(request).await
}

async fn list(State(state): State<Arc<BackendState>>) -> Json<Vec<CartItem>> {
    Json(state.lock().cart.items().to_vec())
}

async fn add(State(state): State<Arc<BackendState>>, Json(item): Json<CartItem>) -> StatusCode {
    state.lock().cart.insert(item);
    StatusCode::OK
}

async fn remove(State(state): State<Arc<BackendState>>, Path(id): Path<MovieId>) -> StatusCode {
    state.lock().cart.remove(id);
    StatusCode::OK
}

async fn empty(State(state): State<Arc<BackendState>>) -> StatusCode {
    state.lock().cart.clear();
    StatusCode::OK
}

async fn status(State(state): State<Arc<BackendState>>, Path(id): Path<MovieId>) -> Json<bool> {
    Json(state.lock().cart.contains(id))
}

async fn total(State(state): State<Arc<BackendState>>) -> Json<Price> {
    Json(state.lock().cart.total())
}

async fn complete(
    State(state): State<Arc<BackendState>>,
    Json(buyer): Json<BuyerInfo>,
) -> StatusCode {
    let mut inner = state.lock();
    inner.cart.clear();
    inner.orders.push(buyer);
    StatusCode::OK
}

//! Short-lived local HTTP listener that receives the OAuth redirect.
//!
//! The server runs on its own task and hands the first valid authorization
//! code to the waiting flow through a one-shot channel. Later requests are
//! answered with `409 Conflict`. Once a code is delivered the server starts a
//! graceful shutdown, and [`CallbackListener::stop`] waits until the socket
//! is released.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify, oneshot};
use tokio::task::JoinHandle;

use crate::error::AuthError;
use crate::request::redirect_uri_for;

/// How long `stop` lets in-flight responses finish before aborting the server
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

type Delivery = Result<String, AuthError>;

struct CallbackState {
    expected_state: String,
    slot: Mutex<Option<oneshot::Sender<Delivery>>>,
    shutdown: Arc<Notify>,
}

#[derive(Deserialize)]
struct AuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// One bound callback endpoint for one authorization attempt
pub struct CallbackListener {
    local_addr: SocketAddr,
    code_rx: Option<oneshot::Receiver<Delivery>>,
    shutdown: Arc<Notify>,
    server: Option<JoinHandle<()>>,
}

impl CallbackListener {
    /// Bind `127.0.0.1:<port>` and start serving the callback route
    pub async fn start(port: u16, expected_state: String) -> Result<Self, AuthError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| AuthError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| AuthError::Bind { addr, source })?;

        let (code_tx, code_rx) = oneshot::channel();
        let shutdown = Arc::new(Notify::new());
        let state = Arc::new(CallbackState {
            expected_state,
            slot: Mutex::new(Some(code_tx)),
            shutdown: shutdown.clone(),
        });

        let app = Router::new()
            .route("/", get(handle_callback))
            .with_state(state);

        let signal = shutdown.clone();
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "OAuth callback server failed");
            }
        });

        tracing::debug!(%local_addr, "OAuth callback listener started");

        Ok(Self {
            local_addr,
            code_rx: Some(code_rx),
            shutdown,
            server: Some(server),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn redirect_uri(&self) -> String {
        redirect_uri_for(self.local_addr.port())
    }

    /// Wait for the first authorization code, giving up after `timeout`
    pub async fn await_code(&mut self, timeout: Duration) -> Result<String, AuthError> {
        let code_rx = self
            .code_rx
            .take()
            .ok_or_else(|| AuthError::Listener("authorization code was already consumed".into()))?;

        match tokio::time::timeout(timeout, code_rx).await {
            Ok(Ok(delivery)) => delivery,
            Ok(Err(_)) => Err(AuthError::Listener(
                "callback server stopped before a code arrived".into(),
            )),
            Err(_) => Err(AuthError::Timeout(timeout)),
        }
    }

    /// Shut the server down and wait until the port is released. Safe to call
    /// more than once.
    pub async fn stop(&mut self) {
        let Some(mut server) = self.server.take() else {
            return;
        };

        self.shutdown.notify_one();
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            tracing::warn!("OAuth callback server did not finish in time, aborting");
            server.abort();
            let _ = server.await;
        }

        tracing::debug!(local_addr = %self.local_addr, "OAuth callback listener stopped");
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}

async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<AuthCallback>,
) -> (StatusCode, String) {
    if params.state.as_deref() != Some(state.expected_state.as_str()) {
        tracing::warn!("rejected OAuth callback with a missing or mismatched state");
        return (
            StatusCode::BAD_REQUEST,
            "Invalid state parameter.".to_string(),
        );
    }

    let delivery = match (params.code, params.error) {
        (_, Some(error)) => Err(AuthError::Denied(error)),
        (Some(code), None) if !code.is_empty() => Ok(code),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                "No authorization code received.".to_string(),
            );
        }
    };

    let Some(sender) = state.slot.lock().await.take() else {
        return (
            StatusCode::CONFLICT,
            "Authorization was already received. You can close this window.".to_string(),
        );
    };

    let body = match &delivery {
        Ok(_) => "Authorization received.\r\nYou can now safely close this browser window.".to_string(),
        Err(e) => format!("Authorization failed: {}\r\nYou can close this window.", e),
    };

    // The waiting side may have timed out already; nothing to do then.
    let _ = sender.send(delivery);
    state.shutdown.notify_one();

    (StatusCode::OK, body)
}

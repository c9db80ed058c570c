use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the authorization flow
#[derive(Debug, Error)]
pub enum AuthError {
    /// The local callback listener could not be bound
    #[error("failed to bind OAuth callback listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// No authorization code arrived in time
    #[error("timed out after {} seconds waiting for authorization", .0.as_secs())]
    Timeout(Duration),

    /// The callback listener stopped without delivering a code
    #[error("OAuth callback listener failed: {0}")]
    Listener(String),

    /// The provider redirected back with an `error` instead of a code
    #[error("authorization was denied: {0}")]
    Denied(String),

    /// The token endpoint rejected the request; `body` is the remote text verbatim
    #[error("token endpoint rejected the request (status {status}): {body}")]
    Exchange { status: u16, body: String },

    /// The token endpoint answered with something that is not a usable token
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token cache could not be written
    #[error("failed to write OAuth token cache '{}': {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

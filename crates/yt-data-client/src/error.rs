use std::path::PathBuf;

use thiserror::Error;

/// Errors from YouTube Data API calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response; `body` is the API's error text
    #[error("{context} failed (status {status}): {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is empty", .0.display())]
    EmptyFile(PathBuf),

    #[error("no upload session URL in response")]
    MissingUploadLocation,

    #[error("upload made no progress at byte {0}")]
    UploadStalled(u64),

    /// The access token could not be refreshed
    #[error(transparent)]
    Auth(#[from] yt_oauth::AuthError),
}

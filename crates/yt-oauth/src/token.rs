use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AuthError;

/// Name of the token cache file in the user's home directory
pub const TOKEN_CACHE_FILE: &str = ".yt-up.oauth.cache";

/// Tokens expiring within this many seconds are treated as already expired
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Current time as a Unix timestamp (seconds since epoch)
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// OAuth 2.0 token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token for API requests
    pub access_token: String,
    /// Refresh token for getting new access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry time as Unix timestamp (seconds since epoch), if the provider sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl OAuthToken {
    /// Check if the token is expired or will expire soon (within 60 seconds)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => unix_now() + EXPIRY_MARGIN_SECS >= expires_at,
            None => false,
        }
    }

    /// A token is usable when it has an access value and has not expired
    pub fn is_usable(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Single-record token cache on disk.
///
/// Reads never fail hard: a missing, unreadable or malformed file is reported
/// as "no token" so the caller can fall back to interactive authorization.
/// Writes go to a sibling temp file which is then renamed over the cache, so
/// an interrupted write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.yt-up.oauth.cache`, or `None` if there is no home directory
    pub fn in_home_dir() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(home.join(TOKEN_CACHE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached token, if there is a readable one
    pub fn load(&self) -> Option<OAuthToken> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no cached OAuth token");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read OAuth token cache");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed OAuth token cache");
                None
            }
        }
    }

    /// Save token with secure permissions, replacing any previous record
    pub fn save(&self, token: &OAuthToken) -> Result<(), AuthError> {
        self.write_atomically(token)
            .map_err(|source| AuthError::CacheWrite {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), "saved OAuth token");
        Ok(())
    }

    fn write_atomically(&self, token: &OAuthToken) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(token)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        let mut file = std::fs::File::create(&temp_path)?;

        // Set secure permissions (owner read/write only) on Unix-like systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp_path, &self.path).inspect_err(|_| {
            let _ = std::fs::remove_file(&temp_path);
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| TOKEN_CACHE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

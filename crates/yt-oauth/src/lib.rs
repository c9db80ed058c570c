//! OAuth 2.0 authorization for the YouTube Data API with a local token cache.
//!
//! [`Authenticator::authenticate`] returns an [`AuthenticatedClient`], reusing
//! the cached token when it is still valid and otherwise walking the user
//! through the browser consent flow.

mod browser;
mod callback;
mod client;
mod error;
mod exchange;
mod flow;
mod request;
mod token;

pub use browser::{BrowserLauncher, LaunchError, SystemBrowser, is_supported_platform};
pub use callback::CallbackListener;
pub use client::AuthenticatedClient;
pub use error::AuthError;
pub use flow::Authenticator;
pub use request::{
    AuthorizationRequest, DEFAULT_AUTH_TIMEOUT, DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL,
    OAUTH_CALLBACK_PORT, OAuthConfig, YOUTUBE_UPLOAD_SCOPE, generate_pkce, generate_state,
    redirect_uri_for,
};
pub use token::{OAuthToken, TOKEN_CACHE_FILE, TokenStore};

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{IntoUrl, Method, RequestBuilder};
use tokio::sync::Mutex;

use crate::error::AuthError;
use crate::exchange;
use crate::request::OAuthConfig;
use crate::token::{OAuthToken, TokenStore};

/// HTTP client that sends the access token with every request.
///
/// Built with [`AuthenticatedClient::with_refresh`] (as [`crate::Authenticator`]
/// does), it refreshes the token once it expires and writes the new one back
/// to the cache before the request goes out. Clones share the token.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    token: Mutex<OAuthToken>,
    refresher: Option<Refresher>,
}

#[derive(Debug)]
struct Refresher {
    config: OAuthConfig,
    store: TokenStore,
    token_http: reqwest::Client,
}

impl AuthenticatedClient {
    /// Client that always sends `token` as is
    pub fn new(token: OAuthToken) -> Result<Self, AuthError> {
        Self::build(token, None)
    }

    /// Client that refreshes `token` against `config`'s token endpoint once it
    /// expires, saving each new token to `store`
    pub fn with_refresh(
        token: OAuthToken,
        config: OAuthConfig,
        store: TokenStore,
    ) -> Result<Self, AuthError> {
        let token_http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Self::build(
            token,
            Some(Refresher {
                config,
                store,
                token_http,
            }),
        )
    }

    fn build(token: OAuthToken, refresher: Option<Refresher>) -> Result<Self, AuthError> {
        bearer_header(&token.access_token)?;

        Ok(Self {
            inner: Arc::new(Inner {
                http: reqwest::Client::builder().build()?,
                token: Mutex::new(token),
                refresher,
            }),
        })
    }

    /// Current token, as last refreshed
    pub async fn token(&self) -> OAuthToken {
        self.inner.token.lock().await.clone()
    }

    /// Access token to send now, refreshing it first if it has expired
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut token = self.inner.token.lock().await;

        if let Some(refresher) = &self.inner.refresher {
            if token.is_expired() && token.is_refreshable() {
                let refreshed =
                    exchange::refresh_token(&refresher.token_http, &refresher.config, &token)
                        .await?;
                bearer_header(&refreshed.access_token)?;

                if let Err(e) = refresher.store.save(&refreshed) {
                    tracing::warn!(error = %e, "failed to cache refreshed OAuth token");
                }
                *token = refreshed;
            }
        }

        Ok(token.access_token.clone())
    }

    pub async fn request(&self, method: Method, url: impl IntoUrl) -> Result<RequestBuilder, AuthError> {
        let value = bearer_header(&self.access_token().await?)?;
        Ok(self.inner.http.request(method, url).header(AUTHORIZATION, value))
    }

    pub async fn get(&self, url: impl IntoUrl) -> Result<RequestBuilder, AuthError> {
        self.request(Method::GET, url).await
    }

    pub async fn post(&self, url: impl IntoUrl) -> Result<RequestBuilder, AuthError> {
        self.request(Method::POST, url).await
    }

    pub async fn put(&self, url: impl IntoUrl) -> Result<RequestBuilder, AuthError> {
        self.request(Method::PUT, url).await
    }
}

fn bearer_header(access_token: &str) -> Result<HeaderValue, AuthError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", access_token))
        .map_err(|_| AuthError::InvalidResponse("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

use serde::Deserialize;

use crate::error::AuthError;
use crate::request::{AuthorizationRequest, OAuthConfig};
use crate::token::{OAuthToken, unix_now};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh_token: Option<String>) -> Result<OAuthToken, AuthError> {
        if self.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "empty access_token in token response".into(),
            ));
        }

        Ok(OAuthToken {
            access_token: self.access_token,
            // Refresh responses usually omit the refresh token; keep the one we had
            refresh_token: self.refresh_token.or(previous_refresh_token),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: self.expires_in.map(|secs| unix_now() + secs),
        })
    }
}

/// Exchange authorization code for tokens
pub(crate) async fn exchange_code(
    http: &reqwest::Client,
    config: &OAuthConfig,
    request: &AuthorizationRequest,
    code: &str,
) -> Result<OAuthToken, AuthError> {
    tracing::info!("exchanging authorization code for tokens");

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("code_verifier", request.pkce_verifier.as_str()),
        ("grant_type", "authorization_code"),
        ("redirect_uri", request.redirect_uri.as_str()),
    ];

    let token = request_token(http, &config.token_url, &params)
        .await?
        .into_token(None)?;

    tracing::info!("obtained OAuth tokens");
    Ok(token)
}

/// Refresh the access token using the refresh token
pub(crate) async fn refresh_token(
    http: &reqwest::Client,
    config: &OAuthConfig,
    token: &OAuthToken,
) -> Result<OAuthToken, AuthError> {
    let refresh_token = token
        .refresh_token
        .as_deref()
        .ok_or_else(|| AuthError::InvalidResponse("cached token has no refresh token".into()))?;

    tracing::info!("refreshing OAuth token");

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let refreshed = request_token(http, &config.token_url, &params)
        .await?
        .into_token(token.refresh_token.clone())?;

    tracing::info!("OAuth token refreshed");
    Ok(refreshed)
}

async fn request_token(
    http: &reqwest::Client,
    token_url: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let response = http.post(token_url).form(params).send().await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(AuthError::Exchange {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

use std::time::Duration;

/// Default OAuth callback port
pub const OAUTH_CALLBACK_PORT: u16 = 8080;

/// Google's OAuth 2.0 authorization endpoint
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google's OAuth 2.0 token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes needed to upload videos and manage playlists
pub const YOUTUBE_UPLOAD_SCOPE: &str =
    "https://www.googleapis.com/auth/youtube https://www.googleapis.com/auth/youtube.upload";

/// How long to wait for the user to finish authorizing in the browser
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(300);

/// OAuth configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// OAuth scope(s), space delimited
    pub scope: String,
    /// Authorization (consent page) endpoint
    pub auth_url: String,
    /// Token endpoint for code exchange and refresh
    pub token_url: String,
    /// Local port for the redirect callback; 0 picks a free port
    pub callback_port: u16,
    /// How long to wait for the authorization code
    pub timeout: Duration,
}

impl OAuthConfig {
    /// Create new OAuth configuration with YouTube defaults
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            scope: YOUTUBE_UPLOAD_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            callback_port: OAUTH_CALLBACK_PORT,
            timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_endpoints(mut self, auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self
    }

    pub fn with_callback_port(mut self, port: u16) -> Self {
        self.callback_port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Everything fixed for one authorization attempt
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub scope: String,
    pub auth_url: String,
    pub redirect_uri: String,
    /// Anti-forgery value echoed back on the callback
    pub state: String,
    pub pkce_verifier: String,
    pub pkce_challenge: String,
}

impl AuthorizationRequest {
    pub fn new(config: &OAuthConfig, redirect_uri: String, state: String) -> Self {
        let (pkce_verifier, pkce_challenge) = generate_pkce();
        Self {
            client_id: config.client_id.clone(),
            scope: config.scope.clone(),
            auth_url: config.auth_url.clone(),
            redirect_uri,
            state,
            pkce_verifier,
            pkce_challenge,
        }
    }

    /// URL of the consent page the user is sent to
    pub fn authorization_url(&self) -> String {
        let separator = if self.auth_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope={}&\
            state={}&\
            code_challenge={}&\
            code_challenge_method=S256&\
            access_type=offline&\
            prompt=consent",
            self.auth_url,
            separator,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(&self.state),
            urlencoding::encode(&self.pkce_challenge),
        )
    }
}

/// Redirect URI the provider sends the user back to, on the loopback address
/// the callback listener binds
pub fn redirect_uri_for(port: u16) -> String {
    format!("http://127.0.0.1:{}/", port)
}

fn random_alphanumeric(len: usize) -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Fresh per-attempt `state` value
pub fn generate_state() -> String {
    random_alphanumeric(32)
}

/// Generate PKCE verifier and challenge
pub fn generate_pkce() -> (String, String) {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use sha2::{Digest, Sha256};

    // Verifier must be 43-128 characters
    let verifier = random_alphanumeric(64);

    // Challenge: base64url(SHA256(verifier))
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

    (verifier, challenge)
}

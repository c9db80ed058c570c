use crate::browser::{BrowserLauncher, SystemBrowser};
use crate::callback::CallbackListener;
use crate::client::AuthenticatedClient;
use crate::error::AuthError;
use crate::exchange;
use crate::request::{AuthorizationRequest, OAuthConfig, generate_state};
use crate::token::{OAuthToken, TokenStore};

/// Drives the three-legged OAuth flow with a local token cache.
///
/// A usable cached token is returned without touching the network. An expired
/// token with a refresh token is refreshed. Otherwise the user is sent to the
/// consent page and the code arriving on the local callback listener is
/// exchanged for a new token, which is cached for later runs.
pub struct Authenticator {
    config: OAuthConfig,
    store: TokenStore,
    launcher: Box<dyn BrowserLauncher>,
    http: reqwest::Client,
}

impl Authenticator {
    pub fn new(config: OAuthConfig, store: TokenStore) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            // Token endpoints never redirect legitimately.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            config,
            store,
            launcher: Box::new(SystemBrowser::default()),
            http,
        })
    }

    pub fn with_launcher(mut self, launcher: impl BrowserLauncher + 'static) -> Self {
        self.launcher = Box::new(launcher);
        self
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Return a client authorized for the configured scope
    pub async fn authenticate(&self) -> Result<AuthenticatedClient, AuthError> {
        let token = match self.cached_token().await {
            Some(token) => token,
            None => {
                let token = self.authorize_interactively().await?;
                self.persist(&token);
                token
            }
        };

        AuthenticatedClient::with_refresh(token, self.config.clone(), self.store.clone())
    }

    async fn cached_token(&self) -> Option<OAuthToken> {
        let token = self.store.load()?;

        if token.is_usable() {
            tracing::debug!("using cached OAuth token");
            return Some(token);
        }

        if !token.is_refreshable() {
            tracing::info!("cached OAuth token expired, authorization required");
            return None;
        }

        match exchange::refresh_token(&self.http, &self.config, &token).await {
            Ok(refreshed) => {
                self.persist(&refreshed);
                Some(refreshed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh OAuth token, authorization required");
                None
            }
        }
    }

    async fn authorize_interactively(&self) -> Result<OAuthToken, AuthError> {
        let state = generate_state();
        let mut listener = CallbackListener::start(self.config.callback_port, state.clone()).await?;
        let request = AuthorizationRequest::new(&self.config, listener.redirect_uri(), state);

        self.prompt_user(&request.authorization_url());

        let code = listener.await_code(self.config.timeout).await;
        listener.stop().await;
        let code = code?;

        exchange::exchange_code(&self.http, &self.config, &request, &code).await
    }

    fn prompt_user(&self, auth_url: &str) {
        eprintln!("\n=================================================");
        eprintln!("OAuth 2.0 Authorization Required");
        eprintln!("=================================================");
        match self.launcher.open(auth_url) {
            Ok(()) => {
                eprintln!("\nYour browser has been opened to the authorization URL below.");
                eprintln!("This program will resume once authorization has been provided.\n");
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not open a browser");
                eprintln!("\nPlease visit the following URL to authorize the application.");
                eprintln!("This program will pause until the site is visited.\n");
            }
        }
        eprintln!("{}\n", auth_url);
        eprintln!("Waiting for authorization...");
        eprintln!("=================================================\n");
    }

    fn persist(&self, token: &OAuthToken) {
        // Authorization already succeeded; a cache failure only costs a prompt next run.
        if let Err(e) = self.store.save(token) {
            tracing::warn!(error = %e, "failed to cache OAuth token");
        }
    }
}

use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use yt_oauth::{
    Authenticator, DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL, OAUTH_CALLBACK_PORT, OAuthConfig,
    TokenStore, YOUTUBE_UPLOAD_SCOPE,
};

/// OAuth 2.0 helper tool: authorize once so later uploads skip the browser
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// OAuth client ID
    #[arg(long, env = "YT_UP_CLIENT_ID")]
    client_id: String,

    /// OAuth client secret
    #[arg(long, env = "YT_UP_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Path of the OAuth token cache (default: ~/.yt-up.oauth.cache)
    #[arg(long)]
    token_cache: Option<String>,

    /// Space-separated OAuth scopes to request
    #[arg(long, default_value = YOUTUBE_UPLOAD_SCOPE)]
    scope: String,

    /// Local port for the OAuth redirect (must match the registered redirect URI)
    #[arg(long, default_value_t = OAUTH_CALLBACK_PORT)]
    callback_port: u16,

    /// Seconds to wait for authorization in the browser
    #[arg(long, default_value = "300")]
    auth_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let auth_url = std::env::var("OAUTH_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string());
    let token_url =
        std::env::var("OAUTH_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string());

    let config = OAuthConfig::new(args.client_id, args.client_secret)
        .with_scope(args.scope)
        .with_endpoints(auth_url, token_url)
        .with_callback_port(args.callback_port)
        .with_timeout(Duration::from_secs(args.auth_timeout_secs));

    let store = match args.token_cache {
        Some(path) => TokenStore::new(path),
        None => TokenStore::in_home_dir().ok_or("Cannot determine home directory for the token cache")?,
    };

    let authenticator = Authenticator::new(config, store)?;
    authenticator.authenticate().await?;

    eprintln!(
        "\nOAuth token cached at: {}",
        authenticator.store().path().display()
    );
    eprintln!("You can now upload with yt-up without opening a browser");

    Ok(())
}

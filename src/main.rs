use clap::Parser;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use yt_data_client::{DEFAULT_API_ADDRESS, VideoMetadata, YouTubeClient};
use yt_oauth::{
    Authenticator, DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL, OAuthConfig, TokenStore,
    YOUTUBE_UPLOAD_SCOPE,
};

mod progress;

use progress::{ProgressReporter, upload_summary};

/// YouTube Uploader - Uploads a video file and optionally adds it to a playlist
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Name of video file to upload
    #[arg(long)]
    filename: String,

    /// Video title
    #[arg(long, default_value = "")]
    title: String,

    /// Video description
    #[arg(long, default_value = "")]
    description: String,

    /// Video category id
    #[arg(long, default_value = "")]
    category: String,

    /// Comma separated list of video keywords
    #[arg(long, default_value = "")]
    keywords: String,

    /// Video privacy status
    #[arg(long, default_value = "unlisted", value_parser = ["private", "unlisted", "public"])]
    privacy: String,

    /// Playlist name to add video to (created if it does not exist)
    #[arg(long)]
    playlist: Option<String>,

    /// OAuth client ID
    #[arg(long, env = "YT_UP_CLIENT_ID")]
    client_id: String,

    /// OAuth client secret
    #[arg(long, env = "YT_UP_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Path of the OAuth token cache (default: ~/.yt-up.oauth.cache)
    #[arg(long)]
    token_cache: Option<String>,

    /// Seconds to wait for authorization in the browser (default: 300)
    #[arg(long, default_value = "300")]
    auth_timeout_secs: u64,
}

/// Split comma separated keywords, dropping blanks
fn parse_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
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

    let path = Path::new(&args.filename);
    let size = std::fs::metadata(path)
        .map_err(|e| format!("Failed to open video file '{}': {}", args.filename, e))?
        .len();

    // Endpoints can be overridden from the environment, e.g. for a local mock
    let auth_url = std::env::var("OAUTH_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string());
    let token_url =
        std::env::var("OAUTH_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string());
    let api_address =
        std::env::var("YOUTUBE_API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());

    let config = OAuthConfig::new(args.client_id, args.client_secret)
        .with_scope(YOUTUBE_UPLOAD_SCOPE)
        .with_endpoints(auth_url, token_url)
        .with_timeout(Duration::from_secs(args.auth_timeout_secs));

    let store = match args.token_cache {
        Some(path) => TokenStore::new(path),
        None => TokenStore::in_home_dir().ok_or("Cannot determine home directory for the token cache")?,
    };

    tracing::info!("Requesting auth token...");
    let client = Authenticator::new(config, store)?
        .authenticate()
        .await
        .map_err(|e| format!("Error building OAuth client: {}", e))?;

    let youtube = YouTubeClient::new(client, api_address);

    let metadata = VideoMetadata {
        title: args.title,
        description: args.description,
        category_id: args.category,
        tags: parse_keywords(&args.keywords),
        privacy_status: args.privacy.clone(),
    };

    tracing::info!("Uploading {}...", args.filename);
    let mut reporter = ProgressReporter::new();
    let start = Instant::now();

    let video = youtube
        .upload_video(path, &metadata, |current, total| {
            reporter.update(current, total)
        })
        .await
        .map_err(|e| format!("Error uploading video: {}", e))?;

    reporter.finish();
    tracing::info!("{}", upload_summary(size, start.elapsed(), &video.watch_url()));

    if let Some(title) = args.playlist {
        let playlist_id = match youtube.find_playlist(&title).await? {
            Some(id) => {
                tracing::info!("Playlist found: {}", id);
                id
            }
            None => {
                let id = youtube.create_playlist(&title, &args.privacy).await?;
                tracing::info!("Playlist created: id={}", id);
                id
            }
        };
        youtube.add_to_playlist(&video.id, &playlist_id).await?;
        tracing::info!("Video added to playlist");
    }

    Ok(())
}

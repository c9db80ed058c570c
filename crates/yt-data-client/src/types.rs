use serde::Deserialize;

/// Metadata sent with a new upload
#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    /// Numeric category id; empty lets the service choose
    pub category_id: String,
    pub tags: Vec<String>,
    /// private, unlisted or public
    pub privacy_status: String,
}

impl VideoMetadata {
    pub(crate) fn to_resource(&self) -> serde_json::Value {
        let mut snippet = serde_json::json!({
            "title": self.title,
            "description": self.description,
        });
        if !self.category_id.is_empty() {
            snippet["categoryId"] = self.category_id.clone().into();
        }
        // The API rejects an empty tag list given as an empty string
        if !self.tags.is_empty() {
            snippet["tags"] = self.tags.clone().into();
        }

        serde_json::json!({
            "snippet": snippet,
            "status": { "privacyStatus": self.privacy_status },
        })
    }
}

/// Video resource returned by a finished upload
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub id: String,
}

impl Video {
    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistListResponse {
    #[serde(default)]
    pub items: Vec<Playlist>,
    pub next_page_token: Option<String>,
}

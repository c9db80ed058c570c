use std::io::SeekFrom;
use std::path::Path;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, LOCATION, RANGE};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::ApiError;
use crate::types::{Video, VideoMetadata};
use crate::{YouTubeClient, check};

/// 8 MiB, a multiple of the 256 KiB granularity the upload service requires
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 256 * 1024;

impl YouTubeClient {
    /// Upload a video with the resumable protocol.
    ///
    /// `progress` is called with `(bytes_sent, total_bytes)` after every chunk.
    pub async fn upload_video<F>(
        &self,
        path: &Path,
        metadata: &VideoMetadata,
        mut progress: F,
    ) -> Result<Video, ApiError>
    where
        F: FnMut(u64, u64),
    {
        let io_err = |source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).await.map_err(io_err)?;
        let total = file.metadata().await.map_err(io_err)?.len();
        if total == 0 {
            return Err(ApiError::EmptyFile(path.to_path_buf()));
        }

        let session_url = self.start_upload_session(metadata, total).await?;
        tracing::debug!(%session_url, total, "resumable upload session started");

        let mut buffer = vec![0u8; self.chunk_size];
        let mut offset = 0u64;

        loop {
            let len = read_chunk(&mut file, &mut buffer).await.map_err(io_err)?;
            if len == 0 {
                return Err(ApiError::UploadStalled(offset));
            }
            let end = offset + len as u64 - 1;

            let response = self
                .client
                .put(&session_url)
                .await?
                .header(CONTENT_RANGE, format!("bytes {}-{}/{}", offset, end, total))
                .body(buffer[..len].to_vec())
                .send()
                .await?;

            // 308 Resume Incomplete: more bytes expected
            if response.status() == StatusCode::PERMANENT_REDIRECT {
                let next = persisted_end(&response).map_or(0, |last| last + 1);
                if next <= offset {
                    return Err(ApiError::UploadStalled(offset));
                }
                progress(next, total);
                if next != end + 1 {
                    tracing::debug!(next, "service kept a partial chunk, seeking");
                    file.seek(SeekFrom::Start(next)).await.map_err(io_err)?;
                }
                offset = next;
                continue;
            }

            let video: Video = check(response, "Uploading video").await?.json().await?;
            progress(total, total);
            return Ok(video);
        }
    }

    async fn start_upload_session(
        &self,
        metadata: &VideoMetadata,
        total: u64,
    ) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/upload/youtube/v3/videos"))
            .await?
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header("X-Upload-Content-Length", total.to_string())
            .header("X-Upload-Content-Type", "video/*")
            .json(&metadata.to_resource())
            .send()
            .await?;
        let response = check(response, "Starting upload").await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(ApiError::MissingUploadLocation)
    }
}

/// Fill `buffer` as far as the file allows; returns the number of bytes read
async fn read_chunk(file: &mut File, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Last byte the service has stored, from a `Range: bytes=0-N` header
fn persisted_end(response: &reqwest::Response) -> Option<u64> {
    let range = response.headers().get(RANGE)?.to_str().ok()?;
    range.rsplit('-').next()?.trim().parse().ok()
}

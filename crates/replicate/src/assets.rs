//! Download finished assets for re-hosting.
//!
//! Provider output URLs expire, so the webhook receiver can download the
//! image and serve it from our own asset directory. Downloads use the same
//! bounded-retry policy as every other outbound call.

use std::time::Duration;

use studia_core::retry::{self, RetryConfig};

use crate::client::ReplicateError;

/// HTTP timeout for a single download attempt.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Refuse to buffer assets larger than this (16 MiB).
const MAX_ASSET_BYTES: usize = 16 * 1024 * 1024;

/// A downloaded asset: raw bytes plus the file extension derived from the
/// response content type.
#[derive(Debug, Clone)]
pub struct DownloadedAsset {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

/// Map a content type to the extension used for the stored file.
///
/// Unknown types fall back to `png`, which is what the supported engines
/// produce by default.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type.split(';').next().unwrap_or("").trim() {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}

/// Download an asset with bounded retry.
pub async fn download(url: &str) -> Result<DownloadedAsset, ReplicateError> {
    let http = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .expect("Failed to build reqwest HTTP client");

    retry::with_backoff(&RetryConfig::default(), "Asset download", || {
        try_download(&http, url)
    })
    .await
}

/// Execute a single download attempt.
async fn try_download(
    http: &reqwest::Client,
    url: &str,
) -> Result<DownloadedAsset, ReplicateError> {
    let response = http.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReplicateError::Api {
            status: status.as_u16(),
            detail: format!("asset download from {url}"),
        });
    }

    let extension = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(extension_for)
        .unwrap_or("png");

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_ASSET_BYTES {
        return Err(ReplicateError::Payload(format!(
            "asset exceeds size limit: {} bytes",
            bytes.len()
        )));
    }

    Ok(DownloadedAsset {
        bytes: bytes.to_vec(),
        extension,
    })
}

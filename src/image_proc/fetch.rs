//! URL-based image intake.
//!
//! Fetches a source image over HTTP/HTTPS and decodes it. Uses one shared
//! client so repeated fetches reuse connections instead of rebuilding pools.

use std::time::Duration;

use image::DynamicImage;
use once_cell::sync::Lazy;
use thiserror::Error;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

/// Shared HTTP client for all source fetches
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

/// Fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {status}")]
    Status { status: u16 },

    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Empty URL")]
    EmptyUrl,
}

/// Fetch an image from a URL, retrying transient failures with exponential
/// backoff, and decode it with format sniffing
pub async fn fetch_image(url: &str) -> Result<DynamicImage, FetchError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(FetchError::EmptyUrl);
    }

    tracing::info!("Fetching source image from: {}", url);
    let bytes = fetch_with_retry(url).await?;
    tracing::debug!("Fetched {} bytes, decoding...", bytes.len());

    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FetchError::Decode(image::ImageError::IoError(e)))?;
    let img = reader.decode()?;

    tracing::info!("Source image decoded: {}x{}", img.width(), img.height());
    Ok(img)
}

async fn fetch_with_retry(url: &str) -> Result<bytes::Bytes, FetchError> {
    let mut last_error = FetchError::EmptyUrl;

    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
            tracing::debug!(
                "Retrying fetch ({}/{}) after {:?}",
                attempt + 1,
                MAX_ATTEMPTS,
                delay
            );
            tokio::time::sleep(delay).await;
        }

        let response = match HTTP_CLIENT.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Request failed for {}: {}", url, e);
                last_error = FetchError::Request(e);
                continue;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("HTTP {} for {}", status, url);
            last_error = FetchError::Status {
                status: status.as_u16(),
            };
            continue;
        }

        match response.bytes().await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => {
                tracing::warn!("Failed to read response body: {}", e);
                last_error = FetchError::Request(e);
            }
        }
    }

    Err(last_error)
}

use futures::Stream;
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned error: {0}")]
    ApiError(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Fetches the bytes behind a download directive.
#[derive(Clone, Default)]
pub struct MediaClient {
    client: Client,
}

impl MediaClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only http(s) resources can be streamed.
    pub fn parse_url(raw: &str) -> Result<Url> {
        let url = Url::parse(raw).map_err(|e| ApiError::UnsupportedUrl(format!("{}: {}", raw, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::UnsupportedUrl(format!(
                "{}: scheme {} is not supported",
                raw, other
            ))),
        }
    }

    /// Download file with progress stream
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let url = Self::parse_url(download_url)?;
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}

//! HTTP client for the document platform.

use reqwest::{header, Client, Response, StatusCode};

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Content type a chapter fragment must be served with.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// HTTP client with request timeouts and a shared cookie store.
#[derive(Debug, Clone)]
pub struct SiteClient {
    client: Client,
}

impl SiteClient {
    /// Build a client from the HTTP configuration.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Connectivity(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        tracing::debug!("Response status: {}", response.status());
        Ok(response)
    }

    /// Fetch an HTML page. Anything but HTTP 200 is a connectivity error.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Connectivity(format!(
                "Failed to fetch {}: HTTP {}",
                url, status
            )));
        }

        let text = response.text().await?;
        tracing::debug!("Page length: {} bytes", text.len());
        Ok(text)
    }

    /// Request a chapter fragment.
    ///
    /// The response must be HTTP 200 with a content type of exactly
    /// `application/pdf`; the body is left unread for streaming.
    pub async fn fetch_fragment(&self, url: &str) -> Result<Response> {
        let response = self.get(url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Connectivity(format!(
                "Failed to download {}: HTTP {}",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if content_type != PDF_CONTENT_TYPE {
            return Err(Error::Connectivity(format!(
                "Unexpected content type '{}' from {}",
                content_type, url
            )));
        }

        Ok(response)
    }
}

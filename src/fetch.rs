//! Page fetching.
//!
//! [`Fetcher`] is the network capability a worker depends on. The shipped
//! implementation, [`HttpFetcher`], wraps one `reqwest::Client` whose
//! connection pool is shared by every worker of a run. Deadlines are not
//! handled here; the worker wraps each call in its own timeout.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Why a page could not be fetched. Both variants surface as `FETCH_ERROR`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("server responded with {0}")]
    Status(StatusCode),
    /// Connection, TLS, redirect, URL or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status),
            None => FetchError::Transport(e),
        }
    }
}

/// Downloads the body of a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the full response body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher with the crate's default client settings.
    pub fn with_defaults() -> crate::error::Result<Self> {
        Ok(Self::new(build_client()?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// The HTTP client shared by all workers of a run.
pub fn build_client() -> crate::error::Result<Client> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

mod error;
mod model;
mod omdb;

use ::utils::query_url::with_query;
use ::utils::surf_logging::SurfLogging;
use async_trait::async_trait;
use getset::Getters;
use std::time::Duration;
use surf::Client;

pub use error::UpstreamError;
pub use model::{ItemDetail, Rating, SearchResponse, SearchResultItem};
pub use omdb::DEFAULT_PROVIDER_ERROR;

/// Default time allowed for a provider round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of search results and title details.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Searches titles matching `term`, which must not be blank.
    async fn search(&self, term: &str) -> Result<SearchResponse, UpstreamError>;

    /// Fetches the details of the title with external id `id`, which must not be blank.
    async fn fetch_detail(&self, id: &str) -> Result<ItemDetail, UpstreamError>;
}

/// HTTP client of the upstream movie provider.
///
/// No retries happen here; every failure is handed straight to the caller.
#[derive(Clone, Getters)]
pub struct MovieInfoClient {
    http: Client,
    #[getset(get = "pub")]
    base_url: String,
    api_key: String,
    #[getset(get = "pub")]
    timeout: Duration,
}

impl MovieInfoClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new().with(SurfLogging),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Issues a GET with `params` plus the credential and returns the raw body.
    async fn get_body(&self, params: &[(&str, &str)]) -> Result<String, UpstreamError> {
        let mut query = params.to_vec();
        query.push(("apikey", self.api_key.as_str()));
        let url = with_query(&self.base_url, &query)
            .map_err(|e| UpstreamError::Network(format!("invalid provider url: {}", e)))?;

        let request = async {
            let mut response = self.http.get(url.as_str()).await?;
            let status = response.status();
            if !status.is_success() {
                return Ok::<_, surf::Error>(Err(status as u16));
            }
            let body = response.body_string().await?;
            Ok(Ok(body))
        };

        match tokio::time::timeout(self.timeout, request).await {
            Err(_) => Err(UpstreamError::Network(format!(
                "no response within {} ms",
                self.timeout.as_millis()
            ))),
            Ok(Err(err)) => Err(UpstreamError::Network(err.to_string())),
            Ok(Ok(Err(status))) => Err(UpstreamError::Transport(status)),
            Ok(Ok(Ok(body))) => Ok(body),
        }
    }
}

#[async_trait]
impl MovieProvider for MovieInfoClient {
    async fn search(&self, term: &str) -> Result<SearchResponse, UpstreamError> {
        log::debug!("Searching provider for '{}'", term);
        let body = self.get_body(&[("s", term)]).await?;
        let response = omdb::decode_search(&body)?;
        log::info!(
            "Provider returned {} of {} results for '{}'",
            response.items.len(),
            response.total_available,
            term
        );
        Ok(response)
    }

    async fn fetch_detail(&self, id: &str) -> Result<ItemDetail, UpstreamError> {
        log::debug!("Fetching provider details for '{}'", id);
        let body = self.get_body(&[("i", id), ("plot", "full")]).await?;
        omdb::decode_detail(&body)
    }
}

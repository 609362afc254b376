use crate::error::ClientError;
use ::utils::query_url::build_url;
use ::utils::surf_logging::SurfLogging;
use async_trait::async_trait;
use getset::Getters;
use movie_info::{ItemDetail, SearchResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use surf::{Client, StatusCode};

/// Search and detail endpoints as seen from the client side.
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn search(&self, term: &str) -> Result<SearchResponse, ClientError>;
    async fn detail(&self, id: &str) -> Result<ItemDetail, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client of the movie proxy's `/movies` endpoints.
#[derive(Clone, Getters)]
pub struct ProxyClient {
    http: Client,
    #[getset(get = "pub")]
    base_url: String,
    #[getset(get = "pub")]
    timeout: Option<Duration>,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new().with(SurfLogging),
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = build_url(&self.base_url, segments, params)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let request = async {
            let mut response = self.http.get(url.as_str()).await?;
            let status = response.status();
            let body = response.body_string().await?;
            Ok::<_, surf::Error>((status, body))
        };

        let outcome = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, request).await.map_err(|_| {
                ClientError::Network(format!("no response within {} ms", timeout.as_millis()))
            })?,
            None => request.await,
        };
        let (status, body) = outcome.map_err(|e| ClientError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn status_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|body| body.error)
        .unwrap_or_else(|_| status.canonical_reason().to_string());
    ClientError::Status {
        status: status as u16,
        message,
    }
}

#[async_trait]
impl MovieApi for ProxyClient {
    async fn search(&self, term: &str) -> Result<SearchResponse, ClientError> {
        self.get_json(&["movies", "search"], &[("s", term)]).await
    }

    async fn detail(&self, id: &str) -> Result<ItemDetail, ClientError> {
        self.get_json(&["movies", id], &[]).await
    }
}

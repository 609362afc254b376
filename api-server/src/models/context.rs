use getset::Getters;
use log::info;
use movie_info::{MovieInfoClient, MovieProvider};
use std::sync::Arc;
use std::time::Duration;

use super::config::Config;

/// Per-process state shared by every request handler.
///
/// Holds no per-request data; handlers only read from it.
#[derive(Getters)]
#[get = "pub"]
pub struct Context {
    movie_provider: Arc<dyn MovieProvider>,
    config: Config,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let timeout = Duration::from_secs(*config.upstream_timeout_secs());
        let client = MovieInfoClient::new(config.api_url().clone(), config.api_key().clone())
            .with_timeout(timeout);

        info!(
            "Initialized MovieInfoClient for {} (timeout: {}s)",
            config.api_url(),
            timeout.as_secs()
        );

        Self::with_provider(Arc::new(client), config)
    }

    pub fn with_provider(movie_provider: Arc<dyn MovieProvider>, config: Config) -> Self {
        Self {
            movie_provider,
            config,
        }
    }
}

pub type ContextPointer = Arc<Context>;

use crate::query_url::redact_query;
use std::time::Instant;
use surf::middleware::{Middleware, Next};
use surf::{Client, Request, Response, Result};

/// Query parameters that never reach the log output.
const SECRET_PARAMS: &[&str] = &["apikey", "api_key"];

/// Logs every outgoing surf request with its status and latency.
#[derive(Debug, Default, Clone, Copy)]
pub struct SurfLogging;

#[surf::utils::async_trait]
impl Middleware for SurfLogging {
    async fn handle(&self, req: Request, client: Client, next: Next<'_>) -> Result<Response> {
        let method = req.method();
        let url = redact_query(req.url(), SECRET_PARAMS);
        log::debug!("{} {}", method, url);

        let start = Instant::now();
        let res = next.run(req, client).await;
        let elapsed = start.elapsed();

        match &res {
            Ok(response) => {
                log::info!(
                    "{} {} -> {} ({} ms)",
                    method,
                    url,
                    response.status(),
                    elapsed.as_millis()
                );
            }
            Err(err) => {
                log::warn!(
                    "{} {} failed after {} ms: {}",
                    method,
                    url,
                    elapsed.as_millis(),
                    err
                );
            }
        }
        res
    }
}

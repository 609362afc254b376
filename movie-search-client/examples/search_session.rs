use movie_search_client::{CacheConfig, ProxyClient, SearchSession};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let proxy_url =
        std::env::var("MOVIE_PROXY_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let term = std::env::args().nth(1).unwrap_or_else(|| "alien".to_string());

    let client = ProxyClient::new(proxy_url).with_timeout(Duration::from_secs(15));
    let mut session = SearchSession::with_config(Arc::new(client), CacheConfig::default());

    let start = std::time::Instant::now();
    let response = session.search(&term).resolve().await?;
    println!(
        "'{}': {} of {} results in {:?}",
        term,
        response.items.len(),
        response.total_available,
        start.elapsed()
    );

    loop {
        let view = session.view();
        println!(
            "--- page {}/{} ---",
            view.window.page_index(),
            view.window.total_pages()
        );
        for item in &view.items {
            println!("{} ({}) [{}]", item.title, item.year, item.external_id);
        }
        if !view.window.has_next() {
            break;
        }
        session.next_page();
    }

    if let Some(first) = response.items.first() {
        let detail = session.select(&first.external_id).resolve().await?;
        println!("\n{} - {} - {}", detail.title, detail.runtime, detail.genre);
        for rating in &detail.ratings {
            println!("  {}: {}", rating.source, rating.value);
        }

        // Served from the cache this time
        let start = std::time::Instant::now();
        session.select(&first.external_id).resolve().await?;
        println!("Cached detail lookup took: {:?}", start.elapsed());
    }

    println!("Cache stats: {:?}", session.searches().stats());
    Ok(())
}

use tracing::info;

use crate::error::Result;
use crate::fetch::HttpFetcher;

pub const DEFAULT_URL: &str = "https://www.essencemediacom.ee";

/// Raw HTML of `url` as served, without rendering.
pub async fn run(fetcher: &HttpFetcher, url: &str) -> Result<String> {
    let html = fetcher.get_text(url).await?;
    info!("Fetched {} bytes from {}", html.len(), url);
    Ok(html)
}

//! Sitemap size versus the search engine's `site:` estimate.

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::extract::{search_index, sitemap};
use crate::fetch::HttpFetcher;

pub const DEFAULT_DOMAIN: &str = "rademar.ee";
pub const DEFAULT_SITEMAPS: &[&str] = &[
    "https://api.rademar.ee/google/product_sitemap.xml",
    "https://api.rademar.ee/google/category_sitemap.xml",
];
pub const GOOGLE_BASE_URL: &str = "https://www.google.com";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEstimate {
    Count(u64),
    RateLimited,
    NotFound,
    Failed(String),
}

impl fmt::Display for IndexEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexEstimate::Count(n) => write!(f, "{}", n),
            IndexEstimate::RateLimited => write!(f, "Blocked by Google (Rate Limited)"),
            IndexEstimate::NotFound => write!(
                f,
                "Not found (Google may have changed layout or blocked the request)"
            ),
            IndexEstimate::Failed(e) => write!(f, "Error: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapCount {
    pub url: String,
    /// `None` when the sitemap could not be fetched or parsed.
    pub count: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct IndexAudit {
    pub domain: String,
    pub sitemaps: Vec<SitemapCount>,
    pub estimate: IndexEstimate,
}

impl IndexAudit {
    pub fn total(&self) -> usize {
        self.sitemaps.iter().filter_map(|s| s.count).sum()
    }

    /// Sitemap URLs missing from the index, when the estimate is a number.
    pub fn gap(&self) -> Option<i64> {
        match self.estimate {
            IndexEstimate::Count(indexed) => Some(self.total() as i64 - indexed as i64),
            _ => None,
        }
    }

    pub fn report(&self) -> String {
        let mut lines = vec![format!("--- {} Indexing Audit ---", self.domain)];
        for sitemap in &self.sitemaps {
            let name = sitemap.url.rsplit('/').next().unwrap_or(&sitemap.url);
            match sitemap.count {
                Some(n) => lines.push(format!("Sitemap: {} -> {} URLs", name, n)),
                None => lines.push(format!("Sitemap: {} -> error", name)),
            }
        }
        lines.push(String::new());
        lines.push(format!("Total URLs in Sitemaps: {}", self.total()));
        lines.push(format!("Google Indexed Count (site:): {}", self.estimate));
        if let Some(gap) = self.gap() {
            lines.push(format!(
                "Indexing Gap: {} pages are missing from search results.",
                gap
            ));
        }
        lines.join("\n")
    }
}

pub async fn count_sitemaps(fetcher: &HttpFetcher, urls: &[String]) -> Vec<SitemapCount> {
    let mut counts = Vec::with_capacity(urls.len());
    for url in urls {
        let count = match fetcher.get_bytes(url).await {
            Ok(body) => match sitemap::count_locs(&body) {
                Ok(n) => {
                    info!("Sitemap {} -> {} URLs", url, n);
                    Some(n)
                }
                Err(e) => {
                    warn!("Error parsing sitemap {}: {}", url, e);
                    None
                }
            },
            Err(e) => {
                warn!("Error fetching sitemap {}: {}", url, e);
                None
            }
        };
        counts.push(SitemapCount {
            url: url.clone(),
            count,
        });
    }
    counts
}

pub async fn indexed_count(fetcher: &HttpFetcher, search_base: &str, domain: &str) -> IndexEstimate {
    let url = format!(
        "{}/search?q=site:{}&hl=en",
        search_base.trim_end_matches('/'),
        domain
    );
    let html = match fetcher.get_text_within(&url, SEARCH_TIMEOUT).await {
        Ok(html) => html,
        Err(ScrapeError::RateLimited(_)) => return IndexEstimate::RateLimited,
        Err(e) => return IndexEstimate::Failed(e.to_string()),
    };
    match search_index::parse_result_stats(&html) {
        Ok(Some(n)) => IndexEstimate::Count(n),
        Ok(None) => IndexEstimate::NotFound,
        Err(e) => IndexEstimate::Failed(e.to_string()),
    }
}

pub async fn run(fetcher: &HttpFetcher, search_base: &str, domain: &str, sitemaps: &[String]) -> IndexAudit {
    let sitemaps = count_sitemaps(fetcher, sitemaps).await;
    let estimate = indexed_count(fetcher, search_base, domain).await;
    IndexAudit {
        domain: domain.to_string(),
        sitemaps,
        estimate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit(estimate: IndexEstimate) -> IndexAudit {
        IndexAudit {
            domain: "rademar.ee".into(),
            sitemaps: vec![
                SitemapCount { url: "https://api.rademar.ee/google/product_sitemap.xml".into(), count: Some(1200) },
                SitemapCount { url: "https://api.rademar.ee/google/category_sitemap.xml".into(), count: None },
            ],
            estimate,
        }
    }

    #[test]
    fn gap_only_for_numeric_estimate() {
        assert_eq!(audit(IndexEstimate::Count(900)).gap(), Some(300));
        assert_eq!(audit(IndexEstimate::Count(1500)).gap(), Some(-300));
        assert_eq!(audit(IndexEstimate::RateLimited).gap(), None);
    }

    #[test]
    fn report_lines() {
        let report = audit(IndexEstimate::Count(900)).report();
        assert!(report.contains("Sitemap: product_sitemap.xml -> 1200 URLs"));
        assert!(report.contains("Sitemap: category_sitemap.xml -> error"));
        assert!(report.contains("Total URLs in Sitemaps: 1200"));
        assert!(report.contains("Indexing Gap: 300 pages"));

        let blocked = audit(IndexEstimate::RateLimited).report();
        assert!(blocked.contains("Google Indexed Count (site:): Blocked by Google (Rate Limited)"));
        assert!(!blocked.contains("Indexing Gap"));
    }
}

//! Sponsored results per keyword on Google and Bing.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::Result;
use crate::extract::search_ads::{AdBlock, Engine};
use crate::fetch::{BrowserSession, BrowserSettings};
use crate::normalize::NOT_AVAILABLE;
use crate::record::AdRecord;
use crate::sink;

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "elekter",
    "elektrileping",
    "elektripaketid",
    "elektribörs",
    "börsielekter",
    "elektri börsihind",
    "elektri paketid",
    "elektrimüüjad",
];
pub const DEFAULT_OUTPUT: &str = "search_ads.json";

const ENGINES: [Engine; 2] = [Engine::Google, Engine::Bing];

#[derive(Debug, Clone)]
pub struct SearchAdsJob {
    pub keywords: Vec<String>,
    /// Per keyword and engine.
    pub max_ads: Option<usize>,
    pub settle: Duration,
    pub output: PathBuf,
    pub csv_output: Option<PathBuf>,
}

impl SearchAdsJob {
    pub fn new(keywords: Vec<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            keywords,
            max_ads: None,
            settle: Duration::from_secs(3),
            output: output.into(),
            csv_output: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordAds {
    pub keyword: String,
    pub google: Vec<AdRecord>,
    pub bing: Vec<AdRecord>,
}

impl KeywordAds {
    fn slot(&mut self, engine: Engine) -> &mut Vec<AdRecord> {
        match engine {
            Engine::Google => &mut self.google,
            Engine::Bing => &mut self.bing,
        }
    }
}

/// Turns one result page's ad blocks into records, dropping repeats of the
/// same destination and stopping at `max_ads`.
pub fn collect_ads(
    keyword: &str,
    engine: Engine,
    blocks: Vec<AdBlock>,
    max_ads: Option<usize>,
    scraped_at: &str,
) -> Vec<AdRecord> {
    let mut seen = HashSet::new();
    let mut ads = Vec::new();

    for block in blocks {
        if max_ads.is_some_and(|max| ads.len() >= max) {
            break;
        }
        if block.text.is_empty() {
            continue;
        }
        let key = if block.url == NOT_AVAILABLE {
            block.text.clone()
        } else {
            block.url.clone()
        };
        if !seen.insert(key) {
            continue;
        }
        ads.push(AdRecord {
            keyword: keyword.to_string(),
            engine: engine.to_string(),
            text: block.text,
            url: block.url,
            scraped_at: scraped_at.to_string(),
        });
    }
    ads
}

async fn scrape_engine(
    session: &BrowserSession,
    job: &SearchAdsJob,
    keyword: &str,
    engine: Engine,
) -> Result<Vec<AdRecord>> {
    session.goto(&engine.search_url(keyword)).await?;
    session.settle(job.settle).await;
    let html = session.html().await?;
    let blocks = engine.extract(&html)?;
    let scraped_at = Utc::now().to_rfc3339();
    Ok(collect_ads(keyword, engine, blocks, job.max_ads, &scraped_at))
}

async fn scrape_keywords(session: &BrowserSession, job: &SearchAdsJob) -> Vec<KeywordAds> {
    let mut results = Vec::with_capacity(job.keywords.len());

    for keyword in &job.keywords {
        let mut found = KeywordAds {
            keyword: keyword.clone(),
            ..KeywordAds::default()
        };
        for engine in ENGINES {
            match scrape_engine(session, job, keyword, engine).await {
                Ok(ads) => {
                    info!("{} ads on {} for '{}'", ads.len(), engine, keyword);
                    *found.slot(engine) = ads;
                }
                Err(e) => warn!("Failed to scrape {} for '{}': {}", engine, keyword, e),
            }
        }
        results.push(found);
    }
    results
}

pub async fn run(settings: &BrowserSettings, job: &SearchAdsJob) -> Result<Vec<KeywordAds>> {
    let session = BrowserSession::launch(settings).await?;
    let results = scrape_keywords(&session, job).await;
    session.close().await;

    let records = flatten(&results);
    sink::json::write_array(&job.output, &records)?;
    if let Some(csv_path) = &job.csv_output {
        sink::csv::write_all(csv_path, &records)?;
    }
    Ok(results)
}

pub fn flatten(results: &[KeywordAds]) -> Vec<AdRecord> {
    results
        .iter()
        .flat_map(|r| r.google.iter().chain(r.bing.iter()))
        .cloned()
        .collect()
}

pub fn report(results: &[KeywordAds]) -> String {
    let mut lines = Vec::new();
    for result in results {
        lines.push(format!("Keyword: {}", result.keyword));
        lines.push("Google Ads:".to_string());
        lines.extend(result.google.iter().map(|ad| format!("  - {}", ad.text)));
        lines.push("Bing Ads:".to_string());
        lines.extend(result.bing.iter().map(|ad| format!("  - {}", ad.text)));
        lines.push("-".repeat(40));
    }
    lines.join("\n")
}

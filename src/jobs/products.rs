//! Weekly offers grid: CSV export and merchant feed.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::Result;
use crate::extract::prisma::{self, PRODUCT_CARD, ProductPage, ProductScan};
use crate::fetch::{BrowserSession, BrowserSettings};
use crate::sink::{self, FeedChannel};

pub const DEFAULT_CSV_OUTPUT: &str = "prisma_products.csv";
pub const DEFAULT_FEED_OUTPUT: &str = "cropink_feed.xml";

#[derive(Debug, Clone)]
pub struct ProductsJob {
    pub url: String,
    pub output: PathBuf,
    pub card_timeout: Duration,
}

impl ProductsJob {
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
            card_timeout: Duration::from_secs(30),
        }
    }
}

/// Loads the grid and waits for the first product card. Either failing aborts
/// the run before anything is written.
async fn load_grid(session: &BrowserSession, job: &ProductsJob) -> Result<String> {
    session.goto(&job.url).await?;
    info!("Page loaded, waiting for product cards");
    session.wait_for(PRODUCT_CARD, job.card_timeout).await?;
    info!("Product cards visible, starting extraction");
    session.html().await
}

async fn scrape_grid(settings: &BrowserSettings, job: &ProductsJob) -> Result<String> {
    let session = BrowserSession::launch(settings).await?;
    let html = load_grid(&session, job).await;
    session.close().await;
    html
}

/// Scrapes the grid into a CSV file. Returns how many rows were written.
pub async fn export_csv(settings: &BrowserSettings, job: &ProductsJob) -> Result<usize> {
    let html = scrape_grid(settings, job).await?;

    let offer_period = match prisma::extract_offer_period(&html) {
        Ok(period) => period,
        Err(e) => {
            warn!("Could not extract offer period: {}", e);
            None
        }
    };
    info!("Offer period: {}", offer_period.as_deref().unwrap_or("N/A"));

    let scan = prisma::extract_products(&html, &ProductPage::weekly_offers(offer_period))?;
    log_scan(&scan);

    let written = sink::csv::write_all(&job.output, &scan.products)?;
    Ok(if written { scan.products.len() } else { 0 })
}

/// Scrapes the grid into an RSS merchant feed. Returns the item count.
pub async fn export_feed(settings: &BrowserSettings, job: &ProductsJob) -> Result<usize> {
    let html = scrape_grid(settings, job).await?;

    let scan = prisma::extract_products(&html, &ProductPage::feed())?;
    log_scan(&scan);

    sink::feed::write_feed_file(&job.output, &FeedChannel::prisma(), &scan.products)
}

fn log_scan(scan: &ProductScan) {
    info!(
        "Found {} product cards, collected {} products ({} skipped for missing image)",
        scan.cards,
        scan.products.len(),
        scan.skipped
    );
}

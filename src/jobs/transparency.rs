//! Creatives an advertiser domain runs in one region, per the Ads
//! Transparency Center. Rows are streamed to CSV as they are discovered.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::Result;
use crate::extract::transparency::{self, Creative, SEE_ALL_ADS};
use crate::fetch::{BrowserSession, BrowserSettings};
use crate::normalize::NOT_AVAILABLE;
use crate::record::describe;
use crate::sink::csv::CsvAppender;

pub const DEFAULT_REGION: &str = "EE";
pub const DEFAULT_DOMAIN: &str = "seb.ee";
pub const DEFAULT_OUTPUT: &str = "transparency_ads.csv";

#[derive(Debug, Clone)]
pub struct TransparencyJob {
    pub region: String,
    pub domain: String,
    pub output: PathBuf,
    pub settle: Duration,
    pub click_wait: Duration,
    pub max_clicks: usize,
    pub scroll_pause: Duration,
    pub max_scroll_steps: usize,
}

impl TransparencyJob {
    pub fn new(region: impl Into<String>, domain: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            region: region.into(),
            domain: domain.into(),
            output: output.into(),
            settle: Duration::from_secs(5),
            click_wait: Duration::from_secs(10),
            max_clicks: 20,
            scroll_pause: Duration::from_secs(2),
            max_scroll_steps: 30,
        }
    }
}

/// Deduplicates creatives across page snapshots and appends new ones to CSV.
pub struct CreativeCollector {
    seen: HashSet<String>,
    out: CsvAppender,
    region: String,
    domain: String,
}

impl CreativeCollector {
    pub fn new(out: CsvAppender, region: &str, domain: &str) -> Self {
        Self {
            seen: HashSet::new(),
            out,
            region: region.to_string(),
            domain: domain.to_string(),
        }
    }

    fn key(creative: &Creative) -> String {
        if creative.creative_url == NOT_AVAILABLE {
            format!("{}|{}", creative.advertiser_name, creative.image_url)
        } else {
            creative.creative_url.clone()
        }
    }

    /// Writes creatives not seen before in this run; returns how many were new.
    pub fn absorb(&mut self, creatives: Vec<Creative>) -> Result<usize> {
        let scraped_at = Utc::now().to_rfc3339();
        let mut fresh = 0;
        for creative in creatives {
            if !self.seen.insert(Self::key(&creative)) {
                continue;
            }
            let record = creative.into_record(&self.region, &self.domain, &scraped_at);
            info!("Ad: {}", describe(&record));
            self.out.append(&record)?;
            fresh += 1;
        }
        Ok(fresh)
    }

    pub fn finish(self) -> Result<usize> {
        self.out.finish()
    }
}

/// Page operations the "See all ads" loop drives.
trait ListingPage {
    /// Reveals more creatives. `Ok(false)` once the button is gone.
    async fn load_more(&self, job: &TransparencyJob) -> Result<bool>;
    async fn rendered_html(&self) -> Result<String>;
}

impl ListingPage for BrowserSession {
    async fn load_more(&self, job: &TransparencyJob) -> Result<bool> {
        if !self.click_when_clickable(SEE_ALL_ADS, job.click_wait).await? {
            return Ok(false);
        }
        self.settle(job.settle).await;
        if let Err(e) = self.scroll_to_end(job.scroll_pause, job.max_scroll_steps).await {
            warn!("Scrolling failed: {}", e);
        }
        Ok(true)
    }

    async fn rendered_html(&self) -> Result<String> {
        self.html().await
    }
}

fn absorb_html(html: &str, collector: &mut CreativeCollector) -> Result<usize> {
    match transparency::extract_creatives(html) {
        Ok(creatives) => collector.absorb(creatives),
        Err(e) => {
            warn!("Error extracting ad data: {}", e);
            Ok(0)
        }
    }
}

/// Clicks through the listing until the button disappears, a page operation
/// fails or `max_clicks` is reached. Only CSV write errors are returned.
async fn expand_listing<P: ListingPage>(
    page: &P,
    job: &TransparencyJob,
    collector: &mut CreativeCollector,
) -> Result<usize> {
    for click in 1..=job.max_clicks {
        match page.load_more(job).await {
            Ok(true) => {}
            Ok(false) => {
                info!("No more ads to load");
                return Ok(click - 1);
            }
            Err(e) => {
                warn!("No more ads to load or error: {}", e);
                return Ok(click - 1);
            }
        }
        let html = match page.rendered_html().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not read page after click {}: {}", click, e);
                return Ok(click);
            }
        };
        let fresh = absorb_html(&html, collector)?;
        info!("After click {}: {} new creatives", click, fresh);
    }
    warn!("Stopped after {} clicks", job.max_clicks);
    Ok(job.max_clicks)
}

async fn crawl(session: &BrowserSession, job: &TransparencyJob, collector: &mut CreativeCollector) -> Result<()> {
    session.goto(&transparency::listing_url(&job.region, &job.domain)).await?;
    session.settle(job.settle).await;
    let html = session.html().await?;
    let fresh = absorb_html(&html, collector)?;
    info!("Initial page: {} creatives", fresh);

    expand_listing(session, job, collector).await?;
    Ok(())
}

/// Returns the number of distinct creatives written.
pub async fn run(settings: &BrowserSettings, job: &TransparencyJob) -> Result<usize> {
    let mut collector = CreativeCollector::new(CsvAppender::create(&job.output)?, &job.region, &job.domain);

    let session = BrowserSession::launch(settings).await?;
    let crawled = crawl(&session, job, &mut collector).await;
    session.close().await;

    let written = collector.finish()?;
    crawled?;
    info!("Wrote {} creatives to {}", written, job.output.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::error::ScrapeError;
    use crate::record::CreativeRecord;
    use crate::sink::csv::read_all;

    /// Scripted listing: each click outcome is paired with the page shown after it.
    struct ScriptedListing {
        clicks: RefCell<VecDeque<Result<bool>>>,
        pages: RefCell<VecDeque<Result<String>>>,
    }

    impl ScriptedListing {
        fn new(clicks: Vec<Result<bool>>, pages: Vec<Result<String>>) -> Self {
            Self {
                clicks: RefCell::new(clicks.into()),
                pages: RefCell::new(pages.into()),
            }
        }
    }

    impl ListingPage for ScriptedListing {
        async fn load_more(&self, _job: &TransparencyJob) -> Result<bool> {
            self.clicks.borrow_mut().pop_front().unwrap_or(Ok(false))
        }

        async fn rendered_html(&self) -> Result<String> {
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn listing(ids: &[&str]) -> Result<String> {
        Ok(ids
            .iter()
            .map(|id| {
                format!(
                    r#"<creative-preview><div class="advertiser-name">SEB</div><a href="/advertiser/AR1/creative/{}">x</a></creative-preview>"#,
                    id
                )
            })
            .collect())
    }

    fn stale() -> ScrapeError {
        ScrapeError::Timeout(Duration::from_secs(10), "stale element".into())
    }

    fn setup(dir: &tempfile::TempDir) -> (TransparencyJob, CreativeCollector) {
        let path = dir.path().join("ads.csv");
        let job = TransparencyJob::new("EE", "seb.ee", &path);
        let collector = CreativeCollector::new(CsvAppender::create(&path).unwrap(), "EE", "seb.ee");
        (job, collector)
    }

    #[tokio::test]
    async fn click_error_ends_the_loop_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let (job, mut collector) = setup(&dir);
        let page = ScriptedListing::new(vec![Ok(true), Err(stale())], vec![listing(&["CR1", "CR2"])]);

        let clicks = expand_listing(&page, &job, &mut collector).await.unwrap();
        assert_eq!(clicks, 1);
        assert_eq!(collector.finish().unwrap(), 2);

        let rows: Vec<CreativeRecord> = read_all(&job.output).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn unreadable_page_after_click_ends_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let (job, mut collector) = setup(&dir);
        let page = ScriptedListing::new(
            vec![Ok(true), Ok(true), Ok(true)],
            vec![listing(&["CR1"]), Err(stale()), listing(&["CR9"])],
        );

        let clicks = expand_listing(&page, &job, &mut collector).await.unwrap();
        assert_eq!(clicks, 2);
        assert_eq!(collector.finish().unwrap(), 1);
    }

    #[tokio::test]
    async fn stops_when_button_is_gone_or_cap_reached() {
        let dir = tempfile::tempdir().unwrap();
        let (mut job, mut collector) = setup(&dir);
        let page = ScriptedListing::new(
            vec![Ok(true), Ok(false)],
            vec![listing(&["CR1", "CR1"])],
        );
        assert_eq!(expand_listing(&page, &job, &mut collector).await.unwrap(), 1);

        job.max_clicks = 2;
        let endless = ScriptedListing::new(
            vec![Ok(true), Ok(true), Ok(true)],
            vec![listing(&["CR2"]), listing(&["CR3"]), listing(&["CR4"])],
        );
        assert_eq!(expand_listing(&endless, &job, &mut collector).await.unwrap(), 2);
        assert_eq!(collector.finish().unwrap(), 3);
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use shelfwatch::config::{Settings, proxy_with_credentials};
use shelfwatch::extract::prisma::WEEKLY_OFFERS_URL;
use shelfwatch::jobs::{fetch_html, index_audit, products, search_ads, transparency};

#[derive(Parser, Debug)]
#[command(name = "shelfwatch", version, about = "Retail shelf and ad placement scrapers")]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// WebDriver endpoint (chromedriver)
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515", global = true)]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long, env = "HEADLESS", default_value_t = true, action = ArgAction::Set, global = true)]
    pub headless: bool,

    /// Proxy URL for browser and HTTP traffic
    #[arg(long, env = "PROXY_URL", global = true)]
    pub proxy: Option<String>,

    #[arg(long, env = "PROXY_USERNAME", global = true)]
    pub proxy_user: Option<String>,

    #[arg(long, env = "PROXY_PASSWORD", hide_env_values = true, global = true)]
    pub proxy_pass: Option<String>,

    /// Timeout for plain HTTP requests, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub http_timeout: u64,
}

impl ConnectionArgs {
    pub fn settings(&self) -> Result<Settings> {
        let proxy = match &self.proxy {
            Some(proxy) => Some(
                proxy_with_credentials(proxy, self.proxy_user.as_deref(), self.proxy_pass.as_deref())
                    .context("Failed to build proxy URL")?,
            ),
            None => None,
        };
        Ok(Settings::new(&self.webdriver_url, self.headless, proxy)
            .with_http_timeout(Duration::from_secs(self.http_timeout)))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export the weekly offers grid to CSV
    Products {
        #[arg(long, default_value = WEEKLY_OFFERS_URL)]
        url: String,

        #[arg(short, long, env = "OUTPUT_FILE", default_value = products::DEFAULT_CSV_OUTPUT)]
        output: PathBuf,
    },

    /// Generate an RSS merchant feed from the weekly offers grid
    Feed {
        #[arg(long, default_value = WEEKLY_OFFERS_URL)]
        url: String,

        #[arg(short, long, env = "OUTPUT_FILE", default_value = products::DEFAULT_FEED_OUTPUT)]
        output: PathBuf,
    },

    /// Compare sitemap URL totals with the search engine's index estimate
    IndexAudit {
        #[arg(long, default_value = index_audit::DEFAULT_DOMAIN)]
        domain: String,

        /// Sitemap URL (repeatable)
        #[arg(long = "sitemap")]
        sitemaps: Vec<String>,

        #[arg(long, default_value = index_audit::GOOGLE_BASE_URL, hide = true)]
        search_base: String,
    },

    /// Collect sponsored results for keywords on Google and Bing
    SearchAds {
        /// Search keyword (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Maximum ads kept per keyword and engine
        #[arg(long, env = "MAX_ADS_PER_KEYWORD")]
        max_ads: Option<usize>,

        #[arg(short, long, env = "OUTPUT_FILE", default_value = search_ads::DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Also write the ads as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Stream an advertiser domain's creatives from the Ads Transparency Center to CSV
    Transparency {
        #[arg(long, default_value = transparency::DEFAULT_REGION)]
        region: String,

        #[arg(long, default_value = transparency::DEFAULT_DOMAIN)]
        domain: String,

        #[arg(short, long, env = "OUTPUT_FILE", default_value = transparency::DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Upper bound on "See all ads" clicks
        #[arg(long, default_value_t = 20)]
        max_clicks: usize,
    },

    /// Print a page's raw HTML
    FetchHtml {
        #[arg(long, default_value = fetch_html::DEFAULT_URL)]
        url: String,
    },
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

pub async fn run(cli: Cli) -> Result<()> {
    let settings = cli.connection.settings()?;

    match cli.command {
        Command::Products { url, output } => {
            let job = products::ProductsJob::new(url, output);
            let written = products::export_csv(&settings.browser, &job)
                .await
                .context("Product export failed")?;
            if written > 0 {
                println!("Data saved to {} ({} products)", job.output.display(), written);
            } else {
                println!("No products scraped and no CSV file created.");
            }
        }
        Command::Feed { url, output } => {
            let job = products::ProductsJob::new(url, output);
            let items = products::export_feed(&settings.browser, &job)
                .await
                .context("Feed generation failed")?;
            println!(
                "Successfully generated XML feed with {} products to {}",
                items,
                job.output.display()
            );
        }
        Command::IndexAudit {
            domain,
            sitemaps,
            search_base,
        } => {
            let sitemaps = if sitemaps.is_empty() {
                owned(index_audit::DEFAULT_SITEMAPS)
            } else {
                sitemaps
            };
            let fetcher = shelfwatch::fetch::HttpFetcher::new(&settings.http)?;
            let audit = index_audit::run(&fetcher, &search_base, &domain, &sitemaps).await;
            println!("{}", audit.report());
        }
        Command::SearchAds {
            keywords,
            max_ads,
            output,
            csv,
        } => {
            let keywords = if keywords.is_empty() {
                owned(search_ads::DEFAULT_KEYWORDS)
            } else {
                keywords
            };
            let mut job = search_ads::SearchAdsJob::new(keywords, output);
            job.max_ads = max_ads;
            job.csv_output = csv;
            let results = search_ads::run(&settings.browser, &job)
                .await
                .context("Search ad scrape failed")?;
            println!("{}", search_ads::report(&results));
        }
        Command::Transparency {
            region,
            domain,
            output,
            max_clicks,
        } => {
            let mut job = transparency::TransparencyJob::new(region, domain, output);
            job.max_clicks = max_clicks;
            let written = transparency::run(&settings.browser, &job)
                .await
                .context("Transparency scrape failed")?;
            println!("Saved {} creatives to {}", written, job.output.display());
        }
        Command::FetchHtml { url } => {
            let fetcher = shelfwatch::fetch::HttpFetcher::new(&settings.http)?;
            let html = fetch_html::run(&fetcher, &url)
                .await
                .with_context(|| format!("Error fetching website HTML from {}", url))?;
            println!("{}", html);
        }
    }
    Ok(())
}

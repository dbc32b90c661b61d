use std::time::Duration;

use thirtyfour::ChromiumLikeCapabilities;
use thirtyfour::prelude::*;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::fetch::http::DESKTOP_USER_AGENT;

const READY_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub proxy: Option<String>,
    pub user_agent: String,
    pub page_load_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            proxy: None,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            page_load_timeout: Duration::from_secs(60),
        }
    }
}

/// `--proxy-server` value for Chrome, which takes no credentials.
pub fn chrome_proxy_arg(proxy: &str) -> Option<String> {
    let url = url::Url::parse(proxy).ok()?;
    let host = url.host_str()?;
    let server = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };
    Some(format!("--proxy-server={}", server))
}

/// One WebDriver-controlled browser, driven strictly in sequence.
pub struct BrowserSession {
    driver: WebDriver,
    page_load_timeout: Duration,
}

impl BrowserSession {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.set_headless()?;
        }
        caps.set_no_sandbox()?;
        caps.set_disable_dev_shm_usage()?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_arg("window-size=1920,1080")?;
        caps.add_arg(&format!("user-agent={}", settings.user_agent))?;

        if let Some(proxy) = &settings.proxy {
            match chrome_proxy_arg(proxy) {
                Some(arg) => {
                    if proxy.contains('@') {
                        warn!("Browser proxy credentials are not forwarded to Chrome");
                    }
                    caps.add_arg(&arg)?;
                }
                None => warn!("Ignoring unparseable proxy URL for the browser"),
            }
        }

        info!("Connecting to WebDriver at {}", settings.webdriver_url);
        let driver = WebDriver::new(settings.webdriver_url.as_str(), caps).await?;
        Ok(Self {
            driver,
            page_load_timeout: settings.page_load_timeout,
        })
    }

    /// Navigates and waits until the document reports `complete`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        match timeout(self.page_load_timeout, self.load(url)).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout(self.page_load_timeout, url.to_string())),
        }
    }

    async fn load(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        self.wait_ready().await
    }

    async fn wait_ready(&self) -> Result<()> {
        loop {
            let ret = self
                .driver
                .execute("return document.readyState;", Vec::new())
                .await?;
            if ret.json().as_str() == Some("complete") {
                return Ok(());
            }
            sleep(READY_POLL).await;
        }
    }

    pub async fn wait_for(&self, css: &str, wait: Duration) -> Result<()> {
        debug!("Waiting up to {:?} for {}", wait, css);
        self.driver
            .query(By::Css(css))
            .wait(wait, READY_POLL)
            .first()
            .await
            .map_err(|_| ScrapeError::Timeout(wait, css.to_string()))?;
        Ok(())
    }

    pub async fn settle(&self, pause: Duration) {
        sleep(pause).await;
    }

    /// The rendered DOM as it stands now.
    pub async fn html(&self) -> Result<String> {
        Ok(self.driver.source().await?)
    }

    /// Clicks the element at `xpath` once it is clickable. `Ok(false)` when it
    /// never became clickable within `wait`.
    pub async fn click_when_clickable(&self, xpath: &str, wait: Duration) -> Result<bool> {
        let found = self
            .driver
            .query(By::XPath(xpath))
            .and_clickable()
            .wait(wait, READY_POLL)
            .first()
            .await;
        let element = match found {
            Ok(element) => element,
            Err(e) => {
                debug!("{} not clickable: {}", xpath, e);
                return Ok(false);
            }
        };
        element.click().await?;
        Ok(true)
    }

    /// Scrolls to the bottom until the page height stops growing. Returns the
    /// number of scroll steps taken.
    pub async fn scroll_to_end(&self, pause: Duration, max_steps: usize) -> Result<usize> {
        let started = Instant::now();
        let mut last_height = self.page_height().await?;

        for step in 0..max_steps {
            self.driver
                .execute("window.scrollTo(0, document.body.scrollHeight);", Vec::new())
                .await?;
            sleep(pause).await;

            let height = self.page_height().await?;
            if height <= last_height {
                debug!("Page height settled at {} after {:?}", height, started.elapsed());
                return Ok(step + 1);
            }
            last_height = height;
        }
        Ok(max_steps)
    }

    async fn page_height(&self) -> Result<i64> {
        let ret = self
            .driver
            .execute("return document.body.scrollHeight;", Vec::new())
            .await?;
        Ok(ret.json().as_i64().unwrap_or(0))
    }

    pub async fn close(self) {
        if let Err(e) = self.driver.quit().await {
            warn!("Failed to close browser session: {}", e);
        }
    }
}

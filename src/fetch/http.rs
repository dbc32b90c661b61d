use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::USER_AGENT;
use tracing::debug;

use crate::error::{Result, ScrapeError};

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DESKTOP_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            proxy: None,
        }
    }
}

/// Plain HTTP GETs for pages that do not need a browser.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(settings.timeout);
        if let Some(proxy) = &settings.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        Ok(Self {
            client: builder.build()?,
            user_agent: settings.user_agent.clone(),
        })
    }

    async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let mut request = self.client.get(url).header(USER_AGENT, self.user_agent.as_str());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScrapeError::RateLimited(url.to_string()));
        }
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url, None).await?.text().await?)
    }

    /// Like [`get_text`](Self::get_text) with a tighter per-request timeout.
    pub async fn get_text_within(&self, url: &str, timeout: Duration) -> Result<String> {
        Ok(self.get(url, Some(timeout)).await?.text().await?)
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url, None).await?.bytes().await?.to_vec())
    }
}

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {0}")]
    RateLimited(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("timed out after {0:?}: {1}")]
    Timeout(Duration, String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected page content: {0}")]
    Content(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<quick_xml::Error> for ScrapeError {
    fn from(e: quick_xml::Error) -> Self {
        ScrapeError::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

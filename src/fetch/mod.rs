//! Page loading: plain HTTP for static documents, WebDriver for rendered pages.

pub mod browser;
pub mod http;

pub use browser::{BrowserSession, BrowserSettings};
pub use http::{HttpFetcher, HttpSettings};

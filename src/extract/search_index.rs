use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use super::{element_text, selector};
use crate::error::{Result, ScrapeError};
use crate::normalize::digits_only;

const RESULT_STATS: &str = "div#result-stats";

// "About 15,200 results (0.31 seconds)": only the first figure is the count.
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,.\s]*").expect("valid regex"));

/// Estimated result count from a Google results page, `None` when the
/// `result-stats` block is absent.
pub fn parse_result_stats(html: &str) -> Result<Option<u64>> {
    let document = Html::parse_document(html);
    let stats = selector(RESULT_STATS)?;

    let Some(div) = document.select(&stats).next() else {
        return Ok(None);
    };

    let text = element_text(div);
    let digits = FIRST_NUMBER
        .find(&text)
        .map(|m| digits_only(m.as_str()))
        .unwrap_or_default();

    if digits.is_empty() {
        return Ok(Some(0));
    }
    digits
        .parse::<u64>()
        .map(Some)
        .map_err(|e| ScrapeError::Content(format!("result count {}: {}", digits, e)))
}

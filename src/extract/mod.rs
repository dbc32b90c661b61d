//! Selector-driven extraction over rendered HTML snapshots.

pub mod prisma;
pub mod search_ads;
pub mod search_index;
pub mod sitemap;
pub mod transparency;

use scraper::{ElementRef, Selector};

use crate::error::{Result, ScrapeError};
use crate::normalize::collapse_whitespace;

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{}: {}", css, e)))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

/// Text of the first element under `scope` matching `selector`, if non-empty.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn first_text_collapses_and_skips_empty() {
        let html = Html::parse_fragment("<div><p>  Tere \n maailm </p><span> </span></div>");
        let root = html.root_element();
        assert_eq!(first_text(root, &selector("p").unwrap()).as_deref(), Some("Tere maailm"));
        assert_eq!(first_text(root, &selector("span").unwrap()), None);
        assert_eq!(first_text(root, &selector("h1").unwrap()), None);
    }

    #[test]
    fn bad_selector_is_an_error() {
        assert!(matches!(selector("div[[["), Err(ScrapeError::Selector(_))));
    }
}

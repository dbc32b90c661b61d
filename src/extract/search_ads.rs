//! Sponsored results on Google and Bing result pages.

use std::fmt;

use scraper::{ElementRef, Html};

use super::{element_text, first_attr, selector};
use crate::error::Result;
use crate::normalize::{NOT_AVAILABLE, absolutize, collapse_whitespace};

pub const GOOGLE_SEARCH_URL: &str = "https://www.google.ee/search?q=";
pub const BING_SEARCH_URL: &str = "https://www.bing.com/search?q=";

const GOOGLE_TEXT_AD: &str = "div[data-text-ad]";
const BING_AD: &str = "li.b_ad";

/// Labels Google prints next to a sponsored block (Estonian and English).
const GOOGLE_LABELS: &[&str] = &["Reklaam", "Sponsored", "Sponsitud", "Sponsoreeritud"];
const BING_LABELS: &[&str] = &["reklaam", "sponsitud", "sponsoreeritud", "sponsored", "ad"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Google,
    Bing,
}

impl Engine {
    pub fn search_url(self, keyword: &str) -> String {
        let base = match self {
            Engine::Google => GOOGLE_SEARCH_URL,
            Engine::Bing => BING_SEARCH_URL,
        };
        let encoded: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
        format!("{}{}", base, encoded)
    }

    fn base_url(self) -> &'static str {
        match self {
            Engine::Google => "https://www.google.ee",
            Engine::Bing => "https://www.bing.com",
        }
    }

    pub fn extract(self, html: &str) -> Result<Vec<AdBlock>> {
        match self {
            Engine::Google => google_ads(html),
            Engine::Bing => bing_ads(html),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Google => write!(f, "google"),
            Engine::Bing => write!(f, "bing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdBlock {
    pub text: String,
    pub url: String,
}

fn ad_block(element: ElementRef<'_>, engine: Engine) -> Result<AdBlock> {
    let link = selector("a[href]")?;
    let url = first_attr(element, &link, "href")
        .map(|href| absolutize(engine.base_url(), &href))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    Ok(AdBlock {
        text: element_text(element),
        url,
    })
}

pub fn google_ads(html: &str) -> Result<Vec<AdBlock>> {
    let document = Html::parse_document(html);
    let text_ad = selector(GOOGLE_TEXT_AD)?;

    let direct: Vec<ElementRef<'_>> = document.select(&text_ad).collect();
    let blocks = if direct.is_empty() {
        labelled_containers(&document)?
    } else {
        direct
    };

    blocks
        .into_iter()
        .map(|el| ad_block(el, Engine::Google))
        .collect()
}

/// Finds label spans and climbs to the nearest `div[data-content-feature]`.
fn labelled_containers(document: &Html) -> Result<Vec<ElementRef<'_>>> {
    let span = selector("span")?;
    let mut containers: Vec<ElementRef<'_>> = Vec::new();

    for label in document.select(&span) {
        let text = own_text(label);
        if !GOOGLE_LABELS.iter().any(|l| text.contains(l)) {
            continue;
        }
        let container = label.ancestors().filter_map(ElementRef::wrap).find(|el| {
            el.value().name() == "div" && el.value().attr("data-content-feature").is_some()
        });
        if let Some(container) = container {
            if !containers.iter().any(|c| c.id() == container.id()) {
                containers.push(container);
            }
        }
    }
    Ok(containers)
}

/// Text nodes directly under `element`, ignoring nested elements.
fn own_text(element: ElementRef<'_>) -> String {
    let text = element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&text)
}

pub fn bing_ads(html: &str) -> Result<Vec<AdBlock>> {
    let document = Html::parse_document(html);
    let ad = selector(BING_AD)?;

    document
        .select(&ad)
        .filter(|el| has_bing_label(&element_text(*el)))
        .map(|el| ad_block(el, Engine::Bing))
        .collect()
}

fn has_bing_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| BING_LABELS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_text_ads_are_preferred() {
        let html = r#"
<div data-text-ad="1"><a href="https://www.elektrum.ee/">Elektrum</a> Börsielekter
  parima hinnaga</div>
<div data-content-feature="1"><span>Sponsored</span><a href="https://ignored.ee">x</a></div>"#;
        let ads = google_ads(html).unwrap();
        assert_eq!(ads, vec![AdBlock {
            text: "Elektrum Börsielekter parima hinnaga".into(),
            url: "https://www.elektrum.ee/".into(),
        }]);
    }

    #[test]
    fn google_fallback_climbs_to_closest_container() {
        let html = r#"
<div data-content-feature="outer">
  <div data-content-feature="1">
    <div><span>Sponsitud</span></div>
    <a href="/aclk?sa=l&amp;ai=1">Eesti Energia elektripaketid</a>
  </div>
  <div data-content-feature="2">
    <span>Reklaam</span><span>Sponsored</span>
    <a href="https://www.alexela.ee">Alexela</a>
  </div>
</div>
<div data-content-feature="organic"><span>Tavaline tulemus</span></div>"#;
        let ads = google_ads(html).unwrap();
        assert_eq!(ads.len(), 2);
        assert_eq!(ads[0].url, "https://www.google.ee/aclk?sa=l&ai=1");
        assert!(ads[0].text.contains("Eesti Energia"));
        assert_eq!(ads[1].url, "https://www.alexela.ee");
    }

    #[test]
    fn google_label_must_be_the_span_own_text() {
        let html = r#"
<div data-content-feature="1"><span>Tavaline tulemus <b>Sponsored</b></span>
  <a href="https://organic.ee">Organic</a></div>
<div data-content-feature="2"><span><span>Reklaam</span> Enefit</span>
  <a href="https://www.enefit.ee">Enefit</a></div>"#;
        let ads = google_ads(html).unwrap();
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].url, "https://www.enefit.ee");
    }

    #[test]
    fn google_without_ads_is_empty() {
        assert!(google_ads("<div><span>Tulemus</span></div>").unwrap().is_empty());
    }

    #[test]
    fn bing_keeps_only_labelled_blocks() {
        let html = r#"<ol>
<li class="b_ad"><span>Ad</span> <a href="https://www.elektrum.ee">Elektrum</a></li>
<li class="b_ad"><a href="https://noad.ee">Lemonade stand</a></li>
<li class="b_ad">Reklaam · <a href="/aclick?u=1">Enefit</a></li>
<li class="b_algo"><span>Ad</span></li>
</ol>"#;
        let ads = bing_ads(html).unwrap();
        assert_eq!(ads.len(), 2);
        assert_eq!(ads[0].url, "https://www.elektrum.ee");
        assert_eq!(ads[1].url, "https://www.bing.com/aclick?u=1");
    }

    #[test]
    fn label_matching_is_whole_word() {
        assert!(has_bing_label("Sponsored · elektrum.ee"));
        assert!(has_bing_label("AD  Eesti Energia"));
        assert!(!has_bing_label("Download the leading adapter"));
    }

    #[test]
    fn search_url_encodes_keyword() {
        assert_eq!(
            Engine::Google.search_url("elektri börsihind"),
            "https://www.google.ee/search?q=elektri+b%C3%B6rsihind"
        );
        assert_eq!(Engine::Bing.to_string(), "bing");
    }
}

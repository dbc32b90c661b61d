//! Creative previews listed by the Google Ads Transparency Center.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use super::{first_attr, first_text, selector};
use crate::error::Result;
use crate::normalize::{NOT_AVAILABLE, absolutize, or_not_available};
use crate::record::CreativeRecord;

pub const BASE_URL: &str = "https://adstransparency.google.com";

pub const CREATIVE_PREVIEW: &str = "creative-preview";
const ADVERTISER_NAME: &str = ".advertiser-name";
const CREATIVE_IMAGE: &str = "img";
const CREATIVE_LINK: &str = "a";

pub const SEE_ALL_ADS: &str = r#"//div[text()="See all ads"]"#;

static ADVERTISER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"advertiser/(AR[0-9]+)").expect("valid regex"));
static CREATIVE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"creative/(CR[0-9]+)").expect("valid regex"));

pub fn listing_url(region: &str, domain: &str) -> String {
    format!("{}/?region={}&domain={}", BASE_URL, region, domain)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creative {
    pub advertiser_name: String,
    pub advertiser_id: String,
    pub creative_id: String,
    pub image_url: String,
    pub creative_url: String,
}

impl Creative {
    pub fn into_record(self, region: &str, domain: &str, scraped_at: &str) -> CreativeRecord {
        CreativeRecord {
            advertiser_name: self.advertiser_name,
            advertiser_id: self.advertiser_id,
            creative_id: self.creative_id,
            image_url: self.image_url,
            creative_url: self.creative_url,
            region: region.to_string(),
            domain: domain.to_string(),
            scraped_at: scraped_at.to_string(),
        }
    }
}

pub fn advertiser_id(link: &str) -> Option<String> {
    ADVERTISER_ID.captures(link).map(|c| c[1].to_string())
}

pub fn creative_id(link: &str) -> Option<String> {
    CREATIVE_ID.captures(link).map(|c| c[1].to_string())
}

pub fn extract_creatives(html: &str) -> Result<Vec<Creative>> {
    let document = Html::parse_document(html);
    let preview = selector(CREATIVE_PREVIEW)?;
    let name_sel = selector(ADVERTISER_NAME)?;
    let image_sel = selector(CREATIVE_IMAGE)?;
    let link_sel = selector(CREATIVE_LINK)?;

    let creatives = document
        .select(&preview)
        .map(|ad| {
            let creative_url = first_attr(ad, &link_sel, "href")
                .filter(|href| !href.is_empty())
                .map(|href| absolutize(BASE_URL, &href))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            Creative {
                advertiser_name: or_not_available(first_text(ad, &name_sel)),
                advertiser_id: or_not_available(advertiser_id(&creative_url)),
                creative_id: or_not_available(creative_id(&creative_url)),
                image_url: or_not_available(first_attr(ad, &image_sel, "src")),
                creative_url,
            }
        })
        .collect();

    Ok(creatives)
}

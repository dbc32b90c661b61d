//! Flat records produced by the scrapers. Every field is a string and field
//! order is the column order used by the sinks.

use serde::{Deserialize, Serialize};

use crate::normalize::NOT_AVAILABLE;

/// Ordered view of a record's named fields.
pub trait Record {
    fn fields(&self) -> Vec<(&'static str, &str)>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Product ID")]
    pub product_id: String,
    #[serde(rename = "Product Name")]
    pub name: String,
    #[serde(rename = "Image URL")]
    pub image_url: String,
    #[serde(rename = "Exit URL")]
    pub exit_url: String,
    #[serde(rename = "Price (€)")]
    pub price: String,
    #[serde(rename = "Offer Period")]
    pub offer_period: String,
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self {
            product_id: NOT_AVAILABLE.to_string(),
            name: NOT_AVAILABLE.to_string(),
            image_url: NOT_AVAILABLE.to_string(),
            exit_url: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            offer_period: NOT_AVAILABLE.to_string(),
        }
    }
}

impl Record for ProductRecord {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Product ID", self.product_id.as_str()),
            ("Product Name", self.name.as_str()),
            ("Image URL", self.image_url.as_str()),
            ("Exit URL", self.exit_url.as_str()),
            ("Price (€)", self.price.as_str()),
            ("Offer Period", self.offer_period.as_str()),
        ]
    }
}

/// A sponsored search result seen for one keyword on one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRecord {
    pub keyword: String,
    pub engine: String,
    pub text: String,
    pub url: String,
    pub scraped_at: String,
}

impl Record for AdRecord {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("keyword", self.keyword.as_str()),
            ("engine", self.engine.as_str()),
            ("text", self.text.as_str()),
            ("url", self.url.as_str()),
            ("scraped_at", self.scraped_at.as_str()),
        ]
    }
}

/// One creative listed in the Ads Transparency Center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeRecord {
    pub advertiser_name: String,
    pub advertiser_id: String,
    pub creative_id: String,
    pub image_url: String,
    pub creative_url: String,
    pub region: String,
    pub domain: String,
    pub scraped_at: String,
}

impl Record for CreativeRecord {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("advertiser_name", self.advertiser_name.as_str()),
            ("advertiser_id", self.advertiser_id.as_str()),
            ("creative_id", self.creative_id.as_str()),
            ("image_url", self.image_url.as_str()),
            ("creative_url", self.creative_url.as_str()),
            ("region", self.region.as_str()),
            ("domain", self.domain.as_str()),
            ("scraped_at", self.scraped_at.as_str()),
        ]
    }
}

/// Renders a record as `name=value` pairs for log lines.
pub fn describe<R: Record>(record: &R) -> String {
    record
        .fields()
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

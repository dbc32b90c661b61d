//! Product grid of the Prisma Market weekly offers page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::{debug, info};

use super::{element_text, first_attr, first_text, selector};
use crate::error::Result;
use crate::normalize::{
    EAN_WIDTH, NOT_AVAILABLE, absolutize, clean_price, is_placeholder_image, or_not_available,
    pad_identifier,
};
use crate::record::ProductRecord;

pub const BASE_URL: &str = "https://www.prismamarket.ee";
pub const WEEKLY_OFFERS_URL: &str = "https://www.prismamarket.ee/leht/nadala-hind";

pub const PRODUCT_CARD: &str = r#"article[data-test-id="product-card"]"#;
const PRODUCT_NAME: &str = r#"div[data-test-id="product-card__productName"] span[title]"#;
const PRODUCT_IMAGE: &str = r#"img[data-test-id="product-card__productImage"]"#;
const EXIT_LINK: &str = r#"div[data-test-id="product-card__productName"] a"#;
const DISPLAY_PRICE: &str = r#"span[data-test-id="display-price"]"#;

static OFFER_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Nädala eripakkumised\s*(.+)").expect("valid regex"));

/// How product cards on a page are turned into records.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub base_url: String,
    /// Zero-pad product IDs to EAN-13 width.
    pub pad_ids: bool,
    /// Build `/toode/<id>` when a card has no link href.
    pub fallback_exit_url: bool,
    pub offer_period: Option<String>,
}

impl ProductPage {
    /// Settings used for the CSV export.
    pub fn weekly_offers(offer_period: Option<String>) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            pad_ids: false,
            fallback_exit_url: false,
            offer_period,
        }
    }

    /// Settings used for the merchant feed.
    pub fn feed() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            pad_ids: true,
            fallback_exit_url: true,
            offer_period: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProductScan {
    pub cards: usize,
    pub skipped: usize,
    pub products: Vec<ProductRecord>,
}

pub fn extract_offer_period(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let heading = selector("h2")?;

    for h2 in document.select(&heading) {
        let text = element_text(h2);
        if let Some(caps) = OFFER_PERIOD.captures(&text) {
            let period = caps[1].trim().to_string();
            if !period.is_empty() {
                return Ok(Some(period));
            }
        }
    }
    Ok(None)
}

pub fn extract_products(html: &str, page: &ProductPage) -> Result<ProductScan> {
    let document = Html::parse_document(html);
    let card_sel = selector(PRODUCT_CARD)?;
    let name_sel = selector(PRODUCT_NAME)?;
    let image_sel = selector(PRODUCT_IMAGE)?;
    let link_sel = selector(EXIT_LINK)?;
    let price_sel = selector(DISPLAY_PRICE)?;

    let mut scan = ProductScan::default();

    for card in document.select(&card_sel) {
        scan.cards += 1;

        let raw_id = card.value().attr("data-product-id").map(str::to_string);
        let product_id = match raw_id {
            Some(id) if page.pad_ids && !id.trim().is_empty() => pad_identifier(&id, EAN_WIDTH),
            other => or_not_available(other),
        };

        let name = or_not_available(first_attr(card, &name_sel, "title"));

        let image_url = match first_attr(card, &image_sel, "src") {
            Some(src) if is_placeholder_image(&src) => {
                info!(
                    "Skipping product '{}' (ID: {}) due to missing image placeholder",
                    name, product_id
                );
                scan.skipped += 1;
                continue;
            }
            other => or_not_available(other),
        };

        // The `/toode/<id>` fallback only applies to a link without a usable href.
        let exit_url = match card.select(&link_sel).next() {
            Some(link) => match link.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) {
                Some(href) => absolutize(&page.base_url, href),
                None if page.fallback_exit_url => {
                    format!("{}/toode/{}", page.base_url.trim_end_matches('/'), product_id)
                }
                None => NOT_AVAILABLE.to_string(),
            },
            None => NOT_AVAILABLE.to_string(),
        };

        let price = first_text(card, &price_sel)
            .map(|text| clean_price(&text))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        scan.products.push(ProductRecord {
            product_id,
            name,
            image_url,
            exit_url,
            price,
            offer_period: or_not_available(page.offer_period.clone()),
        });
    }

    debug!(
        "Processed {} product cards: {} kept, {} skipped",
        scan.cards,
        scan.products.len(),
        scan.skipped
    );
    Ok(scan)
}

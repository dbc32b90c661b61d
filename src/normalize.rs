//! String cleanup applied to scraped values before they reach a sink.

use url::Url;

/// Default value for any field the page did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Image `src` the product grid renders when a product has no photo.
pub const MISSING_IMAGE_SENTINEL: &str = "/icons/missing-product-image.svg";

/// Width of an EAN-13 product identifier.
pub const EAN_WIDTH: usize = 13;

/// Turns a displayed price like `"1,99 €"` into `"1.99"`.
///
/// The last `,` or `.` is the decimal point. Earlier separators group
/// thousands and are dropped along with currency marks and other text.
pub fn clean_price(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let Some(pos) = kept.rfind([',', '.']) else {
        return kept;
    };
    let whole = digits_only(&kept[..pos]);
    let fraction = digits_only(&kept[pos + 1..]);
    if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Left-pads a numeric identifier with zeros up to `width`.
///
/// Non-numeric input is returned trimmed but otherwise untouched, and values
/// already at or above `width` are never truncated.
pub fn pad_identifier(raw: &str, width: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.to_string();
    }
    format!("{:0>width$}", trimmed, width = width)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_placeholder_image(src: &str) -> bool {
    src == MISSING_IMAGE_SENTINEL
}

/// Resolves an `href` found on a page into an absolute URL.
pub fn absolutize(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        match Url::parse(base_url).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", base_url.trim_end_matches('/'), href),
        }
    } else {
        href.to_string()
    }
}

/// Returns `value` unless it is empty, in which case the `"N/A"` default.
pub fn or_not_available(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE.to_string(),
    }
}

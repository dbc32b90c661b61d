//! RSS 2.0 product feed in the Google Merchant Center dialect (`g:` elements).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::info;

use crate::error::Result;
use crate::record::ProductRecord;

pub const GMC_NAMESPACE: &str = "http://base.google.com/ns/1.0";
pub const CURRENCY: &str = "EUR";

#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl FeedChannel {
    pub fn prisma() -> Self {
        Self {
            title: "Prisma Market Products".to_string(),
            link: "https://www.prismamarket.ee".to_string(),
            description: "Product feed for Prisma Market Estonia".to_string(),
        }
    }
}

pub fn write_feed_file(path: &Path, channel: &FeedChannel, products: &[ProductRecord]) -> Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    let items = write_feed(&mut out, channel, products)?;
    out.flush()?;
    info!("Generated XML feed with {} products at {}", items, path.display());
    Ok(items)
}

/// Serializes the channel and one `<item>` per product, returning the item count.
pub fn write_feed<W: Write>(out: W, channel: &FeedChannel, products: &[ProductRecord]) -> Result<usize> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:g", GMC_NAMESPACE));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    text_element(&mut writer, "title", &channel.title)?;
    text_element(&mut writer, "link", &channel.link)?;
    text_element(&mut writer, "description", &channel.description)?;

    for product in products {
        writer.write_event(Event::Start(BytesStart::new("item")))?;

        cdata_element(&mut writer, "g:id", &product.product_id)?;
        cdata_element(&mut writer, "g:title", &product.name)?;
        cdata_element(&mut writer, "g:description", &product.name)?;
        cdata_element(&mut writer, "g:link", &product.exit_url)?;
        cdata_element(&mut writer, "g:image_link", &product.image_url)?;
        cdata_element(&mut writer, "g:brand", &product.name)?;

        text_element(&mut writer, "g:availability", "in stock")?;
        text_element(&mut writer, "g:condition", "new")?;
        text_element(&mut writer, "g:price", &feed_price(&product.price))?;
        text_element(&mut writer, "g:currency", CURRENCY)?;

        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(products.len())
}

/// `"1.99"` becomes `"1.99 EUR"`; an empty price stays empty.
pub fn feed_price(price: &str) -> String {
    if price.is_empty() {
        String::new()
    } else {
        format!("{} {}", price, CURRENCY)
    }
}

fn text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Writes `text` verbatim inside CDATA. A literal `]]>` cannot appear inside a
/// single section, so it is split across two.
fn cdata_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    for section in cdata_sections(text) {
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductRecord {
        ProductRecord {
            product_id: "0000000000123".into(),
            name: "Tom & Jerry <Šokolaad>".into(),
            image_url: "https://cdn.s-cloud.fi/a.jpg?w=1&h=2".into(),
            exit_url: "https://www.prismamarket.ee/toode/0000000000123".into(),
            price: "1.99".into(),
            offer_period: "N/A".into(),
        }
    }

    fn render(products: &[ProductRecord]) -> String {
        let mut out = Vec::new();
        write_feed(&mut out, &FeedChannel::prisma(), products).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cdata_keeps_special_characters_verbatim() {
        let xml = render(&[product()]);
        assert!(xml.contains("<g:title><![CDATA[Tom & Jerry <Šokolaad>]]></g:title>"));
        assert!(xml.contains("<g:image_link><![CDATA[https://cdn.s-cloud.fi/a.jpg?w=1&h=2]]></g:image_link>"));
        assert!(!xml.contains("&amp;"));
        assert!(!xml.contains("&lt;"));
    }

    #[test]
    fn document_shape() {
        let xml = render(&[product()]);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<rss version=\"2.0\" xmlns:g=\"http://base.google.com/ns/1.0\">"));
        assert!(xml.contains("\n  <channel>\n    <title>Prisma Market Products</title>"));
        assert!(xml.contains("<g:availability>in stock</g:availability>"));
        assert!(xml.contains("<g:condition>new</g:condition>"));
        assert!(xml.contains("<g:price>1.99 EUR</g:price>"));
        assert!(xml.contains("<g:currency>EUR</g:currency>"));
        assert_eq!(xml.matches("<item>").count(), 1);
        assert!(xml.ends_with("</rss>\n"));
    }

    #[test]
    fn empty_price_stays_empty() {
        let mut p = product();
        p.price = String::new();
        let xml = render(&[p]);
        assert!(xml.contains("<g:price></g:price>"));
        assert_eq!(feed_price("N/A"), "N/A EUR");
    }

    #[test]
    fn cdata_terminator_is_split() {
        assert_eq!(cdata_sections("a]]>b"), vec!["a]]", ">b"]);
        assert_eq!(cdata_sections("plain"), vec!["plain"]);

        let mut p = product();
        p.name = "x]]>y".into();
        let xml = render(&[p]);
        assert!(xml.contains("<g:title><![CDATA[x]]]]><![CDATA[>y]]></g:title>"));
    }

    #[test]
    fn output_parses_back() {
        let xml = render(&[product(), product()]);
        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut items = 0;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == b"item" => items += 1,
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(items, 2);
    }
}

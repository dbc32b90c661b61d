//! `<loc>` counting for XML sitemaps.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::{Result, ScrapeError};

pub const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// Counts `<loc>` elements bound to the sitemaps.org namespace.
///
/// Works for both `<urlset>` and `<sitemapindex>` documents. Documents with no
/// root element or with elements left open at the end are rejected.
pub fn count_locs(xml: &[u8]) -> Result<usize> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut count = 0;
    let mut saw_root = false;
    let mut depth = 0usize;

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(e)) => {
                saw_root = true;
                depth += 1;
                if is_sitemap_loc(&ns, e.local_name().as_ref()) {
                    count += 1;
                }
            }
            (ns, Event::Empty(e)) => {
                saw_root = true;
                if is_sitemap_loc(&ns, e.local_name().as_ref()) {
                    count += 1;
                }
            }
            (_, Event::End(_)) => depth = depth.saturating_sub(1),
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ScrapeError::Xml("document has no root element".to_string()));
    }
    if depth > 0 {
        return Err(ScrapeError::Xml(format!("{} element(s) left unclosed", depth)));
    }
    Ok(count)
}

fn is_sitemap_loc(ns: &ResolveResult<'_>, local_name: &[u8]) -> bool {
    local_name == b"loc" && matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NS)
}

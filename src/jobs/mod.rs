//! One module per job. Each runs Fetcher, Extractor, Normalizer and Sink in
//! sequence and owns its browser session for the length of the run.

pub mod fetch_html;
pub mod index_audit;
pub mod products;
pub mod search_ads;
pub mod transparency;

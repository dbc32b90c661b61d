//! Scrapers for retail product grids and ad placements, with CSV, RSS
//! merchant feed and JSON output.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod jobs;
pub mod normalize;
pub mod record;
pub mod sink;

pub use error::{Result, ScrapeError};
pub use record::{AdRecord, CreativeRecord, ProductRecord, Record};

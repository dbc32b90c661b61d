//! Serialization of accumulated records.

pub mod csv;
pub mod feed;
pub mod json;

pub use feed::FeedChannel;

//! Concurrent, fault-tolerant RSS fetching.
//!
//! Give [`FeedReader::parse`] a list of feed locations and get back every
//! valid item from every feed that could be fetched and decoded. A source
//! that is unreachable or malformed only means fewer items; the call
//! itself never fails.

pub mod config;
pub mod feed;
pub mod util;

pub use config::{Config, ConfigError, DatePolicy};
pub use feed::{parse, FallbackTime, FeedReader, RssItem, SourceError, SourceReport};

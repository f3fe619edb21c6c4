//! The fetch → decode → normalize → merge pipeline for RSS feeds.
//!
//! - [`fetcher`] - One HTTP GET per location with a body size limit
//! - [`parser`] - Event-driven decoding of RSS 2.0 `channel`/`item` markup
//! - [`normalizer`] - Required-field filtering, date fallback, source attribution
//! - [`aggregator`] - Bounded concurrent fan-out and the single merge step
//!
//! # Example
//!
//! ```no_run
//! use feedgather::feed::FeedReader;
//! use feedgather::{Config, FallbackTime};
//!
//! # async fn run() {
//! let reader = FeedReader::new(Config::default()).with_fallback_time(FallbackTime::now());
//! let items = reader.parse(&["https://example.com/rss.xml"]).await;
//! # }
//! ```

mod aggregator;
mod fetcher;
mod item;
mod normalizer;
mod parser;

pub use aggregator::{parse, FeedReader, SourceError, SourceReport};
pub use fetcher::{fetch_feed, FetchError};
pub use item::{FallbackTime, RssItem};
pub use parser::DecodeError;

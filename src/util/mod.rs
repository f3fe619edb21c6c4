//! Utility functions shared by the fetch pipeline.
//!
//! - **URL handling**: SSRF validation and hostname extraction for source attribution
//! - **Dates**: Permissive parsing of free-form `pubDate` values
//!
//! # Examples
//!
//! ```
//! use feedgather::util::{parse_date, source_host, validate_url};
//!
//! let url = validate_url("https://example.com/feed.xml").unwrap();
//! assert_eq!(source_host(url.as_str()).as_deref(), Some("example.com"));
//!
//! assert!(parse_date("Mon, 01 Jan 2024 00:00:00 +0000").is_some());
//! ```

mod date;
mod url_validator;

pub use date::parse_date;
pub use url_validator::{source_host, validate_url, UrlValidationError};

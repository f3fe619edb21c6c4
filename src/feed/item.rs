use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A normalized feed entry.
///
/// Only produced by the pipeline: title, link and description are always
/// non-empty and a publish date is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RssItem {
    pub(crate) title: String,
    pub(crate) source: String,
    pub(crate) source_url: String,
    pub(crate) link: String,
    pub(crate) publish_date: DateTime<Utc>,
    pub(crate) description: String,
}

impl RssItem {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Attribution name: the item's `<source>` text, or the feed's hostname.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Attribution link: the `<source url>` attribute, or the feed location.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn publish_date(&self) -> DateTime<Utc> {
        self.publish_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Supplies a publish date for items whose feed did not give one.
///
/// Shared read-only by every concurrent fetch, so the closure must be
/// `Send + Sync`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use feedgather::FallbackTime;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(FallbackTime::fixed(at).get(), at);
/// ```
#[derive(Clone)]
pub struct FallbackTime(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl FallbackTime {
    pub fn new(provider: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self(Arc::new(provider))
    }

    /// Always returns `at`.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::new(move || at)
    }

    /// The wall clock at the moment the item is normalized.
    pub fn now() -> Self {
        Self::new(Utc::now)
    }

    pub fn get(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl fmt::Debug for FallbackTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FallbackTime").field(&"<fn>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_fallback_is_stable() {
        let at = Utc.with_ymd_and_hms(2006, 4, 27, 0, 0, 0).unwrap();
        let fallback = FallbackTime::fixed(at);
        let shared = fallback.clone();
        assert_eq!(fallback.get(), at);
        assert_eq!(shared.get(), at);
    }

    #[test]
    fn test_now_fallback_tracks_clock() {
        let before = Utc::now();
        let got = FallbackTime::now().get();
        assert!(got >= before);
    }

    #[test]
    fn test_item_serializes_with_rfc3339_date() {
        let item = RssItem {
            title: "T".into(),
            source: "example.com".into(),
            source_url: "https://example.com/rss".into(),
            link: "https://example.com/1".into(),
            publish_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            description: "D".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["source"], "example.com");
        assert_eq!(json["publish_date"], "2024-01-01T00:00:00Z");
    }
}

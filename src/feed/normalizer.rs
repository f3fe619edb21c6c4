use crate::feed::item::{FallbackTime, RssItem};
use crate::feed::parser::{RawChannel, RawItem};
use crate::util::source_host;

/// Turns decoded items into [`RssItem`]s, dropping the ones that can't be completed.
///
/// An item is dropped when its title, link or description is empty, when it
/// has no publish date and no `fallback` is given, or when it has no
/// `<source>` and no hostname can be read from `origin`. Attribution from
/// `<source>` is used verbatim; otherwise it is the host of `origin` and
/// `origin` itself. Output keeps the document order.
pub(crate) fn normalize(
    channel: RawChannel,
    origin: &str,
    fallback: Option<&FallbackTime>,
) -> Vec<RssItem> {
    let origin_host = source_host(origin);

    channel
        .items
        .into_iter()
        .filter_map(|item| normalize_item(item, origin, origin_host.as_deref(), fallback))
        .collect()
}

fn normalize_item(
    item: RawItem,
    origin: &str,
    origin_host: Option<&str>,
    fallback: Option<&FallbackTime>,
) -> Option<RssItem> {
    if item.title.is_empty() || item.link.is_empty() || item.description.is_empty() {
        tracing::trace!(origin = %origin, title = %item.title, "Dropping item missing required fields");
        return None;
    }

    let publish_date = match (item.pub_date, fallback) {
        (Some(date), _) => date,
        (None, Some(fallback)) => fallback.get(),
        (None, None) => {
            tracing::trace!(origin = %origin, title = %item.title, "Dropping undated item");
            return None;
        }
    };

    let (source, source_url) = match item.source {
        Some(attribution) => (attribution.name, attribution.url),
        None => match origin_host {
            Some(host) => (host.to_string(), origin.to_string()),
            None => {
                tracing::trace!(origin = %origin, title = %item.title, "Dropping item without attribution");
                return None;
            }
        },
    };

    Some(RssItem {
        title: item.title,
        source,
        source_url,
        link: item.link,
        publish_date,
        description: item.description,
    })
}

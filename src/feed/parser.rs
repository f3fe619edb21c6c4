use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::config::DatePolicy;
use crate::util::parse_date;

/// Errors that fail the decode of an entire feed document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Markup is not well-formed XML (bad syntax, mismatched tags, bad escapes).
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The payload contains no elements at all.
    #[error("Empty document")]
    Empty,
    /// The root element is something other than `<rss>`.
    #[error("Not an RSS document: root element is <{0}>")]
    NotRss(String),
    /// `<rss>` has no `<channel>` child.
    #[error("Missing <channel> element")]
    MissingChannel,
    /// The document ended with elements still open.
    #[error("Unexpected end of document inside <{0}>")]
    UnexpectedEof(String),
    /// A `<pubDate>` was present but empty or unparseable.
    #[error("Unparseable publish date: {0:?}")]
    InvalidDate(String),
}

/// The `<channel>` of a decoded feed. Only lives between decode and normalize.
#[derive(Debug, Default)]
pub(crate) struct RawChannel {
    pub items: Vec<RawItem>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub source: Option<RawSource>,
}

/// Explicit `<source url="...">name</source>` attribution.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct RawSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
    Source,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            b"pubDate" => Some(Self::PubDate),
            b"source" => Some(Self::Source),
            _ => None,
        }
    }
}

/// Item fields as read off the wire, before the date is interpreted.
#[derive(Debug, Default)]
struct PendingItem {
    title: String,
    link: String,
    description: String,
    pub_date: Option<String>,
    source: Option<RawSource>,
}

/// Decodes an RSS 2.0 payload into its channel items.
///
/// The whole document fails on malformed markup, a non-`rss` root, a
/// missing `<channel>`, or truncation. Only the first `<channel>` is read
/// and unknown elements are skipped. A channel without items is valid.
///
/// Absent `<pubDate>` elements leave the item's date unset. A present but
/// empty or unparseable one is handled according to `date_policy`.
pub(crate) fn parse_feed(
    bytes: &[u8],
    date_policy: DatePolicy,
) -> Result<RawChannel, DecodeError> {
    // SEC-002: quick-xml (0.37) never expands <!ENTITY> declarations; only the
    // five XML builtins are resolved and anything else is an unescape error.
    // No trim_text: a field is trimmed once at close, so text around a
    // CDATA section keeps its inner spacing.
    let mut reader = Reader::from_reader(bytes);

    let mut state = DecodeState::new(date_policy);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => state.open(&e, &reader)?,
            Event::Empty(e) => {
                state.open(&e, &reader)?;
                state.close()?;
            }
            Event::End(_) => state.close()?,
            Event::Text(e) => {
                if state.capturing() {
                    let text = e.unescape()?;
                    state.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if state.capturing() {
                    state.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    state.finish()
}

struct DecodeState {
    date_policy: DatePolicy,
    /// Names of the currently open elements, root first.
    path: Vec<Vec<u8>>,
    seen_root: bool,
    /// Set while inside a top-level element that follows the `<rss>` root.
    trailing: bool,
    seen_channel: bool,
    channel_closed: bool,
    item: Option<PendingItem>,
    field: Option<Field>,
    text: String,
    items: Vec<RawItem>,
}

impl DecodeState {
    fn new(date_policy: DatePolicy) -> Self {
        Self {
            date_policy,
            path: Vec::new(),
            seen_root: false,
            trailing: false,
            seen_channel: false,
            channel_closed: false,
            item: None,
            field: None,
            text: String::new(),
            items: Vec::new(),
        }
    }

    fn capturing(&self) -> bool {
        self.field.is_some()
    }

    /// True while inside the first `<channel>` of the document.
    fn in_first_channel(&self) -> bool {
        self.path.len() >= 2 && self.path[1] == b"channel" && !self.channel_closed
    }

    fn open(&mut self, e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<(), DecodeError> {
        let name = e.name().as_ref().to_vec();

        if self.path.is_empty() {
            if self.seen_root {
                self.trailing = true;
            } else if name != b"rss" {
                return Err(DecodeError::NotRss(String::from_utf8_lossy(&name).into_owned()));
            }
            self.seen_root = true;
        }

        self.path.push(name);
        if self.trailing {
            return Ok(());
        }

        match self.path.len() {
            2 if self.path[1] == b"channel" && !self.channel_closed => {
                self.seen_channel = true;
            }
            3 if self.in_first_channel() && self.path[2] == b"item" => {
                self.item = Some(PendingItem::default());
            }
            4 if self.item.is_some() => {
                self.field = Field::from_name(&self.path[3]);
                self.text.clear();
                if self.field == Some(Field::Source) {
                    let url = source_url(e, reader)?;
                    if let Some(item) = self.item.as_mut() {
                        item.source = Some(RawSource {
                            name: String::new(),
                            url,
                        });
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self) -> Result<(), DecodeError> {
        if self.trailing {
            self.path.pop();
            self.trailing = !self.path.is_empty();
            return Ok(());
        }

        match self.path.len() {
            4 => {
                if let (Some(field), Some(item)) = (self.field.take(), self.item.as_mut()) {
                    let raw = std::mem::take(&mut self.text);
                    match field {
                        Field::Title => item.title = raw.trim().to_string(),
                        Field::Link => item.link = raw.trim().to_string(),
                        Field::Description => item.description = raw.trim().to_string(),
                        Field::PubDate => item.pub_date = Some(raw.trim().to_string()),
                        // Attribution is kept exactly as written
                        Field::Source => {
                            if let Some(source) = item.source.as_mut() {
                                source.name = raw;
                            }
                        }
                    }
                }
            }
            3 => {
                if let Some(pending) = self.item.take() {
                    if let Some(item) = self.resolve_date(pending)? {
                        self.items.push(item);
                    }
                }
            }
            2 if self.path[1] == b"channel" && self.seen_channel => {
                self.channel_closed = true;
            }
            _ => {}
        }

        self.path.pop();
        Ok(())
    }

    /// Interprets the raw `<pubDate>` text. `Ok(None)` drops the item.
    fn resolve_date(&self, pending: PendingItem) -> Result<Option<RawItem>, DecodeError> {
        let pub_date = match pending.pub_date {
            None => None,
            Some(text) => match parse_date(&text) {
                Some(date) => Some(date),
                None => match self.date_policy {
                    DatePolicy::RejectDocument => return Err(DecodeError::InvalidDate(text)),
                    DatePolicy::DropItem => {
                        tracing::trace!(
                            title = %pending.title,
                            pub_date = %text,
                            "Dropping item with unparseable publish date"
                        );
                        return Ok(None);
                    }
                },
            },
        };

        Ok(Some(RawItem {
            title: pending.title,
            link: pending.link,
            description: pending.description,
            pub_date,
            source: pending.source,
        }))
    }

    fn finish(self) -> Result<RawChannel, DecodeError> {
        if let Some(open) = self.path.last() {
            return Err(DecodeError::UnexpectedEof(
                String::from_utf8_lossy(open).into_owned(),
            ));
        }
        if !self.seen_root {
            return Err(DecodeError::Empty);
        }
        if !self.seen_channel {
            return Err(DecodeError::MissingChannel);
        }
        Ok(RawChannel { items: self.items })
    }
}

fn source_url(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<String, DecodeError> {
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed <source> attribute");
                continue;
            }
        };
        if attr.key.as_ref() == b"url" {
            let value = attr.decode_and_unescape_value(reader.decoder())?;
            return Ok(value.into_owned());
        }
    }
    Ok(String::new())
}

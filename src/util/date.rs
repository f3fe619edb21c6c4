//! Permissive publish-date parsing.
//!
//! Feeds in the wild rarely follow RFC 822 to the letter. This parser tries
//! the strict formats first, then a list of common variants seen in RSS
//! `pubDate` values, and finally bare Unix timestamps. Anything without an
//! explicit offset is taken as UTC.
//!
//! When nothing matches, the value is rewritten once and retried: the
//! leading weekday is dropped (generators often get it wrong), full month
//! names are abbreviated and common zone abbreviations become offsets.
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Formats carrying an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S %z",
    // RFC 850
    "%d-%b-%y %H:%M:%S %z",
    // date(1)
    "%b %d %H:%M:%S %z %Y",
];

/// Date-times without an offset, read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d-%b-%y %H:%M:%S",
    // ANSI C asctime
    "%b %d %H:%M:%S %Y",
];

/// Date-only values, resolved to midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%a, %d %b %Y",
    "%a %d %b %Y",
    "%d %b %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%m/%d/%Y",
];

/// Zone names that mean UTC when they trail an otherwise naive value.
const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", " UT", " Z", "Z"];

const WEEKDAYS: &[(&str, &str)] = &[
    ("mon", "monday"),
    ("tue", "tuesday"),
    ("wed", "wednesday"),
    ("thu", "thursday"),
    ("fri", "friday"),
    ("sat", "saturday"),
    ("sun", "sunday"),
];

const MONTHS: &[(&str, &str)] = &[
    ("Jan", "january"),
    ("Feb", "february"),
    ("Mar", "march"),
    ("Apr", "april"),
    ("May", "may"),
    ("Jun", "june"),
    ("Jul", "july"),
    ("Aug", "august"),
    ("Sep", "september"),
    ("Oct", "october"),
    ("Nov", "november"),
    ("Dec", "december"),
];

/// Zone abbreviations seen in feeds. Ambiguous ones (`IST`, `CST` outside
/// North America) take their most common reading.
const ZONES: &[(&str, &str)] = &[
    ("UT", "+0000"),
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("Z", "+0000"),
    ("WET", "+0000"),
    ("WEST", "+0100"),
    ("BST", "+0100"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("MET", "+0100"),
    ("MEST", "+0200"),
    ("EET", "+0200"),
    ("EEST", "+0300"),
    ("MSK", "+0300"),
    ("IST", "+0530"),
    ("SGT", "+0800"),
    ("HKT", "+0800"),
    ("JST", "+0900"),
    ("KST", "+0900"),
    ("AWST", "+0800"),
    ("ACST", "+0930"),
    ("AEST", "+1000"),
    ("AEDT", "+1100"),
    ("NZST", "+1200"),
    ("NZDT", "+1300"),
    ("EST", "-0500"),
    ("EDT", "-0400"),
    ("CST", "-0600"),
    ("CDT", "-0500"),
    ("MST", "-0700"),
    ("MDT", "-0600"),
    ("PST", "-0800"),
    ("PDT", "-0700"),
    ("AKST", "-0900"),
    ("AKDT", "-0800"),
    ("HST", "-1000"),
];

/// Parses a free-form publish date.
///
/// Returns `None` for empty input or when no known format matches.
///
/// # Examples
///
/// ```
/// use feedgather::util::parse_date;
///
/// let date = parse_date("Thu, 27 Apr 2006").unwrap();
/// assert_eq!(date.to_rfc3339(), "2006-04-27T00:00:00+00:00");
///
/// assert!(parse_date("").is_none());
/// assert!(parse_date("last tuesday-ish").is_none());
/// ```
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    parse_known(text).or_else(|| {
        let rewritten = rewrite(text);
        if rewritten == text {
            return None;
        }
        parse_known(&rewritten)
    })
}

fn parse_known(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    if let Some(dt) = parse_naive(text) {
        return Some(dt);
    }

    for suffix in UTC_SUFFIXES {
        if let Some(stripped) = text.strip_suffix(suffix) {
            if let Some(dt) = parse_naive(stripped.trim_end()) {
                return Some(dt);
            }
        }
    }

    parse_timestamp(text)
}

/// Drops a leading weekday, abbreviates month names, replaces zone
/// abbreviations with offsets and collapses runs of whitespace.
fn rewrite(text: &str) -> String {
    let mut tokens = text.split_whitespace().peekable();

    if let Some(first) = tokens.peek() {
        let day = first.trim_end_matches(',').to_ascii_lowercase();
        if WEEKDAYS.iter().any(|(short, long)| day == *short || day == *long) {
            tokens.next();
        }
    }

    tokens
        .map(|token| match ZONES.iter().find(|(name, _)| *name == token) {
            Some((_, offset)) => (*offset).to_string(),
            None => abbreviate_months(token),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `April,` → `Apr,` and `27-April-06` → `27-Apr-06`.
fn abbreviate_months(token: &str) -> String {
    let core = token.trim_end_matches([',', '.']);
    let punctuation = &token[core.len()..];

    let parts: Vec<&str> = core
        .split('-')
        .map(|part| {
            let lower = part.to_ascii_lowercase();
            MONTHS
                .iter()
                .find(|(_, long)| lower.len() > 3 && lower == *long)
                .map_or(part, |(short, _)| *short)
        })
        .collect();

    format!("{}{}", parts.join("-"), punctuation)
}

fn parse_naive(text: &str) -> Option<DateTime<Utc>> {
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Bare Unix timestamps: up to 10 digits are seconds, 13 digits are milliseconds.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = text.parse().ok()?;
    match text.len() {
        1..=10 => DateTime::from_timestamp(value, 0),
        13 => DateTime::from_timestamp_millis(value),
        _ => None,
    }
}

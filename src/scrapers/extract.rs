//! Field extractors for one listing detail page.
//!
//! Each extractor is a pure function over the parsed document, independent of
//! the others. A failure in one field never aborts the rest: fallible
//! extractors log the raw selection together with the listing URL and return
//! `None`. The single exception is [`description`], whose failure aborts the
//! whole record (see the record builder).

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::error;

use super::dates::parse_arabic_date;
use super::error::{Result, ScrapeError};

/// Specs-table row labels as they appear on the site.
pub const LABEL_ENGINE_CC: &str = "المحرك (سي سي)";
pub const LABEL_YEAR: &str = "السنة";
pub const LABEL_MODEL: &str = "موديل";
pub const LABEL_CONDITION: &str = "الحالة";
pub const LABEL_PAY_TYPE: &str = "طريقة الدفع";
pub const LABEL_KILOMETERS: &str = "كيلومترات";
pub const LABEL_TRANSMISSION: &str = "ناقل الحركة";
pub const LABEL_FEATURES: &str = "إضافات";
pub const LABEL_COLOR: &str = "اللون";
pub const LABEL_CHASSIS: &str = "نوع الهيكل";
pub const LABEL_AD_TYPE: &str = "نوع الإعلان";

/// Count of single-value spec fields that precede the features block in the
/// values sequence. The features run in a listing's values list starts right
/// after these.
pub const FEATURE_PREFIX_FIELDS: usize = 7;

fn strip_layout_whitespace(text: &str) -> String {
    text.replace('\t', "").replace('\n', "")
}

/// Posted date from the caption element, e.g.
/// `"تم إضافة الإعلان في 10:30, 15 يناير 2020"`. The segment after the comma
/// is the localized date. Any failure yields `None`.
pub fn posted_date(doc: &Html) -> Option<NaiveDate> {
    let selector = Selector::parse("p small span").unwrap();
    let caption = doc.select(&selector).next()?;
    let text = strip_layout_whitespace(&caption.text().collect::<String>());
    let date_part = text.split(',').nth(1)?;
    parse_arabic_date(date_part)
}

/// Price from the price label. Primary pattern is thousands-separated digit
/// groups with the separators stripped; fallback is the first bare digit run.
/// A label with no digits logs the raw text plus the listing URL.
pub fn price(doc: &Html, url: &str) -> Option<i64> {
    let selector = Selector::parse("div .pricelabel strong").unwrap();
    let label = doc
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>());

    let parsed = label.as_deref().and_then(parse_price);
    if parsed.is_none() {
        error!("price extraction failed for {}: {:?}", url, label);
    }
    parsed
}

fn parse_price(label: &str) -> Option<i64> {
    let grouped = Regex::new(r"\d+(?:,\d+)+").unwrap();
    let bare = Regex::new(r"\d+").unwrap();

    let matched = grouped.find(label).or_else(|| bare.find(label))?;
    matched.as_str().replace(',', "").parse().ok()
}

/// `(city, governorate)` from the map-link label. The label is split on the
/// Arabic comma first; when that yields anything but two parts, the ASCII
/// comma is tried. Any other shape logs the raw selection and yields
/// `(None, None)`.
pub fn location(doc: &Html, url: &str) -> (Option<String>, Option<String>) {
    let selector = Selector::parse(".show-map-link strong").unwrap();
    let raw = match doc.select(&selector).next() {
        Some(el) => el.text().collect::<String>().trim().to_string(),
        None => {
            error!("location element missing for {}", url);
            return (None, None);
        }
    };

    let mut parts: Vec<&str> = raw.split('،').collect();
    if parts.len() != 2 {
        parts = raw.split(',').collect();
    }
    if parts.len() != 2 {
        error!("unrecognized location shape for {}: {:?}", url, raw);
        return (None, None);
    }

    (
        Some(parts[0].trim().to_string()),
        Some(parts[1].trim().to_string()),
    )
}

/// Brand from the last of the short label spans in the details row. The
/// already-known city name shows up inside the same span and is stripped as a
/// substring.
pub fn brand(doc: &Html, city: Option<&str>, url: &str) -> Option<String> {
    let selector = Selector::parse("td.middle span").unwrap();
    let Some(el) = doc.select(&selector).last() else {
        error!("brand label missing for {}", url);
        return None;
    };

    let mut text = el.text().collect::<String>();
    if let Some(city) = city {
        text = text.replace(city, "");
    }
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Every image URL inside the photo containers. Never fails; a listing
/// without photos yields an empty list.
pub fn images(doc: &Html) -> Vec<String> {
    let container = Selector::parse("div.photo-glow").unwrap();
    let img = Selector::parse("img").unwrap();

    doc.select(&container)
        .filter_map(|div| div.select(&img).next())
        .filter_map(|el| el.value().attr("src"))
        .map(str::to_string)
        .collect()
}

/// Trimmed text of the first paragraph in the text-content container. A
/// listing without one has usually been removed; this is the only extraction
/// failure that propagates.
pub fn description(doc: &Html, url: &str) -> Result<String> {
    let selector = Selector::parse("#textContent p").unwrap();
    let el = doc
        .select(&selector)
        .next()
        .ok_or_else(|| ScrapeError::MissingDescription {
            url: url.to_string(),
        })?;
    Ok(el.text().collect::<String>().trim().to_string())
}

/// Parallel label/value sequences scraped from a listing's details section.
///
/// Labels come from the table headers, values from the linked strong cells.
/// Lookups pair a label with the value at the same index, which only holds as
/// long as the features run (many values under one label) has been spliced
/// out; see [`SpecsTable::take_features`].
#[derive(Debug, Default)]
pub struct SpecsTable {
    labels: Vec<String>,
    values: Vec<String>,
}

impl SpecsTable {
    pub fn from_document(doc: &Html) -> Self {
        let label_selector = Selector::parse(".details th").unwrap();
        let value_selector = Selector::parse(".details strong a").unwrap();

        let labels = doc
            .select(&label_selector)
            .map(|el| el.text().collect::<String>())
            .collect();
        let values = doc
            .select(&value_selector)
            .map(|el| strip_layout_whitespace(&el.text().collect::<String>()))
            .collect();

        Self { labels, values }
    }

    #[cfg(test)]
    fn new(labels: Vec<String>, values: Vec<String>) -> Self {
        Self { labels, values }
    }

    /// Value paired with `label`, whitespace-trimmed. An absent label or a
    /// misaligned index yields `None`, never a panic.
    pub fn lookup(&self, label: &str) -> Option<String> {
        let idx = self.labels.iter().position(|l| l == label)?;
        self.values.get(idx).map(|v| v.trim().to_string())
    }

    pub fn has_features(&self) -> bool {
        self.labels.iter().any(|l| l == LABEL_FEATURES)
    }

    /// Splices the variable-length features run out of the values sequence
    /// and drops the features label, so that later lookups by label index
    /// stay aligned.
    ///
    /// The run is bounded on the left by the [`FEATURE_PREFIX_FIELDS`]
    /// single-value fields that precede it, and on the right by the count of
    /// labels that follow the features label. Zero trailing labels means the
    /// run extends to the end of the values sequence. Returns `None` when the
    /// table has no features label or the bounds don't fit the sequence.
    pub fn take_features(&mut self) -> Option<Vec<String>> {
        let idx = self.labels.iter().position(|l| l == LABEL_FEATURES)?;
        let trailing = self.labels.len() - idx - 1;
        let end = self.values.len().checked_sub(trailing)?;
        if end < FEATURE_PREFIX_FIELDS {
            return None;
        }

        self.labels.remove(idx);
        Some(self.values.drain(FEATURE_PREFIX_FIELDS..end).collect())
    }
}

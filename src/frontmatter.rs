//! Front-matter splitting, parsing, and rendering.
//!
//! Every post starts with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! layout: post
//! title: "Property Wrappers in SwiftUI"
//! date: 2020-03-28 11:00:00 +0200
//! description: What @State and @Binding really do
//! tags: [swift, swiftui]
//! comments: true
//! sharing: true
//! published: true
//! img: property-wrappers.png
//! ---
//!
//! Markdown body...
//! ```
//!
//! Parsing is lenient about *types* (a numeric title is still a title) but
//! strict about *structure*: a file without a closed block, or a block that
//! is not a key/value mapping, is an error. Keys outside the schema are kept
//! in [`FrontMatter::extra`] so the linter can report them.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("file does not start with a `---` front-matter fence")]
    Missing,
    #[error("front matter opened on line 1 is never closed")]
    Unterminated,
    #[error("invalid YAML in front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a key/value mapping")]
    NotMapping,
    #[error("invalid date `{0}`")]
    InvalidDate(String),
}

/// Keys of the front-matter schema, in the order `new` writes them.
pub const SCHEMA_KEYS: &[&str] = &[
    "layout",
    "title",
    "date",
    "description",
    "tags",
    "comments",
    "sharing",
    "published",
    "img",
];

/// Typed front matter of one post. Every field is optional at this level;
/// required-ness is decided by scan (title, date) and the linter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, deserialize_with = "scalar_string")]
    pub layout: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comments: Option<bool>,
    #[serde(default)]
    pub sharing: Option<bool>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub img: Option<String>,
    /// Keys outside the schema.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A post file split into its parsed front matter and raw Markdown body.
#[derive(Debug, Clone)]
pub struct Document {
    pub front_matter: FrontMatter,
    /// The raw YAML mapping, for key-presence checks.
    pub raw: serde_yaml::Mapping,
    pub body: String,
}

/// Split a post into its YAML block and body.
///
/// The first line must be `---` (after an optional BOM). The block ends at
/// the next line that is exactly `---` or `...`.
pub fn split(text: &str) -> Result<(&str, &str), FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let first_end = text.find('\n').unwrap_or(text.len());
    if text[..first_end].trim_end_matches('\r') != "---" {
        return Err(FrontMatterError::Missing);
    }

    let yaml_start = (first_end + 1).min(text.len());
    let mut pos = yaml_start;
    while pos < text.len() {
        let line_end = text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len());
        let line = text[pos..line_end].trim_end_matches('\r');
        if line == "---" || line == "..." {
            let body_start = (line_end + 1).min(text.len());
            return Ok((&text[yaml_start..pos], &text[body_start..]));
        }
        pos = line_end + 1;
    }

    Err(FrontMatterError::Unterminated)
}

/// Split and parse a post file.
pub fn parse(text: &str) -> Result<Document, FrontMatterError> {
    let (yaml, body) = split(text)?;

    let value: Value = if yaml.trim().is_empty() {
        Value::Mapping(serde_yaml::Mapping::new())
    } else {
        serde_yaml::from_str(yaml)?
    };
    let raw = match value {
        Value::Mapping(m) => m,
        Value::Null => serde_yaml::Mapping::new(),
        _ => return Err(FrontMatterError::NotMapping),
    };

    let front_matter: FrontMatter = serde_yaml::from_value(Value::Mapping(raw.clone()))?;

    Ok(Document {
        front_matter,
        raw,
        body: body.to_string(),
    })
}

impl Document {
    /// Whether the raw block contains `key` (with any value, even null).
    pub fn has_key(&self, key: &str) -> bool {
        self.raw.contains_key(Value::String(key.to_string()))
    }
}

/// Accept strings, numbers, and booleans as text. `title: 1984` is `"1984"`.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_to_string(&v)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected a plain value, found a list or mapping")),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(t) => scalar_to_string(&t.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Tags may be a YAML list or one string: `"swift, combine"` splits on
/// commas, `"swift combine"` on whitespace. Null list entries become empty
/// strings so the linter can flag them; entries are trimmed.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(split_tag_string(&s)),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                scalar_to_string(item)
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| de::Error::custom("tags must be plain strings"))
            })
            .collect(),
        Some(other) => scalar_to_string(&other)
            .map(|s| vec![s.trim().to_string()])
            .ok_or_else(|| de::Error::custom("tags must be a list or a string")),
    }
}

fn split_tag_string(s: &str) -> Vec<String> {
    if s.contains(',') {
        s.split(',').map(|t| t.trim().to_string()).collect()
    } else {
        s.split_whitespace().map(str::to_string).collect()
    }
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a front-matter date. Dates without an offset are taken as UTC.
pub fn parse_date(s: &str) -> Result<DateTime<FixedOffset>, FrontMatterError> {
    let s = s.trim();

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    let utc = FixedOffset::east_opt(0).ok_or_else(|| FrontMatterError::InvalidDate(s.into()))?;
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(utc.from_utc_datetime(&naive));
    }

    Err(FrontMatterError::InvalidDate(s.to_string()))
}

/// Whether a date string that parses also carries an explicit UTC offset.
pub fn has_offset(s: &str) -> bool {
    let s = s.trim();
    OFFSET_FORMATS
        .iter()
        .any(|fmt| DateTime::parse_from_str(s, fmt).is_ok())
        || DateTime::parse_from_rfc3339(s).is_ok()
}

/// Format a timestamp the way `new` writes it: `2020-03-28 11:00:00 +0200`.
pub fn format_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%d %H:%M:%S %z").to_string()
}

/// Render a complete front-matter block (fences included) in schema order.
pub fn render(fm: &FrontMatter) -> String {
    let mut out = String::from("---\n");

    out.push_str(&format!(
        "layout: {}\n",
        fm.layout.as_deref().unwrap_or("post")
    ));
    out.push_str(&format!(
        "title: {}\n",
        quote(fm.title.as_deref().unwrap_or(""))
    ));
    if let Some(date) = &fm.date {
        out.push_str(&format!("date: {date}\n"));
    }
    out.push_str(&format!(
        "description: {}\n",
        quote(fm.description.as_deref().unwrap_or(""))
    ));
    let tags: Vec<String> = fm.tags.iter().map(|t| quote_if_needed(t)).collect();
    out.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    out.push_str(&format!("comments: {}\n", fm.comments.unwrap_or(false)));
    out.push_str(&format!("sharing: {}\n", fm.sharing.unwrap_or(false)));
    out.push_str(&format!("published: {}\n", fm.published.unwrap_or(true)));
    if let Some(img) = &fm.img {
        out.push_str(&format!("img: {}\n", quote_if_needed(img)));
    }

    out.push_str("---\n");
    out
}

/// Double-quote a YAML scalar, escaping backslashes and quotes.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn quote_if_needed(s: &str) -> String {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ' '))
        && !s.starts_with(' ')
        && !s.ends_with(' ')
        && !matches!(s, "true" | "false" | "null" | "yes" | "no" | "~")
        && s.parse::<f64>().is_err();
    if plain { s.to_string() } else { quote(s) }
}

//! Shared types used across pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → generate) and
//! must round-trip unchanged through the manifest.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A post ready to render: front matter resolved, defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub date: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Display names, deduplicated by slug, in front-matter order.
    #[serde(default)]
    pub tags: Vec<String>,
    pub published: bool,
    pub layout: String,
    #[serde(default)]
    pub comments: bool,
    #[serde(default)]
    pub sharing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    /// URL slug from the file name, or the slugified title.
    pub slug: String,
    /// Site-absolute URL from the permalink template.
    pub url: String,
    /// Source file relative to the content root.
    pub source_path: String,
    /// Raw Markdown body.
    pub body: String,
    pub word_count: usize,
    pub read_minutes: u32,
    /// Plain-text summary: description, or the first paragraph.
    pub excerpt: String,
}

/// A tag and the number of posts that carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

impl Tag {
    pub fn url(&self) -> String {
        format!("/tags/{}/", self.slug)
    }
}

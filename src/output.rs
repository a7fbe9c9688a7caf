//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every post is its semantic identity (positional index, title, date),
//! with filesystem paths shown as secondary context via indented `Source:`
//! lines. This makes the output readable as a content inventory while still
//! letting users trace data back to specific files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Posts
//! 001 MVVM with Combine (2020-05-10)
//!     Source: _posts/2020-05-10-mvvm-combine.md
//!     URL: /2020/05/10/mvvm-combine/
//!     Tags: SwiftUI, Combine
//!
//! Skipped (unpublished)
//!     _posts/2020-06-01-draft-async-await.md
//!
//! Tags
//!     Combine (2)
//!     SwiftUI (3)
//!
//! Config
//!     config.toml
//!     assets/
//! ```
//!
//! ## Check
//!
//! ```text
//! _posts/2020-06-01-draft-async-await.md
//!     warning[date-without-offset]: date `2020-06-01 09:00:00` has no UTC offset; UTC is assumed
//!
//! Checked 5 files: 0 errors, 1 warning
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html (2 pages)
//! 001 MVVM with Combine → 2020/05/10/mvvm-combine/index.html
//! Tags → tags/index.html (4 tags)
//! Feed → feed.xml
//!
//! Generated 4 posts, 2 index pages, 4 tag pages, 2 assets
//! Cache: 12 written
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::GenerateSummary;
use crate::lint::Report;
use crate::naming;
use crate::scan::Manifest;
use crate::types::Post;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 post`, `2 posts`.
fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Post header: positional index, title, and publication date.
///
/// ```text
/// 001 Property Wrappers in SwiftUI (2020-03-28)
/// ```
fn post_header(index: usize, post: &Post) -> String {
    let draft = if post.published { "" } else { " [draft]" };
    format!(
        "{} {} ({}){}",
        format_index(index),
        post.title,
        post.date.format("%Y-%m-%d"),
        draft
    )
}

// ============================================================================
// Scan output
// ============================================================================

/// Format scan output showing discovered posts, tags, and config.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Posts".to_string());
    for (i, post) in manifest.posts.iter().enumerate() {
        lines.push(post_header(i + 1, post));
        lines.push(format!("{}Source: {}", indent(1), post.source_path));
        lines.push(format!("{}URL: {}", indent(1), post.url));
        if !post.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), post.tags.join(", ")));
        }
    }

    if !manifest.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (unpublished)".to_string());
        for path in &manifest.skipped {
            lines.push(format!("{}{}", indent(1), path));
        }
    }

    if !manifest.tags.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        for tag in &manifest.tags {
            lines.push(format!("{}{} ({})", indent(1), tag.name, tag.count));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    }
    if source_root.join(&manifest.config.assets_dir).is_dir() {
        lines.push(format!("{}{}/", indent(1), manifest.config.assets_dir));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format lint diagnostics grouped by file, followed by a summary line.
pub fn format_check_output(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<&str> = None;

    for diag in &report.diagnostics {
        if current != Some(diag.path.as_str()) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(diag.path.clone());
            current = Some(diag.path.as_str());
        }
        lines.push(format!(
            "{}{}[{}]: {}",
            indent(1),
            diag.severity,
            diag.kind,
            diag.message
        ));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {}: {}, {}",
        plural(report.files_checked, "file"),
        plural(report.errors(), "error"),
        plural(report.warnings(), "warning")
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &Report) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate output
// ============================================================================

/// Format generate output showing written pages.
///
/// Information-first: each post leads with its positional index and title,
/// followed by `→` and the output path.
pub fn format_generate_output(manifest: &Manifest, summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "Home \u{2192} index.html ({})",
        plural(summary.index_pages, "page")
    ));
    for (i, post) in manifest.posts.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            post.title,
            naming::output_path(&post.url)
        ));
    }
    lines.push(format!(
        "Tags \u{2192} tags/index.html ({})",
        plural(summary.tags, "tag")
    ));
    if summary.feed {
        lines.push("Feed \u{2192} feed.xml".to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}, {}",
        plural(summary.posts, "post"),
        plural(summary.index_pages, "index page"),
        plural(summary.tags, "tag page"),
        plural(summary.assets, "asset")
    ));
    lines.push(format!("Cache: {}", summary.cache));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(manifest: &Manifest, summary: &GenerateSummary) {
    for line in format_generate_output(manifest, summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

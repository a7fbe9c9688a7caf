//! Shared test utilities for the posthouse test suite.
//!
//! Provides fixture setup, lookup helpers, and post builders that work with
//! scan-phase data structures (`Manifest`, `Post`, `Tag`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let post = find_post(&manifest, "property-wrappers");
//! assert_eq!(post.title, "Property Wrappers in SwiftUI");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::frontmatter;
use crate::markdown;
use crate::naming;
use crate::scan::Manifest;
use crate::types::{Post, Tag};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a manifest as JSON into `dir` and return its path.
pub fn write_manifest(manifest: &Manifest, dir: &Path) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join("manifest.json");
    fs::write(&path, serde_json::to_string_pretty(manifest).unwrap()).unwrap();
    path
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(manifest: &'a Manifest, slug: &str) -> &'a Post {
    manifest
        .posts
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = manifest.posts.iter().map(|p| p.slug.as_str()).collect();
            panic!("post '{slug}' not found. Available: {slugs:?}")
        })
}

/// Find a tag by slug. Panics if not found.
pub fn find_tag<'a>(manifest: &'a Manifest, slug: &str) -> &'a Tag {
    manifest
        .tags
        .iter()
        .find(|t| t.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = manifest.tags.iter().map(|t| t.slug.as_str()).collect();
            panic!("tag '{slug}' not found. Available: {slugs:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Post titles in manifest order.
pub fn post_titles(manifest: &Manifest) -> Vec<&str> {
    manifest.posts.iter().map(|p| p.title.as_str()).collect()
}

// =========================================================================
// Builders
// =========================================================================

/// A published post with default permalink, no image, and a short body.
///
/// `date` uses the front-matter format, e.g. `2020-03-28 11:00:00 +0200`.
pub fn sample_post(title: &str, date: &str, tags: &[&str]) -> Post {
    let date = frontmatter::parse_date(date).unwrap();
    let slug = naming::slugify(title);
    let body = format!("Body of {title}.");
    let word_count = markdown::word_count(&body);
    Post {
        title: title.to_string(),
        date,
        description: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        published: true,
        layout: "post".to_string(),
        comments: false,
        sharing: false,
        img: None,
        url: naming::permalink(&SiteConfig::default().permalink, date.date_naive(), &slug),
        slug,
        source_path: String::new(),
        body,
        word_count,
        read_minutes: markdown::read_minutes(word_count),
        excerpt: format!("Excerpt of {title}"),
    }
}

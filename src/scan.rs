//! Content scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Walks the posts directory, parses every
//! post's front matter, and produces a [`Manifest`] that the generate stage
//! consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                                  # Content root
//! ├── config.toml                           # Site configuration (optional)
//! ├── assets/img/property-wrappers.png      # Header images
//! └── _posts/
//!     ├── 2020-03-28-property-wrappers.md   # → /2020/03/28/property-wrappers/
//!     ├── 2020-04-02-combine-basics.md
//!     └── swiftui/                          # Subdirectories are walked too
//!         └── 2020-05-10-mvvm.md
//! ```
//!
//! ## Rules
//!
//! - Every post needs a front-matter block with a non-empty `title`.
//! - `date` must parse; when absent, the file name date is used.
//! - Empty tags, and tags with no letters or digits to build a URL from, are
//!   dropped; tags are deduplicated by slug.
//! - `published: false` posts are skipped unless `include_unpublished`.
//! - Two posts may not share a permalink, and no post may land on a page the
//!   site generates itself (`/`, `/page/2/`, `/tags/`, `/tags/swift/`).
//!
//! Any violation names the offending file and stops the build. Use
//! [`crate::lint::check`] to collect every problem at once instead.

use crate::config::{self, SiteConfig};
use crate::frontmatter::{self, FrontMatterError};
use crate::markdown;
use crate::naming;
use crate::types::{Post, Tag};
use chrono::{FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Posts directory not found: {0}")]
    NoPostsDir(PathBuf),
    #[error("{path}: {source}")]
    Post {
        path: PathBuf,
        #[source]
        source: PostError,
    },
    #[error("Permalink {url} is produced by both {first} and {second}")]
    DuplicatePermalink {
        url: String,
        first: String,
        second: String,
    },
    #[error("{path}: permalink {url} is taken by the {page}")]
    ReservedPermalink {
        url: String,
        path: String,
        page: String,
    },
}

/// Why a single post could not be turned into a [`Post`].
#[derive(Error, Debug)]
pub enum PostError {
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
    #[error("missing or empty title")]
    MissingTitle,
    #[error("no `date` in front matter and no YYYY-MM-DD prefix in the file name")]
    MissingDate,
    #[error("cannot derive a slug from the file name or title")]
    EmptySlug,
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    /// Posts to publish, newest first.
    pub posts: Vec<Post>,
    /// All tags of published posts, sorted by name.
    pub tags: Vec<Tag>,
    /// Source paths of unpublished posts left out of the build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub config: SiteConfig,
}

const POST_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Length of the plain-text excerpt when a post has no description.
const EXCERPT_CHARS: usize = 280;

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    let posts_dir = root.join(&config.posts_dir);
    if !posts_dir.is_dir() {
        return Err(ScanError::NoPostsDir(posts_dir));
    }

    let mut posts = Vec::new();
    let mut skipped = Vec::new();

    for path in collect_post_files(&posts_dir)? {
        let rel = relative_path(&path, root);
        let text = fs::read_to_string(&path)?;
        let post = build_post(&text, &path, &rel, &config).map_err(|source| ScanError::Post {
            path: path.clone(),
            source,
        })?;

        if !post.published && !config.include_unpublished {
            tracing::debug!(path = %rel, "skipping unpublished post");
            skipped.push(rel);
            continue;
        }
        tracing::debug!(path = %rel, url = %post.url, "scanned post");
        posts.push(post);
    }

    sort_posts(&mut posts);
    check_unique_permalinks(&posts)?;
    let tags = collect_tags(&posts);
    if let Some((post, page)) = reserved_conflicts(&posts, &tags, &config).into_iter().next() {
        return Err(ScanError::ReservedPermalink {
            url: post.url.clone(),
            path: post.source_path.clone(),
            page,
        });
    }

    tracing::info!(
        posts = posts.len(),
        tags = tags.len(),
        skipped = skipped.len(),
        "scan complete"
    );

    Ok(Manifest {
        posts,
        tags,
        skipped,
        config,
    })
}

/// All post files under `dir`, sorted, hidden entries skipped.
pub fn collect_post_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry.map_err(|e| {
            ScanError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop in posts directory")),
            )
        })?;
        if entry.file_type().is_file() && is_post_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_post_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| POST_EXTENSIONS.contains(&e.as_str()))
}

pub(crate) fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Turn one post file into a [`Post`], applying front-matter defaults.
pub fn build_post(
    text: &str,
    path: &Path,
    rel_path: &str,
    config: &SiteConfig,
) -> Result<Post, PostError> {
    let doc = frontmatter::parse(text)?;
    let fm = doc.front_matter;

    let title = fm
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(PostError::MissingTitle)?
        .to_string();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed_name = naming::parse_post_filename(&stem);

    let date = match fm.date.as_deref() {
        Some(d) if !d.trim().is_empty() => frontmatter::parse_date(d)?,
        _ => parsed_name
            .date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|naive| utc_offset().map(|utc| utc.from_utc_datetime(&naive)))
            .ok_or(PostError::MissingDate)?,
    };

    let slug = if parsed_name.slug.is_empty() {
        naming::slugify(&title)
    } else {
        parsed_name.slug
    };
    if slug.is_empty() {
        return Err(PostError::EmptySlug);
    }

    let tags = normalize_tags(&fm.tags, rel_path);
    let url = naming::permalink(&config.permalink, date.date_naive(), &slug);
    let description = fm.description.unwrap_or_default().trim().to_string();
    let word_count = markdown::word_count(&doc.body);
    let excerpt = if description.is_empty() {
        markdown::excerpt(&doc.body, EXCERPT_CHARS)
    } else {
        description.clone()
    };

    Ok(Post {
        title,
        date,
        description,
        tags,
        published: fm.published.unwrap_or(true),
        layout: fm.layout.unwrap_or_else(|| "post".to_string()),
        comments: fm.comments.unwrap_or(false),
        sharing: fm.sharing.unwrap_or(false),
        img: fm.img.filter(|i| !i.trim().is_empty()),
        slug,
        url,
        source_path: rel_path.to_string(),
        body: doc.body,
        word_count,
        read_minutes: markdown::read_minutes(word_count),
        excerpt,
    })
}

fn utc_offset() -> Option<FixedOffset> {
    FixedOffset::east_opt(0)
}

/// Drop unusable tags and keep the first spelling of each tag slug.
fn normalize_tags(raw: &[String], rel_path: &str) -> Vec<String> {
    let mut seen = Vec::new();
    let mut tags = Vec::new();
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() {
            tracing::warn!(path = %rel_path, "dropping empty tag");
            continue;
        }
        let slug = naming::tag_slug(tag);
        if slug.is_empty() {
            tracing::warn!(path = %rel_path, tag = %tag, "dropping tag with no letters or digits");
            continue;
        }
        if seen.contains(&slug) {
            continue;
        }
        seen.push(slug);
        tags.push(tag.to_string());
    }
    tags
}

/// Newest first; same-instant posts ordered by slug.
fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
}

/// `/mvvm/` and `/mvvm` write the same file, so posts are compared by output path.
fn check_unique_permalinks(posts: &[Post]) -> Result<(), ScanError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for post in posts {
        if let Some(first) = seen.insert(naming::output_path(&post.url), &post.source_path) {
            return Err(ScanError::DuplicatePermalink {
                url: post.url.clone(),
                first: first.to_string(),
                second: post.source_path.clone(),
            });
        }
    }
    Ok(())
}

/// Pages the generate stage writes besides post pages, keyed by output path.
pub fn site_pages(posts: &[Post], tags: &[Tag], config: &SiteConfig) -> HashMap<String, String> {
    let mut pages = HashMap::new();
    let index_pages = posts.len().div_ceil(config.posts_per_page.max(1)).max(1);
    for page in 1..=index_pages {
        let what = if page == 1 {
            "home page".to_string()
        } else {
            format!("index page {page}")
        };
        pages.insert(naming::output_path(&naming::page_url(page)), what);
    }
    pages.insert("tags/index.html".to_string(), "tag index".to_string());
    for tag in tags {
        pages.insert(naming::output_path(&tag.url()), format!("page of tag `{}`", tag.name));
    }
    if config.feed.enabled {
        pages.insert("feed.xml".to_string(), "feed".to_string());
    }
    pages.insert("style.css".to_string(), "stylesheet".to_string());
    pages
}

/// Posts whose page would overwrite one of the [`site_pages`], with that page.
pub fn reserved_conflicts<'a>(
    posts: &'a [Post],
    tags: &[Tag],
    config: &SiteConfig,
) -> Vec<(&'a Post, String)> {
    let pages = site_pages(posts, tags, config);
    posts
        .iter()
        .filter_map(|post| {
            pages
                .get(&naming::output_path(&post.url))
                .map(|page| (post, page.clone()))
        })
        .collect()
}

/// Tag index for a newest-first post list.
///
/// Display names come from the newest post using the tag; counts are per post.
pub fn collect_tags(posts: &[Post]) -> Vec<Tag> {
    let mut by_slug: BTreeMap<String, Tag> = BTreeMap::new();
    for post in posts {
        for name in &post.tags {
            let slug = naming::tag_slug(name);
            by_slug
                .entry(slug.clone())
                .and_modify(|t| t.count += 1)
                .or_insert_with(|| Tag {
                    name: name.clone(),
                    slug,
                    count: 1,
                });
        }
    }
    let mut tags: Vec<Tag> = by_slug.into_values().collect();
    tags.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tags
}

/// Posts carrying the tag with `slug`, in manifest order.
pub fn posts_with_tag<'a>(posts: &'a [Post], slug: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|p| p.tags.iter().any(|t| naming::tag_slug(t) == slug))
        .collect()
}

//! HTML site generation.
//!
//! Stage 2 of the posthouse build pipeline. Takes the scan manifest and
//! generates the final static HTML site.
//!
//! ## Generated Pages
//!
//! - **Post pages** (`/{permalink}`): title, date, read time, tags, optional
//!   header image, body, share and discussion links, newer/older navigation
//! - **Index pages** (`/index.html`, `/page/{n}/index.html`): post summaries,
//!   `posts_per_page` at a time, newest first
//! - **Tag pages** (`/tags/index.html`, `/tags/{slug}/index.html`)
//! - **Feed** (`/feed.xml`): RSS 2.0, when enabled
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                           # Page 1 of the post list
//! ├── page/2/index.html
//! ├── 2020/03/28/property-wrappers/
//! │   └── index.html                       # Post page
//! ├── tags/
//! │   ├── index.html                       # All tags with counts
//! │   └── swiftui/index.html
//! ├── feed.xml
//! ├── style.css                            # Embedded stylesheet + color variables
//! ├── img/property-wrappers.png            # Copied from content/assets/
//! └── .posthouse-cache.json
//! ```
//!
//! Post pages are rendered in parallel on the rayon pool; every write goes
//! through [`CachedWriter`] on the calling thread.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping. Only the
//! rendered Markdown body is inserted pre-escaped.

use crate::cache::{CacheManifest, CacheStats, CachedWriter};
use crate::config::{self, SiteConfig};
use crate::feed;
use crate::markdown;
use crate::naming;
use crate::scan::{self, Manifest};
use crate::types::{Post, Tag};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error in manifest: {0}")]
    Config(#[from] config::ConfigError),
}

/// What a generate run produced.
#[derive(Debug)]
pub struct GenerateSummary {
    pub posts: usize,
    pub index_pages: usize,
    pub tags: usize,
    pub feed: bool,
    pub assets: usize,
    pub cache: CacheStats,
}

const CSS_STATIC: &str = include_str!("../static/style.css");

pub fn generate(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
) -> Result<GenerateSummary, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    let config = &manifest.config;
    config.validate()?;

    fs::create_dir_all(output_dir)?;
    let on_disk = CacheManifest::load(output_dir);
    let previous = if use_cache {
        on_disk.clone()
    } else {
        CacheManifest::empty()
    };
    let mut writer = CachedWriter::new(output_dir, previous);

    // Post pages
    let posts = &manifest.posts;
    let pages: Vec<(String, String)> = posts
        .par_iter()
        .enumerate()
        .map(|(idx, post)| {
            let newer = idx.checked_sub(1).and_then(|i| posts.get(i));
            let older = posts.get(idx + 1);
            let html = render_post_page(post, newer, older, config);
            (naming::output_path(&post.url), html.into_string())
        })
        .collect();
    for (path, html) in &pages {
        writer.write(path, html.as_bytes())?;
        tracing::debug!(path = %path, "rendered post");
    }

    // Index pages
    let chunks: Vec<&[Post]> = if posts.is_empty() {
        vec![&posts[..]]
    } else {
        posts.chunks(config.posts_per_page).collect()
    };
    let total_pages = chunks.len();
    for (idx, chunk) in chunks.iter().enumerate() {
        let page = idx + 1;
        let html = render_index_page(chunk, page, total_pages, config);
        writer.write(
            &naming::output_path(&naming::page_url(page)),
            html.into_string().as_bytes(),
        )?;
    }

    // Tag pages
    let tags_html = render_tags_index(&manifest.tags, config);
    writer.write("tags/index.html", tags_html.into_string().as_bytes())?;
    for tag in &manifest.tags {
        let tagged = scan::posts_with_tag(posts, &tag.slug);
        let html = render_tag_page(tag, &tagged, config);
        writer.write(
            &naming::output_path(&tag.url()),
            html.into_string().as_bytes(),
        )?;
    }

    if config.feed.enabled {
        writer.write("feed.xml", feed::render_feed(posts, config).as_bytes())?;
    }

    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);
    writer.write("style.css", css.as_bytes())?;

    let cache = writer.finish(&on_disk)?;
    let assets = copy_assets(source_root, config, output_dir)?;

    tracing::info!(
        posts = posts.len(),
        pages = total_pages,
        tags = manifest.tags.len(),
        cache = %cache,
        "generate complete"
    );

    Ok(GenerateSummary {
        posts: posts.len(),
        index_pages: total_pages,
        tags: manifest.tags.len(),
        feed: config.feed.enabled,
        assets,
        cache,
    })
}

/// Copy `assets_dir` to the output root, plus `image_dir` when it lives elsewhere.
fn copy_assets(source_root: &Path, config: &SiteConfig, output_dir: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    let assets = source_root.join(&config.assets_dir);
    if assets.is_dir() {
        copied += copy_dir_recursive(&assets, output_dir)?;
    }
    let images = source_root.join(&config.image_dir);
    if !config.image_dir_in_assets() && images.is_dir() {
        let dst = output_dir.join(config.public_image_dir());
        fs::create_dir_all(&dst)?;
        copied += copy_dir_recursive(&images, &dst)?;
    }
    Ok(copied)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    title: &str,
    description: &str,
    config: &SiteConfig,
    body_class: Option<&str>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                meta name="generator" content={ "posthouse " (env!("CARGO_PKG_VERSION")) };
                link rel="stylesheet" href="/style.css";
                @if config.feed.enabled {
                    link rel="alternate" type="application/rss+xml" title=(config.title) href="/feed.xml";
                }
            }
            body class=[body_class] {
                (site_header(config))
                main {
                    (content)
                }
                (site_footer(config))
            }
        }
    }
}

/// Renders the site header with title and navigation
fn site_header(config: &SiteConfig) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (config.title) }
            nav.site-nav {
                a href="/tags/" { "Tags" }
                @if config.feed.enabled {
                    a href="/feed.xml" { "RSS" }
                }
            }
        }
    }
}

fn site_footer(config: &SiteConfig) -> Markup {
    html! {
        footer.site-footer {
            @if !config.author.is_empty() {
                span.author { (config.author) }
            }
        }
    }
}

/// Date, read time
fn post_meta(post: &Post) -> Markup {
    html! {
        p.post-meta {
            time datetime=(post.date.to_rfc3339()) { (display_date(post)) }
            " · "
            (post.read_minutes) " min read"
        }
    }
}

fn display_date(post: &Post) -> String {
    post.date.format("%B %-d, %Y").to_string()
}

fn tag_links(tags: &[String]) -> Markup {
    html! {
        ul.post-tags {
            @for tag in tags {
                li {
                    a href={ "/tags/" (naming::tag_slug(tag)) "/" } { (tag) }
                }
            }
        }
    }
}

/// One entry in a post list
fn post_summary(post: &Post) -> Markup {
    html! {
        article.post-summary {
            h2 {
                a href=(post.url) { (post.title) }
            }
            (post_meta(post))
            @if !post.excerpt.is_empty() {
                p.excerpt { (post.excerpt) }
            }
        }
    }
}

/// Share links for a post, or nothing without `base_url`.
pub fn share_links(post: &Post, config: &SiteConfig) -> Markup {
    if config.base_url.is_empty() {
        return html! {};
    }
    let link = config.absolute_url(&post.url);
    let links = [
        (
            "Twitter",
            share_url(
                "https://twitter.com/intent/tweet",
                &[("url", &link), ("text", &post.title)],
            ),
        ),
        (
            "LinkedIn",
            share_url(
                "https://www.linkedin.com/sharing/share-offsite/",
                &[("url", &link)],
            ),
        ),
        (
            "Hacker News",
            share_url(
                "https://news.ycombinator.com/submitlink",
                &[("u", &link), ("t", &post.title)],
            ),
        ),
    ];

    html! {
        aside.share {
            span { "Share: " }
            @for (name, href) in &links {
                @if let Some(href) = href {
                    a href=(href) target="_blank" rel="noopener" { (name) }
                }
            }
        }
    }
}

fn share_url(base: &str, params: &[(&str, &str)]) -> Option<String> {
    url::Url::parse_with_params(base, params)
        .ok()
        .map(String::from)
}

/// Newer/older links between post pages
fn post_nav(newer: Option<&Post>, older: Option<&Post>) -> Markup {
    html! {
        @if newer.is_some() || older.is_some() {
            nav.post-nav {
                @if let Some(p) = newer {
                    a.newer href=(p.url) rel="prev" { "← " (p.title) }
                }
                @if let Some(p) = older {
                    a.older href=(p.url) rel="next" { (p.title) " →" }
                }
            }
        }
    }
}

fn pagination(page: usize, total: usize) -> Markup {
    html! {
        @if total > 1 {
            nav.pagination {
                @if page > 1 {
                    a.newer href=(naming::page_url(page - 1)) { "← Newer posts" }
                }
                span.page-number { "Page " (page) " of " (total) }
                @if page < total {
                    a.older href=(naming::page_url(page + 1)) { "Older posts →" }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a single post page
fn render_post_page(
    post: &Post,
    newer: Option<&Post>,
    older: Option<&Post>,
    config: &SiteConfig,
) -> Markup {
    let body_html = markdown::to_html(&post.body);
    let layout_class = format!("layout-{}", naming::slugify(&post.layout));

    let content = html! {
        article.post {
            header.post-header {
                h1.post-title { (post.title) }
                (post_meta(post))
                @if !post.tags.is_empty() {
                    (tag_links(&post.tags))
                }
            }
            @if let Some(img) = &post.img {
                figure.post-image {
                    img src=(config.image_url(img)) alt=(post.title);
                }
            }
            div.post-body {
                (PreEscaped(body_html))
            }
            @if post.sharing {
                (share_links(post, config))
            }
            @if post.comments && !config.discussion_url.is_empty() {
                aside.discussion {
                    a href=(config.discussion_url) { "Join the discussion" }
                }
            }
        }
        (post_nav(newer, older))
    };

    let title = format!("{} · {}", post.title, config.title);
    base_document(&title, &post.excerpt, config, Some(&layout_class), content)
}

/// Renders one page of the post list
fn render_index_page(posts: &[Post], page: usize, total: usize, config: &SiteConfig) -> Markup {
    let content = html! {
        @if page == 1 && !config.description.is_empty() {
            p.site-description { (config.description) }
        }
        section.post-list {
            @for post in posts {
                (post_summary(post))
            }
            @if posts.is_empty() {
                p.empty { "No posts yet." }
            }
        }
        (pagination(page, total))
    };

    let title = if page == 1 {
        config.title.clone()
    } else {
        format!("{} · Page {}", config.title, page)
    };
    base_document(&title, &config.description, config, Some("index"), content)
}

/// Renders the list of all tags with post counts
fn render_tags_index(tags: &[Tag], config: &SiteConfig) -> Markup {
    let content = html! {
        h1 { "Tags" }
        ul.tag-index {
            @for tag in tags {
                li {
                    a href=(tag.url()) { (tag.name) }
                    " "
                    span.count { "(" (tag.count) ")" }
                }
            }
        }
    };
    let title = format!("Tags · {}", config.title);
    base_document(&title, "", config, Some("tags"), content)
}

/// Renders the post list for one tag
fn render_tag_page(tag: &Tag, posts: &[&Post], config: &SiteConfig) -> Markup {
    let content = html! {
        h1 { "Posts tagged “" (tag.name) "”" }
        section.post-list {
            @for post in posts {
                (post_summary(post))
            }
        }
        p.back { a href="/tags/" { "All tags" } }
    };
    let title = format!("{} · {}", tag.name, config.title);
    base_document(&title, "", config, Some("tag"), content)
}

// ============================================================================
// Tests
// ============================================================================

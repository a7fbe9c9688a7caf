//! Scaffolding for new posts.
//!
//! `posthouse new "Clean Architecture for SwiftUI"` writes
//! `_posts/2020-05-20-clean-architecture-for-swiftui.md` with every
//! front-matter key filled in, so a fresh post passes `check` as soon as
//! its description is written.

use crate::config::{self, ConfigError};
use crate::frontmatter::{self, FrontMatter};
use crate::naming;
use chrono::{DateTime, FixedOffset, Local};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewPostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Post title is empty")]
    EmptyTitle,
    #[error("Title `{0}` has no characters usable in a file name")]
    EmptySlug(String),
    #[error("Post already exists: {0}")]
    Exists(PathBuf),
}

/// Optional front-matter values for a new post.
#[derive(Debug, Clone, Default)]
pub struct NewPostOptions {
    pub description: String,
    pub tags: Vec<String>,
    pub img: Option<String>,
    /// Write `published: true` instead of starting as a draft.
    pub publish: bool,
    pub comments: bool,
    pub sharing: bool,
    /// Post timestamp; the current local time when `None`.
    pub date: Option<DateTime<FixedOffset>>,
}

const PLACEHOLDER_BODY: &str = "Write the post here.\n";

/// Create a post file under the configured posts directory.
pub fn new_post(root: &Path, title: &str, options: &NewPostOptions) -> Result<PathBuf, NewPostError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NewPostError::EmptyTitle);
    }
    let slug = naming::slugify(title);
    if slug.is_empty() {
        return Err(NewPostError::EmptySlug(title.to_string()));
    }

    let config = config::load_config(root)?;
    let date = options.date.unwrap_or_else(|| Local::now().fixed_offset());

    let dir = root.join(&config.posts_dir);
    let path = dir.join(format!("{}-{slug}.md", date.format("%Y-%m-%d")));
    if path.exists() {
        return Err(NewPostError::Exists(path));
    }

    let front_matter = FrontMatter {
        layout: Some("post".to_string()),
        title: Some(title.to_string()),
        date: Some(frontmatter::format_date(&date)),
        description: Some(options.description.clone()),
        tags: options.tags.clone(),
        comments: Some(options.comments),
        sharing: Some(options.sharing),
        published: Some(options.publish),
        img: options.img.clone(),
        extra: BTreeMap::new(),
    };

    fs::create_dir_all(&dir)?;
    let text = format!("{}\n{PLACEHOLDER_BODY}", frontmatter::render(&front_matter));
    fs::write(&path, text)?;
    tracing::info!(path = %path.display(), "created post");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::{self, Kind};
    use crate::scan;
    use tempfile::TempDir;

    fn fixed_date() -> DateTime<FixedOffset> {
        frontmatter::parse_date("2020-05-20 09:30:00 +0200").unwrap()
    }

    fn options() -> NewPostOptions {
        NewPostOptions {
            date: Some(fixed_date()),
            ..NewPostOptions::default()
        }
    }

    #[test]
    fn writes_dated_file_with_full_front_matter() {
        let tmp = TempDir::new().unwrap();
        let path = new_post(tmp.path(), "Clean Architecture: SwiftUI", &options()).unwrap();

        assert_eq!(
            path,
            tmp.path()
                .join("_posts/2020-05-20-clean-architecture-swiftui.md")
        );
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("---\nlayout: post\ntitle: \"Clean Architecture: SwiftUI\"\n"));
        assert!(text.contains("date: 2020-05-20 09:30:00 +0200\n"));
        assert!(text.contains("published: false\n"));
        assert!(text.ends_with(PLACEHOLDER_BODY));
    }

    #[test]
    fn new_post_round_trips_through_parse() {
        let tmp = TempDir::new().unwrap();
        let opts = NewPostOptions {
            description: "Layers & boundaries".into(),
            tags: vec!["swiftui".into(), "architecture".into()],
            img: Some("clean.png".into()),
            publish: true,
            ..options()
        };
        let path = new_post(tmp.path(), "Clean Architecture", &opts).unwrap();

        let doc = frontmatter::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        let fm = doc.front_matter;
        assert_eq!(fm.title.as_deref(), Some("Clean Architecture"));
        assert_eq!(fm.description.as_deref(), Some("Layers & boundaries"));
        assert_eq!(fm.tags, vec!["swiftui", "architecture"]);
        assert_eq!(fm.published, Some(true));
        assert_eq!(fm.img.as_deref(), Some("clean.png"));
    }

    #[test]
    fn drafts_are_skipped_by_scan() {
        let tmp = TempDir::new().unwrap();
        new_post(tmp.path(), "Draft", &options()).unwrap();

        let manifest = scan::scan(tmp.path()).unwrap();
        assert!(manifest.posts.is_empty());
        assert_eq!(manifest.skipped, vec!["_posts/2020-05-20-draft.md"]);
    }

    #[test]
    fn new_post_passes_check() {
        let tmp = TempDir::new().unwrap();
        let opts = NewPostOptions {
            tags: vec!["swift".into()],
            ..options()
        };
        new_post(tmp.path(), "Fresh", &opts).unwrap();

        let report = lint::check(tmp.path()).unwrap();
        assert!(report.is_ok(), "{:?}", report.diagnostics);
        assert!(!report.diagnostics.iter().any(|d| d.kind == Kind::MissingKey));
    }

    #[test]
    fn refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        new_post(tmp.path(), "Same", &options()).unwrap();
        let result = new_post(tmp.path(), "Same", &options());
        assert!(matches!(result, Err(NewPostError::Exists(_))));
    }

    #[test]
    fn rejects_empty_title() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            new_post(tmp.path(), "   ", &options()),
            Err(NewPostError::EmptyTitle)
        ));
        assert!(matches!(
            new_post(tmp.path(), "日本語", &options()),
            Err(NewPostError::EmptySlug(_))
        ));
    }

    #[test]
    fn honors_configured_posts_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "posts_dir = \"posts\"\n").unwrap();
        let path = new_post(tmp.path(), "Elsewhere", &options()).unwrap();
        assert!(path.starts_with(tmp.path().join("posts")));
    }
}

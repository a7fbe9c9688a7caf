//! Content integrity checks for the `check` command.
//!
//! Where [`crate::scan`] stops at the first broken post, the linter reads
//! every post file (published or not) and collects all problems into a
//! [`Report`]. Errors are problems that would break or silently change the
//! build; warnings are conventions worth keeping.

use crate::config::{self, SiteConfig};
use crate::frontmatter::{self, Document, FrontMatterError, SCHEMA_KEYS};
use crate::naming;
use crate::scan::{self, PostError, ScanError};
use crate::types::Post;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Posts directory not found: {0}")]
    NoPostsDir(PathBuf),
}

impl From<ScanError> for LintError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::Io(e) => LintError::Io(e),
            ScanError::Config(e) => LintError::Config(e),
            ScanError::NoPostsDir(p) => LintError::NoPostsDir(p),
            other => LintError::Io(std::io::Error::other(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    MissingFrontMatter,
    UnterminatedFrontMatter,
    InvalidYaml,
    MissingKey,
    EmptyTitle,
    InvalidDate,
    MissingDate,
    EmptySlug,
    DateWithoutOffset,
    FilenameDateMismatch,
    EmptyTag,
    UnsluggableTag,
    DuplicateTag,
    UnknownLayout,
    UnknownKey,
    MissingImage,
    DuplicatePermalink,
}

impl Kind {
    pub fn severity(self) -> Severity {
        match self {
            Kind::DateWithoutOffset
            | Kind::FilenameDateMismatch
            | Kind::UnsluggableTag
            | Kind::DuplicateTag
            | Kind::UnknownLayout
            | Kind::UnknownKey
            | Kind::MissingImage => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::MissingFrontMatter => "missing-front-matter",
            Kind::UnterminatedFrontMatter => "unterminated-front-matter",
            Kind::InvalidYaml => "invalid-yaml",
            Kind::MissingKey => "missing-key",
            Kind::EmptyTitle => "empty-title",
            Kind::InvalidDate => "invalid-date",
            Kind::MissingDate => "missing-date",
            Kind::EmptySlug => "empty-slug",
            Kind::DateWithoutOffset => "date-without-offset",
            Kind::FilenameDateMismatch => "filename-date-mismatch",
            Kind::EmptyTag => "empty-tag",
            Kind::UnsluggableTag => "unsluggable-tag",
            Kind::DuplicateTag => "duplicate-tag",
            Kind::UnknownLayout => "unknown-layout",
            Kind::UnknownKey => "unknown-key",
            Kind::MissingImage => "missing-image",
            Kind::DuplicatePermalink => "duplicate-permalink",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem in one post file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Source file relative to the content root.
    pub path: String,
    pub severity: Severity,
    pub kind: Kind,
    pub message: String,
}

impl Diagnostic {
    fn new(path: &str, kind: Kind, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            severity: kind.severity(),
            kind,
            message: message.into(),
        }
    }
}

/// Result of checking every post file.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub files_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// No errors. Warnings do not fail a check.
    pub fn is_ok(&self) -> bool {
        self.errors() == 0
    }

    pub fn has(&self, path: &str, kind: Kind) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.path == path && d.kind == kind)
    }
}

/// Check every post file under the content root.
pub fn check(root: &Path) -> Result<Report, LintError> {
    let config = config::load_config(root)?;
    let posts_dir = root.join(&config.posts_dir);
    if !posts_dir.is_dir() {
        return Err(LintError::NoPostsDir(posts_dir));
    }

    let mut report = Report::default();
    let mut permalinks: HashMap<String, String> = HashMap::new();
    let mut published: Vec<Post> = Vec::new();

    for path in scan::collect_post_files(&posts_dir)? {
        let rel = scan::relative_path(&path, root);
        let text = fs::read_to_string(&path)?;
        report.files_checked += 1;

        let found = check_post(&text, &path, &rel, root, &config);
        tracing::debug!(path = %rel, problems = found.len(), "checked post");
        report.diagnostics.extend(found);

        // Permalink collisions use the same rules as the build.
        if let Ok(post) = scan::build_post(&text, &path, &rel, &config)
            && (post.published || config.include_unpublished)
        {
            let out_path = naming::output_path(&post.url);
            if let Some(first) = permalinks.get(&out_path) {
                report.diagnostics.push(Diagnostic::new(
                    &rel,
                    Kind::DuplicatePermalink,
                    format!("permalink {} is already used by {first}", post.url),
                ));
            } else {
                permalinks.insert(out_path, rel);
                published.push(post);
            }
        }
    }

    let tags = scan::collect_tags(&published);
    for (post, page) in scan::reserved_conflicts(&published, &tags, &config) {
        report.diagnostics.push(Diagnostic::new(
            &post.source_path,
            Kind::DuplicatePermalink,
            format!("permalink {} is taken by the {page}", post.url),
        ));
    }

    tracing::info!(
        files = report.files_checked,
        errors = report.errors(),
        warnings = report.warnings(),
        "check complete"
    );
    Ok(report)
}

/// All diagnostics for one post file's text.
pub fn check_post(
    text: &str,
    path: &Path,
    rel: &str,
    root: &Path,
    config: &SiteConfig,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let doc = match frontmatter::parse(text) {
        Ok(doc) => doc,
        Err(e) => {
            let kind = match e {
                FrontMatterError::Missing => Kind::MissingFrontMatter,
                FrontMatterError::Unterminated => Kind::UnterminatedFrontMatter,
                _ => Kind::InvalidYaml,
            };
            out.push(Diagnostic::new(rel, kind, e.to_string()));
            return out;
        }
    };

    check_keys(&doc, rel, config, &mut out);
    check_title(&doc, rel, &mut out);
    check_date(&doc, path, rel, &mut out);
    check_tags(&doc, rel, &mut out);
    check_layout(&doc, rel, config, &mut out);
    check_image(&doc, rel, root, config, &mut out);

    // Anything the build would still reject gets reported too.
    if !out.iter().any(|d| d.severity == Severity::Error)
        && let Err(e) = scan::build_post(text, path, rel, config)
    {
        out.push(build_diagnostic(rel, &e));
    }
    out
}

fn build_diagnostic(rel: &str, err: &PostError) -> Diagnostic {
    let kind = match err {
        PostError::FrontMatter(FrontMatterError::Missing) => Kind::MissingFrontMatter,
        PostError::FrontMatter(FrontMatterError::Unterminated) => Kind::UnterminatedFrontMatter,
        PostError::FrontMatter(FrontMatterError::InvalidDate(_)) => Kind::InvalidDate,
        PostError::FrontMatter(_) => Kind::InvalidYaml,
        PostError::MissingTitle => Kind::EmptyTitle,
        PostError::MissingDate => Kind::MissingDate,
        PostError::EmptySlug => Kind::EmptySlug,
    };
    Diagnostic::new(rel, kind, err.to_string())
}

fn check_keys(doc: &Document, rel: &str, config: &SiteConfig, out: &mut Vec<Diagnostic>) {
    for key in &config.lint.required {
        if !doc.has_key(key) {
            out.push(Diagnostic::new(
                rel,
                Kind::MissingKey,
                format!("front matter has no `{key}`"),
            ));
        }
    }
    for key in doc.front_matter.extra.keys() {
        out.push(Diagnostic::new(
            rel,
            Kind::UnknownKey,
            format!("`{key}` is not a known front-matter key ({})", SCHEMA_KEYS.join(", ")),
        ));
    }
}

fn check_title(doc: &Document, rel: &str, out: &mut Vec<Diagnostic>) {
    if !doc.has_key("title") {
        return;
    }
    let empty = doc
        .front_matter
        .title
        .as_deref()
        .is_none_or(|t| t.trim().is_empty());
    if empty {
        out.push(Diagnostic::new(rel, Kind::EmptyTitle, "title is empty"));
    }
}

fn check_date(doc: &Document, path: &Path, rel: &str, out: &mut Vec<Diagnostic>) {
    // A blank date counts as absent, as in the build.
    let Some(raw) = doc
        .front_matter
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    else {
        return;
    };
    let date = match frontmatter::parse_date(raw) {
        Ok(d) => d,
        Err(e) => {
            out.push(Diagnostic::new(rel, Kind::InvalidDate, e.to_string()));
            return;
        }
    };
    if !frontmatter::has_offset(raw) {
        out.push(Diagnostic::new(
            rel,
            Kind::DateWithoutOffset,
            format!("date `{}` has no UTC offset; UTC is assumed", raw.trim()),
        ));
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if let Some(file_date) = naming::parse_post_filename(&stem).date
        && file_date != date.date_naive()
    {
        out.push(Diagnostic::new(
            rel,
            Kind::FilenameDateMismatch,
            format!(
                "file name date {file_date} differs from front-matter date {}",
                date.date_naive()
            ),
        ));
    }
}

fn check_tags(doc: &Document, rel: &str, out: &mut Vec<Diagnostic>) {
    let mut seen: Vec<String> = Vec::new();
    for (i, tag) in doc.front_matter.tags.iter().enumerate() {
        if tag.trim().is_empty() {
            out.push(Diagnostic::new(
                rel,
                Kind::EmptyTag,
                format!("tag #{} is empty", i + 1),
            ));
            continue;
        }
        let slug = naming::tag_slug(tag);
        if slug.is_empty() {
            out.push(Diagnostic::new(
                rel,
                Kind::UnsluggableTag,
                format!("tag `{tag}` has no letters or digits for its URL; the build drops it"),
            ));
            continue;
        }
        if seen.contains(&slug) {
            out.push(Diagnostic::new(
                rel,
                Kind::DuplicateTag,
                format!("tag `{tag}` is listed more than once"),
            ));
        } else {
            seen.push(slug);
        }
    }
}

fn check_layout(doc: &Document, rel: &str, config: &SiteConfig, out: &mut Vec<Diagnostic>) {
    if let Some(layout) = doc.front_matter.layout.as_deref()
        && !config.lint.layouts.iter().any(|l| l == layout)
    {
        out.push(Diagnostic::new(
            rel,
            Kind::UnknownLayout,
            format!("layout `{layout}` is not one of: {}", config.lint.layouts.join(", ")),
        ));
    }
}

fn check_image(
    doc: &Document,
    rel: &str,
    root: &Path,
    config: &SiteConfig,
    out: &mut Vec<Diagnostic>,
) {
    let Some(img) = doc.front_matter.img.as_deref().filter(|i| !i.trim().is_empty()) else {
        return;
    };
    if img.starts_with("http://") || img.starts_with("https://") {
        return;
    }
    let path = root.join(&config.image_dir).join(img.trim_start_matches('/'));
    if !path.is_file() {
        out.push(Diagnostic::new(
            rel,
            Kind::MissingImage,
            format!("image `{img}` not found in {}", config.image_dir),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    const GOOD: &str = "---\nlayout: post\ntitle: Good\ndate: 2020-01-01 10:00:00 +0000\ndescription: Fine\ntags: [swift]\ncomments: false\nsharing: false\npublished: true\n---\nBody\n";

    fn kinds(text: &str, file: &str) -> Vec<Kind> {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("_posts").join(file);
        let rel = format!("_posts/{file}");
        check_post(text, &path, &rel, tmp.path(), &SiteConfig::default())
            .into_iter()
            .map(|d| d.kind)
            .collect()
    }

    fn write_post(root: &Path, name: &str, content: &str) {
        let dir = root.join("_posts");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    // =========================================================================
    // Single-file checks
    // =========================================================================

    #[test]
    fn good_post_is_clean() {
        assert!(kinds(GOOD, "2020-01-01-good.md").is_empty());
    }

    #[test]
    fn missing_front_matter() {
        assert_eq!(kinds("# Title\n", "a.md"), vec![Kind::MissingFrontMatter]);
    }

    #[test]
    fn unterminated_front_matter() {
        assert_eq!(
            kinds("---\ntitle: A\n", "a.md"),
            vec![Kind::UnterminatedFrontMatter]
        );
    }

    #[test]
    fn invalid_yaml() {
        assert_eq!(
            kinds("---\ntitle: a: b: c\n---\n", "a.md"),
            vec![Kind::InvalidYaml]
        );
    }

    #[test]
    fn missing_required_keys() {
        let text = "---\ntitle: A\ndate: 2020-01-01 10:00:00 +0000\n---\n";
        let found = kinds(text, "2020-01-01-a.md");
        assert_eq!(
            found.iter().filter(|k| **k == Kind::MissingKey).count(),
            3 // layout, description, tags
        );
    }

    #[test]
    fn empty_title() {
        let text = GOOD.replace("title: Good", "title: \"\"");
        assert_eq!(kinds(&text, "2020-01-01-good.md"), vec![Kind::EmptyTitle]);
    }

    #[test]
    fn invalid_date() {
        let text = GOOD.replace("2020-01-01 10:00:00 +0000", "2020-02-30");
        assert_eq!(kinds(&text, "x.md"), vec![Kind::InvalidDate]);
    }

    #[test]
    fn date_without_offset_warns() {
        let text = GOOD.replace("2020-01-01 10:00:00 +0000", "2020-01-01 10:00:00");
        assert_eq!(kinds(&text, "2020-01-01-good.md"), vec![Kind::DateWithoutOffset]);
    }

    #[test]
    fn filename_date_mismatch_warns() {
        assert_eq!(
            kinds(GOOD, "2019-12-31-good.md"),
            vec![Kind::FilenameDateMismatch]
        );
    }

    #[test]
    fn empty_and_duplicate_tags() {
        let text = GOOD.replace("tags: [swift]", "tags: [swift, \"\", Swift, ~]");
        assert_eq!(
            kinds(&text, "x.md"),
            vec![Kind::EmptyTag, Kind::DuplicateTag, Kind::EmptyTag]
        );
    }

    #[test]
    fn non_latin_tag_is_valid() {
        let text = GOOD.replace("tags: [swift]", "tags: [swift, \"日本語\"]");
        assert!(kinds(&text, "2020-01-01-good.md").is_empty());
    }

    #[test]
    fn tag_without_letters_warns() {
        let text = GOOD.replace("tags: [swift]", "tags: [swift, \"#\"]");
        assert_eq!(kinds(&text, "2020-01-01-good.md"), vec![Kind::UnsluggableTag]);
    }

    #[test]
    fn title_without_slug_is_error() {
        let text = GOOD.replace("title: Good", "title: \"日本語の記事\"");
        assert_eq!(kinds(&text, "2020-01-01.md"), vec![Kind::EmptySlug]);
    }

    #[test]
    fn blank_date_falls_back_to_filename() {
        let text = GOOD.replace("2020-01-01 10:00:00 +0000", "\"\"");
        assert!(kinds(&text, "2020-01-01-good.md").is_empty());
        assert_eq!(kinds(&text, "good.md"), vec![Kind::MissingDate]);
    }

    #[test]
    fn unknown_layout_and_key() {
        let text = GOOD.replace("layout: post", "layout: page\nauthor: me");
        assert_eq!(
            kinds(&text, "x.md"),
            vec![Kind::UnknownKey, Kind::UnknownLayout]
        );
    }

    #[test]
    fn missing_image_warns() {
        let text = GOOD.replace("published: true", "published: true\nimg: nope.png");
        assert_eq!(kinds(&text, "x.md"), vec![Kind::MissingImage]);
    }

    #[test]
    fn severities() {
        assert_eq!(Kind::InvalidDate.severity(), Severity::Error);
        assert_eq!(Kind::EmptyTag.severity(), Severity::Error);
        assert_eq!(Kind::DuplicateTag.severity(), Severity::Warning);
        assert_eq!(Kind::DuplicatePermalink.severity(), Severity::Error);
        assert_eq!(Kind::MissingImage.to_string(), "missing-image");
        assert_eq!(Kind::EmptySlug.severity(), Severity::Error);
        assert_eq!(Kind::UnsluggableTag.severity(), Severity::Warning);
    }

    // =========================================================================
    // Whole-tree checks
    // =========================================================================

    #[test]
    fn fixtures_have_only_expected_problems() {
        let tmp = setup_fixtures();
        let report = check(tmp.path()).unwrap();

        assert_eq!(report.files_checked, 5);
        assert!(report.is_ok(), "{:?}", report.diagnostics);
        // The draft is written without an offset on purpose.
        assert!(report.has(
            "_posts/2020-06-01-draft-async-await.md",
            Kind::DateWithoutOffset
        ));
    }

    #[test]
    fn check_collects_across_files() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "2020-01-01-good.md", GOOD);
        write_post(tmp.path(), "2020-01-02-bad.md", "no front matter");
        write_post(
            tmp.path(),
            "2020-01-03-baddate.md",
            &GOOD.replace("2020-01-01 10:00:00 +0000", "soon"),
        );

        let report = check(tmp.path()).unwrap();
        assert_eq!(report.files_checked, 3);
        assert_eq!(report.errors(), 2);
        assert!(!report.is_ok());
        assert!(report.has("_posts/2020-01-02-bad.md", Kind::MissingFrontMatter));
        assert!(report.has("_posts/2020-01-03-baddate.md", Kind::InvalidDate));
    }

    #[test]
    fn check_reports_duplicate_permalinks() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "2020-01-01-good.md", GOOD);
        write_post(tmp.path(), "2020-01-01-Good.markdown", GOOD);

        let report = check(tmp.path()).unwrap();
        assert_eq!(
            report
                .diagnostics
                .iter()
                .filter(|d| d.kind == Kind::DuplicatePermalink)
                .count(),
            1
        );
    }

    #[test]
    fn check_reports_post_on_generated_page() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "permalink = \"/:slug/\"\n").unwrap();
        write_post(tmp.path(), "2020-01-01-good.md", GOOD);
        write_post(
            tmp.path(),
            "2020-02-02-tags.md",
            &GOOD
                .replace("title: Good", "title: Tags")
                .replace("2020-01-01 10:00:00", "2020-02-02 10:00:00"),
        );

        let report = check(tmp.path()).unwrap();
        assert!(!report.is_ok());
        assert!(report.has("_posts/2020-02-02-tags.md", Kind::DuplicatePermalink));
        assert!(!report.has("_posts/2020-01-01-good.md", Kind::DuplicatePermalink));
    }

    #[test]
    fn passing_check_means_scan_succeeds() {
        let cases = [
            GOOD.to_string(),
            GOOD.replace("title: Good", "title: \"日本語の記事\""),
            GOOD.replace("2020-01-01 10:00:00 +0000", "\"\""),
            GOOD.replace("tags: [swift]", "tags: [\"日本語\", \"#\"]"),
            GOOD.replace("layout: post", "layout: page\nauthor: me"),
        ];
        for name in ["2020-01-01.md", "2020-01-01-good.md", "good.md"] {
            for text in &cases {
                let tmp = TempDir::new().unwrap();
                write_post(tmp.path(), name, text);
                let report = check(tmp.path()).unwrap();
                let scanned = scan::scan(tmp.path());
                if report.is_ok() {
                    assert!(scanned.is_ok(), "{name}: {text}\n{:?}", scanned.err());
                }
            }
        }
    }

    #[test]
    fn unpublished_duplicates_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "2020-01-01-good.md", GOOD);
        write_post(
            tmp.path(),
            "2020-01-01-Good.markdown",
            &GOOD.replace("published: true", "published: false"),
        );

        let report = check(tmp.path()).unwrap();
        assert!(report.is_ok());
    }

    #[test]
    fn check_without_posts_dir_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(check(tmp.path()), Err(LintError::NoPostsDir(_))));
    }
}

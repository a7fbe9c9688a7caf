//! File name, slug, and permalink conventions.
//!
//! Posts follow the `YYYY-MM-DD-slug.md` naming pattern: a date prefix
//! followed by the URL slug. This module owns every transformation between
//! a post's identity (file name, title, date) and where it lands in the
//! generated site.
//!
//! ## Slugs
//!
//! - `2020-03-28-swiftui-property-wrappers.md` → `swiftui-property-wrappers`
//! - `Combine: Publishers & Subscribers` → `combine-publishers-subscribers`
//! - `Café Apps` → `cafe-apps`
//!
//! ## Permalinks
//!
//! A permalink template like `/:year/:month/:day/:slug/` is filled from the
//! post date and slug. Templates ending with `/` produce `index.html` files
//! inside a directory, so URLs stay extension-free.

use chrono::{Datelike, NaiveDate};

/// Result of parsing a post file stem like `2020-03-28-clean-architecture`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPostName {
    /// Date prefix if present and valid.
    pub date: Option<NaiveDate>,
    /// Slug after the date prefix (already slugified). Empty if date-only.
    /// For undated names, this is the slugified full stem.
    pub slug: String,
}

/// Parse a post file stem following the `YYYY-MM-DD-slug` convention.
///
/// - `"2020-03-28-mvvm-in-swiftui"` → date=2020-03-28, slug="mvvm-in-swiftui"
/// - `"2020-03-28"` → date=2020-03-28, slug=""
/// - `"2020-13-40-broken"` → date=None, slug="2020-13-40-broken"
/// - `"About Me"` → date=None, slug="about-me"
pub fn parse_post_filename(stem: &str) -> ParsedPostName {
    if stem.len() >= 10 && stem.is_char_boundary(10) {
        let (prefix, rest) = stem.split_at(10);
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            let rest = rest.strip_prefix('-').unwrap_or(rest);
            if rest.is_empty() || stem.as_bytes()[10] == b'-' {
                return ParsedPostName {
                    date: Some(date),
                    slug: slugify(rest),
                };
            }
        }
    }
    ParsedPostName {
        date: None,
        slug: slugify(stem),
    }
}

const MAX_SLUG_LEN: usize = 80;

/// Turn arbitrary text into a URL slug.
///
/// - Transliterates common accented Latin letters (`é` → `e`, `ß` → `ss`)
/// - Lowercases ASCII letters
/// - Replaces every run of other characters with a single dash
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        let mapped = transliterate(c);
        for m in mapped.chars() {
            if m.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(m.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
    }

    if slug.len() <= MAX_SLUG_LEN {
        slug
    } else {
        let truncated = &slug[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}

/// Slug for a tag name.
///
/// Uses [`slugify`] when it yields anything. Tags written in scripts with
/// no Latin transliteration (`日本語`, `Swift на русском`) keep their own
/// letters and digits, lowercased and joined by dashes. Empty only when the
/// tag has no letters or digits at all (`#`, `?!`).
pub fn tag_slug(tag: &str) -> String {
    let slug = slugify(tag);
    if !slug.is_empty() {
        return slug;
    }
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in tag.chars().take(MAX_SLUG_LEN) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn transliterate(c: char) -> String {
    let mapped = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' => "A",
        'æ' => "ae",
        'Æ' => "AE",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ñ' | 'ń' => "n",
        'Ñ' | 'Ń' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ß' => "ss",
        'ś' | 'š' => "s",
        'Ś' | 'Š' => "S",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ł' => "l",
        'Ł' => "L",
        _ => return c.to_string(),
    };
    mapped.to_string()
}

/// Fill a permalink template from a post date and slug.
///
/// Supported placeholders: `:year`, `:month`, `:day`, `:slug`, and `:title`
/// (alias of `:slug`). The result always starts with `/`.
pub fn permalink(template: &str, date: NaiveDate, slug: &str) -> String {
    let url = template
        .replace(":year", &format!("{:04}", date.year()))
        .replace(":month", &format!("{:02}", date.month()))
        .replace(":day", &format!("{:02}", date.day()))
        .replace(":slug", slug)
        .replace(":title", slug);

    if url.starts_with('/') {
        url
    } else {
        format!("/{url}")
    }
}

/// URL of index page `page` (1-based).
pub fn page_url(page: usize) -> String {
    if page <= 1 {
        "/".to_string()
    } else {
        format!("/page/{page}/")
    }
}

/// Map a site URL to a file path relative to the output directory.
///
/// - `/2020/03/28/mvvm/` → `2020/03/28/mvvm/index.html`
/// - `/2020/03/28/mvvm.html` → `2020/03/28/mvvm.html`
/// - `/` → `index.html`
pub fn output_path(url: &str) -> String {
    let trimmed = url.trim_start_matches('/');
    if trimmed.is_empty() {
        "index.html".to_string()
    } else if trimmed.ends_with('/') {
        format!("{trimmed}index.html")
    } else if trimmed.ends_with(".html") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/index.html")
    }
}

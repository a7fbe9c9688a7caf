//! # posthouse
//!
//! A minimal static site generator for blogs written as Markdown files with
//! YAML front matter. The posts directory is the data source: every file is a
//! post, its front matter says when and whether it is published, and the
//! build turns each one into a page keyed by date and slug.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! posthouse processes content through two independent stages with a JSON
//! manifest in between:
//!
//! ```text
//! 1. Scan      content/_posts/  →  manifest.json   (files → structured posts)
//! 2. Generate  manifest.json    →  dist/           (final HTML site)
//! ```
//!
//! - **Debuggability**: the manifest is human-readable JSON you can inspect.
//! - **Testability**: scan is a function from files to a manifest, generate a
//!   function from a manifest to files, so each can be exercised alone.
//!
//! Two side commands work on the same content: `check` lints every post
//! (drafts included) without writing anything, and `new` scaffolds a post
//! with a complete front-matter block.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the posts directory, parses front matter, produces the manifest |
//! | [`generate`] | Stage 2: renders post, index, and tag pages with Maud; writes the feed and stylesheet |
//! | [`frontmatter`] | Splits post files, parses YAML front matter and dates, renders new blocks |
//! | [`lint`] | Content integrity checks behind the `check` command |
//! | [`markdown`] | Markdown to HTML, word counts, reading time, excerpts |
//! | [`feed`] | RSS 2.0 feed |
//! | [`cache`] | Content-hash output cache: skips unchanged writes, prunes stale pages |
//! | [`new`] | Post scaffolding |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared types serialized between stages (`Post`, `Tag`) |
//! | [`naming`] | `YYYY-MM-DD-slug` file names, slugs, and permalinks |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Front Matter Is Lenient About Types, Strict About Structure
//!
//! `title: 1984` is a title and `tags: swift, combine` is two tags, but a
//! file without a closed `---` block, or a date that does not parse, stops
//! the build with the file named in the error. Keys outside the schema are
//! kept so `check` can point at them instead of failing the build.
//!
//! ## Published Means Built
//!
//! Scan includes every `published: true` post and generate renders every
//! post in the manifest, so a published post always has a page. Drafts are
//! listed in the manifest's `skipped` list, and their pages from earlier
//! builds are removed by the output cache.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Templates are checked by the compiler, interpolation
//! is escaped by default, and there is no template directory to ship.

pub mod cache;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod generate;
pub mod lint;
pub mod markdown;
pub mod naming;
pub mod new;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

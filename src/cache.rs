//! Output cache for incremental builds.
//!
//! Rendering a few hundred posts is fast; rewriting every file is what makes
//! deploys slow, because sync tools (rsync, S3 uploaders, CDN purges) key on
//! modification times. This module lets the generate stage skip writing any
//! page whose bytes are identical to the previous build.
//!
//! # Design
//!
//! The cache is keyed by **output path** (relative to the output directory)
//! and stores the SHA-256 of the content last written there. A write is
//! skipped when:
//!
//! 1. the manifest has an entry for the path with the same content hash, and
//! 2. the file still exists on disk.
//!
//! Hashing the rendered output rather than the source means template,
//! stylesheet, and config changes invalidate exactly the pages they affect.
//!
//! ## Stale pages
//!
//! Every path written (or confirmed unchanged) during a build is recorded in
//! the new manifest. Paths the previous manifest knew about but this build did
//! not produce belong to posts that were unpublished, renamed, or deleted;
//! [`CacheManifest::prune`] removes them from disk. Files the cache never
//! wrote (copied assets, anything placed by hand) are never touched.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.posthouse-cache.json`, so it
//! travels with the output directory when cached in CI.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `build` or `generate` to rewrite every page. This
//! starts from an empty manifest; stale-page pruning still uses whatever was
//! on disk before.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".posthouse-cache.json";

/// Bump to invalidate all existing caches when the format changes.
const MANIFEST_VERSION: u32 = 1;

/// On-disk cache manifest mapping output paths to content hashes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, String>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let content = match fs::read_to_string(manifest_path(output_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(m) if m.version == MANIFEST_VERSION => m,
            Ok(_) | Err(_) => {
                tracing::debug!("ignoring unreadable or outdated cache manifest");
                Self::empty()
            }
        }
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(manifest_path(output_dir), json)
    }

    /// Whether `rel_path` already holds content with `hash`.
    pub fn is_fresh(&self, rel_path: &str, hash: &str, output_dir: &Path) -> bool {
        self.entries.get(rel_path).is_some_and(|h| h == hash) && output_dir.join(rel_path).exists()
    }

    pub fn insert(&mut self, rel_path: String, hash: String) {
        self.entries.insert(rel_path, hash);
    }

    /// Delete files recorded here but absent from `current`.
    ///
    /// Emptied parent directories are removed up to `output_dir`. Returns the
    /// number of files deleted.
    pub fn prune(&self, current: &CacheManifest, output_dir: &Path) -> io::Result<u32> {
        let mut removed = 0;
        for rel_path in self.entries.keys() {
            if current.entries.contains_key(rel_path) {
                continue;
            }
            let path = output_dir.join(rel_path);
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %rel_path, "removed stale page");
                    removed += 1;
                    remove_empty_parents(&path, output_dir);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }
}

fn remove_empty_parents(path: &Path, output_dir: &Path) {
    let mut dir = path.parent();
    while let Some(d) = dir {
        if d == output_dir || !d.starts_with(output_dir) {
            break;
        }
        // Fails on non-empty directories, which ends the walk.
        if fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }
}

/// SHA-256 of some bytes, returned as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Writes output files through a cache, tracking what changed.
pub struct CachedWriter<'a> {
    output_dir: &'a Path,
    previous: CacheManifest,
    current: CacheManifest,
    pub stats: CacheStats,
}

impl<'a> CachedWriter<'a> {
    pub fn new(output_dir: &'a Path, previous: CacheManifest) -> Self {
        Self {
            output_dir,
            previous,
            current: CacheManifest::empty(),
            stats: CacheStats::default(),
        }
    }

    /// Write `content` to `rel_path` unless the previous build wrote the same bytes.
    pub fn write(&mut self, rel_path: &str, content: &[u8]) -> io::Result<()> {
        let hash = hash_bytes(content);
        if self.previous.is_fresh(rel_path, &hash, self.output_dir) {
            self.stats.unchanged();
        } else {
            let path = self.output_dir.join(rel_path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            self.stats.written();
        }
        self.current.insert(rel_path.to_string(), hash);
        Ok(())
    }

    /// Remove stale pages against `on_disk`, save the new manifest, and return stats.
    pub fn finish(mut self, on_disk: &CacheManifest) -> io::Result<CacheStats> {
        self.stats.removed = on_disk.prune(&self.current, self.output_dir)?;
        self.current.save(self.output_dir)?;
        Ok(self.stats)
    }
}

/// Summary of cache activity for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub written: u32,
    pub unchanged: u32,
    pub removed: u32,
}

impl CacheStats {
    pub fn written(&mut self) {
        self.written += 1;
    }

    pub fn unchanged(&mut self) {
        self.unchanged += 1;
    }

    pub fn total(&self) -> u32 {
        self.written + self.unchanged
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged > 0 {
            write!(
                f,
                "{} written, {} unchanged ({} total)",
                self.written,
                self.unchanged,
                self.total()
            )?;
        } else {
            write!(f, "{} written", self.written)?;
        }
        if self.removed > 0 {
            write!(f, ", {} removed", self.removed)?;
        }
        Ok(())
    }
}

/// Resolve the cache manifest path for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}

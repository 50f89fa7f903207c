//! Output write cache for incremental builds.
//!
//! Rendering every page is cheap, but rewriting every file on every build
//! churns modification times and defeats rsync-style deploys that only upload
//! what changed. This module lets the generate stage skip writes whose bytes
//! are identical to what is already on disk, and remove files a previous
//! build wrote that the current build no longer produces.
//!
//! # Design
//!
//! The cache is keyed by **output path** (relative to the output directory)
//! and stores the SHA-256 of the bytes last written there. A write is skipped
//! when:
//! 1. The path has an entry with the same hash
//! 2. The file on disk still hashes to the same value
//!
//! Content hashes are used instead of mtimes so the cache survives a
//! `git checkout` or a CI restore that resets timestamps.
//!
//! ## Pruning
//!
//! Every path written (or skipped as unchanged) during a run is marked as
//! touched. [`WriteCache::prune`] deletes the files of entries that were not
//! touched, which is how renamed or deleted pages disappear from the output.
//! Files the cache never wrote are left alone.
//!
//! ## Storage
//!
//! The cache manifest is a JSON file at `<output_dir>/.petpedia-cache.json`.
//! It lives alongside the generated site so it travels with the output
//! directory when cached in CI.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to the `build` or `generate` command to force every file
//! to be rewritten. The previous manifest is still loaded so stale files are
//! pruned.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".petpedia-cache.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or hash computation changes.
const MANIFEST_VERSION: u32 = 1;

/// On-disk manifest mapping output paths to the hash of their contents.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WriteCache {
    pub version: u32,
    pub entries: BTreeMap<String, String>,
    /// Paths produced during this run. Never serialized.
    #[serde(skip)]
    touched: BTreeSet<String>,
    /// Rewrite every file regardless of stored hashes.
    #[serde(skip)]
    force: bool,
}

impl WriteCache {
    /// Create an empty manifest (first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
            touched: BTreeSet::new(),
            force: false,
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let content = match fs::read_to_string(manifest_path(output_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Ignore stored hashes for the rest of this run; every write goes to disk.
    pub fn force_rewrite(&mut self) {
        self.force = true;
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(manifest_path(output_dir), json)
    }

    /// Whether `rel_path` already holds exactly these contents.
    ///
    /// The stored hash only short-circuits the check; the bytes on disk are
    /// hashed too, so a hand-edited output is rewritten.
    pub fn is_fresh(&self, output_dir: &Path, rel_path: &str, hash: &str) -> bool {
        !self.force
            && self.entries.get(rel_path).is_some_and(|h| h == hash)
            && hash_file(&output_dir.join(rel_path)).is_ok_and(|h| h == hash)
    }

    /// Write `contents` to `output_dir/rel_path` unless it is unchanged.
    pub fn write(
        &mut self,
        output_dir: &Path,
        rel_path: &str,
        contents: &[u8],
        stats: &mut CacheStats,
    ) -> io::Result<()> {
        let hash = hash_contents(contents);
        if self.is_fresh(output_dir, rel_path, &hash) {
            stats.unchanged += 1;
        } else {
            let path = output_dir.join(rel_path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
            stats.written += 1;
        }
        self.touched.insert(rel_path.to_string());
        self.entries.insert(rel_path.to_string(), hash);
        Ok(())
    }

    /// Delete files recorded by a previous run that this run did not produce.
    ///
    /// Directories left empty by the removal are removed as well.
    pub fn prune(&mut self, output_dir: &Path, stats: &mut CacheStats) -> io::Result<()> {
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|p| !self.touched.contains(*p))
            .cloned()
            .collect();
        for rel_path in stale {
            self.entries.remove(&rel_path);
            let path = output_dir.join(&rel_path);
            if path.exists() {
                fs::remove_file(&path)?;
                stats.removed += 1;
            }
            remove_empty_parents(output_dir, &path);
        }
        Ok(())
    }
}

/// Walk up from a removed file, deleting directories until one is non-empty.
fn remove_empty_parents(output_dir: &Path, path: &Path) {
    let mut dir = path.parent();
    while let Some(d) = dir {
        if d == output_dir || !d.starts_with(output_dir) || fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }
}

/// SHA-256 hash of a byte slice, returned as a hex string.
pub fn hash_contents(contents: &[u8]) -> String {
    format!("{:x}", Sha256::digest(contents))
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    Ok(hash_contents(&fs::read(path)?))
}

/// Summary of cache behaviour for a generate run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub unchanged: u32,
    pub written: u32,
    pub removed: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.unchanged + self.written
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

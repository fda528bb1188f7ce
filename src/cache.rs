//! Sheet cache for incremental batch runs.
//!
//! Rendering a sheet means a Lanczos resize plus a full-page encode, which
//! adds up over a directory of photos. This module lets `batch` skip that
//! work when neither the photo nor anything that shapes the sheet has
//! changed since the last run.
//!
//! ## Records
//!
//! The manifest holds one [`SheetRecord`] per photo, page and standard:
//! which sheet file it produced, the SHA-256 of the photo bytes
//! (`source_hash`) and the SHA-256 of every setting that shapes the pixels
//! (`params_hash`, see [`hash_sheet_params`]).
//!
//! Looking up a sheet gives one of three answers:
//!
//! - **Fresh**: this photo's record for this page and standard still owns
//!   the target file, the hashes match and the file is on disk.
//! - **CopyFrom**: another record has the same hashes and its sheet is on
//!   disk. A renamed photo lands here and its earlier sheet is copied.
//! - **Miss**: draw it.
//!
//! Writing a sheet evicts any other record that claimed the same file, so
//! a record never vouches for a file another photo has overwritten.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.sheet-cache.json`, next to
//! the sheets it describes.
//!
//! ## Bypassing the cache
//!
//! `batch --no-cache` starts from an empty manifest, so every sheet is
//! re-rendered and overwritten.

use crate::catalog::{PageSpec, PhotoStandard};
use crate::config::SheetConfig;
use crate::imaging::Quality;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".sheet-cache.json";

/// Bump to invalidate every existing manifest when the key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// One sheet on disk and what it was drawn from.
///
/// A record is identified by `(source, page, standard)`; at most one record
/// claims any given `sheet` file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct SheetRecord {
    /// Photo path relative to the batch source directory.
    pub source: String,
    /// Resolved page key.
    pub page: String,
    /// Resolved standard key.
    pub standard: String,
    /// Sheet file name within the output directory.
    pub sheet: String,
    pub source_hash: String,
    pub params_hash: String,
}

impl SheetRecord {
    fn same_key(&self, other: &SheetRecord) -> bool {
        self.source == other.source && self.page == other.page && self.standard == other.standard
    }

    fn same_content(&self, other: &SheetRecord) -> bool {
        self.source_hash == other.source_hash && self.params_hash == other.params_hash
    }
}

/// What the cache can do for a sheet about to be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// This photo's sheet for this page and standard is on disk and current.
    Fresh,
    /// An identical sheet exists under another name; copy it.
    CopyFrom(String),
    Miss,
}

/// The `.sheet-cache.json` manifest of one output directory.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SheetCache {
    pub version: u32,
    pub sheets: Vec<SheetRecord>,
}

impl SheetCache {
    /// A cache that knows nothing (first run or `--no-cache`).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            sheets: Vec::new(),
        }
    }

    /// Load the manifest of `output_dir`. A missing, unreadable, corrupt or
    /// outdated manifest loads as empty.
    pub fn load(output_dir: &Path) -> Self {
        std::fs::read_to_string(manifest_path(output_dir))
            .ok()
            .and_then(|json| serde_json::from_str::<Self>(&json).ok())
            .filter(|cache| cache.version == MANIFEST_VERSION)
            .unwrap_or_else(Self::empty)
    }

    /// Write the manifest, dropping records whose sheet file is gone.
    pub fn save(&mut self, output_dir: &Path) -> io::Result<()> {
        self.sheets.retain(|r| output_dir.join(&r.sheet).is_file());
        self.sheets.sort_by(|a, b| {
            (&a.source, &a.page, &a.standard).cmp(&(&b.source, &b.page, &b.standard))
        });
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// Decide how to produce `wanted` in `output_dir`.
    ///
    /// `Fresh` needs a record for the same photo, page and standard that
    /// still owns the target file with unchanged hashes. Otherwise any
    /// record with the same hashes and a sheet still on disk can be copied.
    pub fn lookup(&self, wanted: &SheetRecord, output_dir: &Path) -> Lookup {
        let on_disk = |r: &SheetRecord| output_dir.join(&r.sheet).is_file();

        let fresh = self.sheets.iter().any(|r| {
            r.same_key(wanted) && r.sheet == wanted.sheet && r.same_content(wanted) && on_disk(r)
        });
        if fresh {
            return Lookup::Fresh;
        }

        self.sheets
            .iter()
            .find(|r| r.same_content(wanted) && r.sheet != wanted.sheet && on_disk(r))
            .map_or(Lookup::Miss, |r| Lookup::CopyFrom(r.sheet.clone()))
    }

    /// Record a sheet that was just written. Replaces the record for the
    /// same photo, page and standard, and any record that claimed the same
    /// file, since that file now holds this sheet.
    pub fn record(&mut self, record: SheetRecord) {
        self.sheets
            .retain(|r| !r.same_key(&record) && r.sheet != record.sheet);
        self.sheets.push(record);
    }
}

/// SHA-256 of a byte buffer as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of every setting that shapes a sheet's pixels.
///
/// Catalog keys and labels are not hashed; two keys with the
/// same dimensions produce the same sheet.
pub fn hash_sheet_params(page: &PageSpec, standard: &PhotoStandard, config: &SheetConfig) -> String {
    let style = config.render_style();
    let layout = &config.layout;

    let mut hasher = Sha256::new();
    hasher.update(b"sheet\0");
    for v in [
        page.width_px,
        page.height_px,
        standard.width_px,
        standard.height_px,
        layout.margin,
        layout.gap,
        layout.minimum_acceptable,
        style.guides.width,
        style.guides.dash,
        style.guides.gap,
    ] {
        hasher.update(v.to_le_bytes());
    }
    hasher.update(style.background);
    hasher.update(style.guides.color);
    hasher.update(config.output.format.extension().as_bytes());
    hasher.update(b"\0");
    hasher.update(Quality::new(config.output.quality).value().to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.hits > 0 {
            parts.push(format!("{} cached", self.hits));
        }
        if self.copies > 0 {
            parts.push(format!("{} copied", self.copies));
        }
        parts.push(format!("{} rendered", self.misses));
        write!(f, "{}", parts.join(", "))?;
        if parts.len() > 1 {
            write!(f, " ({} total)", self.total())?;
        }
        Ok(())
    }
}

/// Resolve the cache manifest path for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}

//! Render a print sheet for every photo in a directory.
//!
//! One page and one photo standard apply to the whole batch, so the layout
//! is planned once and every photo goes through the same
//! [`generate_print_sheet_with`] pipeline in parallel.
//!
//! ## Output Structure
//!
//! ```text
//! photos/                 sheets/
//! ├── anna.jpg       →    ├── anna-4x6_L.jpg
//! ├── ben.png        →    ├── ben-4x6_L.jpg
//! └── family/             ├── family-cleo-4x6_L.jpg   (with --recursive)
//!     └── cleo.jpg        └── .sheet-cache.json
//! ```
//!
//! Photos whose sheets would share a name (`anna.jpg` and `anna.png`) keep
//! their source extension in it: `anna-jpg-4x6_L.jpg`, `anna-png-4x6_L.jpg`.
//!
//! A photo that fails to decode or write is reported and counted; the rest
//! of the batch carries on.
//!
//! ## Parallel Processing
//!
//! Photos are rendered with [rayon](https://docs.rs/rayon). The caller
//! sizes the global pool (see `processing.max_processes`). Progress arrives
//! as [`BatchEvent`]s over an optional channel, in completion order.

use crate::cache::{self, CacheStats, Lookup, SheetCache, SheetRecord};
use crate::config::SheetConfig;
use crate::imaging::{RustBackend, SheetBackend, is_supported_photo};
use crate::sheet::{SheetLayout, generate_print_sheet_with, plan_print_sheet};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read source directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to save cache manifest: {0}")]
    Cache(std::io::Error),
}

/// What to render for each photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub page_key: String,
    pub standard_key: String,
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl BatchRequest {
    pub fn new(page_key: impl Into<String>, standard_key: impl Into<String>) -> Self {
        Self {
            page_key: page_key.into(),
            standard_key: standard_key.into(),
            recursive: false,
        }
    }
}

/// How a sheet came to be on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetStatus {
    /// Already present from an earlier run.
    Cached,
    /// Same content rendered earlier under another name; copied.
    Copied,
    Rendered,
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        photo_count: usize,
        page: String,
        standard: String,
        cells: usize,
        /// The requested page key, when it was unknown and `page` is the fallback.
        unknown_page: Option<String>,
        /// The requested standard key, when it was unknown.
        unknown_standard: Option<String>,
    },
    SheetRendered {
        /// 1-based position in the sorted photo list.
        index: usize,
        source: String,
        output: String,
        status: SheetStatus,
    },
    SheetFailed {
        index: usize,
        source: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSheet {
    pub source: PathBuf,
    pub output: PathBuf,
    pub status: SheetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub source: PathBuf,
    pub error: String,
}

/// Result of a batch run. Sheets and failures keep photo order.
#[derive(Debug)]
pub struct BatchReport {
    pub layout: SheetLayout,
    pub sheets: Vec<BatchSheet>,
    pub failures: Vec<BatchFailure>,
    pub cache_stats: CacheStats,
}

/// Supported photos in `source_dir`, sorted by path.
///
/// `skip` (typically the output directory) is never descended into, so
/// sheets written next to their photos are not picked up as input. It is
/// matched by canonical path, so `./photos/sheets` skips `photos/sheets`.
pub fn collect_photos(
    source_dir: &Path,
    recursive: bool,
    skip: Option<&Path>,
) -> Result<Vec<PathBuf>, BatchError> {
    // A skip directory that does not exist yet has nothing to skip
    let skip = skip.and_then(|s| std::fs::canonicalize(s).ok());
    let walker = WalkDir::new(source_dir)
        .follow_links(false)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 });

    let mut photos = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| {
        !(e.file_type().is_dir()
            && skip
                .as_deref()
                .is_some_and(|s| std::fs::canonicalize(e.path()).is_ok_and(|p| p.as_path() == s)))
    }) {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_photo(entry.path()) {
            photos.push(entry.into_path());
        }
    }
    photos.sort();
    Ok(photos)
}

/// Relative path without its extension, directories joined with `-`.
fn joined_stem(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("-")
}

/// Sheet file name for a photo: `{stem}-{page_key}.{ext}`.
///
/// Photos in subdirectories keep their relative path, joined with `-`.
pub fn sheet_filename(relative: &Path, page_key: &str, extension: &str) -> String {
    format!("{}-{}.{}", joined_stem(relative), page_key, extension)
}

/// Sheet file names for `relative` photo paths, in order.
///
/// Photos whose plain names collide keep their source extension
/// (`anna-jpg-4x6_L.jpg`). A name still taken after that is an error for
/// every photo but the first to claim it.
pub fn sheet_filenames(
    relative: &[&Path],
    page_key: &str,
    extension: &str,
) -> Vec<Result<String, String>> {
    let plain: Vec<String> = relative
        .iter()
        .map(|r| sheet_filename(r, page_key, extension))
        .collect();
    let mut uses: HashMap<&str, usize> = HashMap::new();
    for name in &plain {
        *uses.entry(name.as_str()).or_default() += 1;
    }

    let names: Vec<String> = relative
        .iter()
        .zip(&plain)
        .map(|(r, name)| match r.extension() {
            Some(ext) if uses[name.as_str()] > 1 => format!(
                "{}-{}-{}.{}",
                joined_stem(r),
                ext.to_string_lossy(),
                page_key,
                extension
            ),
            _ => name.clone(),
        })
        .collect();

    let mut claimed: HashMap<&str, &Path> = HashMap::new();
    names
        .iter()
        .zip(relative)
        .map(|(name, r)| match claimed.get(name.as_str()) {
            Some(first) => Err(format!(
                "sheet name {} is already used by {}",
                name,
                first.display()
            )),
            None => {
                claimed.insert(name.as_str(), *r);
                Ok(name.clone())
            }
        })
        .collect()
}

pub fn render_directory(
    source_dir: &Path,
    output_dir: &Path,
    request: &BatchRequest,
    config: &SheetConfig,
    use_cache: bool,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    render_directory_with(
        &RustBackend::new(),
        source_dir,
        output_dir,
        request,
        config,
        use_cache,
        events,
    )
}

/// Render a directory using a specific backend (allows testing with mock).
pub fn render_directory_with(
    backend: &impl SheetBackend,
    source_dir: &Path,
    output_dir: &Path,
    request: &BatchRequest,
    config: &SheetConfig,
    use_cache: bool,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let photos = collect_photos(source_dir, request.recursive, Some(output_dir))?;
    std::fs::create_dir_all(output_dir)?;

    let layout = plan_print_sheet(config, &request.page_key, &request.standard_key);
    let page_key = layout.page.entry.key.clone();
    let standard_key = layout.standard.entry.key.clone();
    let extension = config.output.format.extension();
    let params_hash = cache::hash_sheet_params(&layout.page.entry, &layout.standard.entry, config);

    if let Some(tx) = &events {
        tx.send(BatchEvent::Started {
            photo_count: photos.len(),
            page: page_key.clone(),
            standard: standard_key.clone(),
            cells: layout.cells.len(),
            unknown_page: layout.page.fell_back.then(|| layout.page.requested.clone()),
            unknown_standard: layout
                .standard
                .fell_back
                .then(|| layout.standard.requested.clone()),
        })
        .ok();
    }

    let relative: Vec<&Path> = photos
        .iter()
        .map(|p| p.strip_prefix(source_dir).unwrap_or(p))
        .collect();
    let names = sheet_filenames(&relative, &page_key, extension);

    let sheet_cache = Mutex::new(if use_cache {
        SheetCache::load(output_dir)
    } else {
        SheetCache::empty()
    });
    let stats = Mutex::new(CacheStats::default());

    let outcomes: Vec<Result<BatchSheet, BatchFailure>> = photos
        .par_iter()
        .zip(relative.par_iter())
        .zip(names.par_iter())
        .enumerate()
        .map(|(i, ((source, relative), name))| {
            let outcome = name.clone().and_then(|output_name| {
                let wanted = SheetRecord {
                    source: relative.to_string_lossy().into_owned(),
                    page: page_key.clone(),
                    standard: standard_key.clone(),
                    sheet: output_name,
                    source_hash: String::new(),
                    params_hash: params_hash.clone(),
                };
                render_one(
                    backend,
                    config,
                    request,
                    source,
                    output_dir,
                    wanted,
                    &sheet_cache,
                    &stats,
                )
            });

            if let Some(tx) = &events {
                let event = match &outcome {
                    Ok(sheet) => BatchEvent::SheetRendered {
                        index: i + 1,
                        source: relative.display().to_string(),
                        output: sheet
                            .output
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        status: sheet.status,
                    },
                    Err(error) => BatchEvent::SheetFailed {
                        index: i + 1,
                        source: relative.display().to_string(),
                        error: error.clone(),
                    },
                };
                tx.send(event).ok();
            }

            outcome.map_err(|error| BatchFailure {
                source: source.clone(),
                error,
            })
        })
        .collect();

    let mut sheet_cache = sheet_cache.into_inner().unwrap_or_else(|e| e.into_inner());
    sheet_cache.save(output_dir).map_err(BatchError::Cache)?;

    let mut sheets = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(sheet) => sheets.push(sheet),
            Err(failure) => failures.push(failure),
        }
    }

    Ok(BatchReport {
        layout,
        sheets,
        failures,
        cache_stats: stats.into_inner().unwrap_or_else(|e| e.into_inner()),
    })
}

/// Produce one sheet, from cache when possible. `wanted` arrives without a
/// source hash; it is filled in once the photo is read. Errors are rendered
/// to strings so they can travel in events and reports.
#[allow(clippy::too_many_arguments)]
fn render_one(
    backend: &impl SheetBackend,
    config: &SheetConfig,
    request: &BatchRequest,
    source: &Path,
    output_dir: &Path,
    mut wanted: SheetRecord,
    sheet_cache: &Mutex<SheetCache>,
    stats: &Mutex<CacheStats>,
) -> Result<BatchSheet, String> {
    let bytes = std::fs::read(source).map_err(|e| e.to_string())?;
    wanted.source_hash = cache::hash_bytes(&bytes);
    let output_path = output_dir.join(&wanted.sheet);

    let found = lock(sheet_cache).lookup(&wanted, output_dir);
    let status = match found {
        Lookup::Fresh => {
            lock(stats).hit();
            SheetStatus::Cached
        }
        Lookup::CopyFrom(stored) => {
            std::fs::copy(output_dir.join(&stored), &output_path).map_err(|e| e.to_string())?;
            lock(stats).copy();
            SheetStatus::Copied
        }
        Lookup::Miss => {
            let sheet = generate_print_sheet_with(
                backend,
                config,
                &bytes,
                &request.page_key,
                &request.standard_key,
            )
            .map_err(|e| e.to_string())?;
            std::fs::write(&output_path, &sheet.bytes).map_err(|e| e.to_string())?;
            lock(stats).miss();
            SheetStatus::Rendered
        }
    };

    lock(sheet_cache).record(wanted);

    Ok(BatchSheet {
        source: source.to_path_buf(),
        output: output_path,
        status,
    })
}

/// A worker that panicked mid-update leaves plain counters and maps behind,
/// which are still usable.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

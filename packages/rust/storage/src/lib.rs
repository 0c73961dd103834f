//! JSON collection storage for the current snapshot and the archive.
//!
//! Both collections are plain JSON arrays on disk. The [`JsonStore`] struct
//! pairs the two paths used by a run.
//!
//! **File conventions:**
//! - A missing file reads as an empty collection
//! - Writes are full rewrites, 4-space indented, UTF-8 with non-ASCII kept
//!   literally, no trailing newline

use std::path::{Path, PathBuf};

use internwatch_shared::{InternwatchError, Posting, RawPosting, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

const INDENT: &[u8] = b"    ";

/// The pair of collections a sync run reads and rewrites.
#[derive(Debug, Clone)]
pub struct JsonStore {
    current: PathBuf,
    archive: PathBuf,
}

impl JsonStore {
    pub fn new(current: impl Into<PathBuf>, archive: impl Into<PathBuf>) -> Self {
        Self {
            current: current.into(),
            archive: archive.into(),
        }
    }

    pub fn current_path(&self) -> &Path {
        &self.current
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Previously published snapshot, empty if never written.
    pub fn load_current(&self) -> Result<Vec<RawPosting>> {
        load_collection(&self.current)
    }

    /// Accumulated history, empty if never written.
    pub fn load_archive(&self) -> Result<Vec<RawPosting>> {
        load_collection(&self.archive)
    }

    pub fn save_current(&self, postings: &[Posting]) -> Result<()> {
        save_collection(&self.current, postings)
    }

    pub fn save_archive(&self, postings: &[Posting]) -> Result<()> {
        save_collection(&self.archive, postings)
    }
}

// ---------------------------------------------------------------------------
// Collection I/O
// ---------------------------------------------------------------------------

/// Read a JSON array of objects from `path`.
///
/// A missing file is not an error and yields an empty collection. Any other
/// read failure, invalid JSON, or a non-array document is.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_collection(path: &Path) -> Result<Vec<RawPosting>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("collection file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(InternwatchError::io(path, e)),
    };

    let value: Value = serde_json::from_str(&content).map_err(|e| {
        InternwatchError::parse(format!("invalid JSON in {}: {e}", path.display()))
    })?;

    let Value::Array(items) = value else {
        return Err(InternwatchError::validation(format!(
            "{} does not contain a JSON array",
            path.display()
        )));
    };

    let records: Vec<RawPosting> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    debug!(count = records.len(), "collection loaded");
    Ok(records)
}

/// Rewrite `path` with `records`, creating parent directories as needed.
#[instrument(skip_all, fields(path = %path.display(), count = records.len()))]
pub fn save_collection<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = to_pretty_json(records)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| InternwatchError::io(parent, e))?;
        }
    }

    std::fs::write(path, json).map_err(|e| InternwatchError::io(path, e))?;
    debug!("wrote JSON collection");
    Ok(())
}

/// Serialize with a 4-space indent. `serde_json` never escapes non-ASCII.
pub fn to_pretty_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut ser).map_err(|e| {
        InternwatchError::validation(format!("JSON serialization failed: {e}"))
    })?;

    String::from_utf8(buf)
        .map_err(|e| InternwatchError::validation(format!("serializer produced invalid UTF-8: {e}")))
}

//! Whole-file JSON read/write helpers
//!
//! Every store in this crate is a single JSON document that is loaded fully
//! and rewritten wholesale on each mutation.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::common::errors::Result;

/// Read and parse a JSON document
///
/// Returns `Ok(None)` when the file does not exist. Unreadable or corrupt
/// files are reported as errors so callers can decide how to degrade.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = fs::File::open(path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    debug!("Loaded JSON document from {}", path.display());
    Ok(Some(value))
}

/// Serialize `value` as pretty JSON, replacing any existing file
///
/// Parent directories are created as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    debug!("Wrote JSON document to {}", path.display());
    Ok(())
}

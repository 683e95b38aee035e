//! JSON record storage
//!
//! Records are written pretty-printed; missing parent directories are created.

use crate::output::records::{CrawlData, TransformData};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the report record in an output directory
pub const REPORT_FILE: &str = "report.json";

/// File name of the data record in an output directory
pub const DATA_FILE: &str = "data.json";

/// Errors that can occur while reading or writing records
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads a JSON record from disk
///
/// # Arguments
///
/// * `path` - Path to the JSON file
///
/// # Returns
///
/// * `Ok(T)` - The deserialized record
/// * `Err(StorageError)` - The file is missing, unreadable or malformed
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a record to disk as pretty-printed JSON
///
/// Parent directories are created if missing and an existing file is replaced.
pub fn write_record<T: Serialize + ?Sized>(path: &Path, record: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(record).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "Wrote record");
    Ok(())
}

/// Writes `report.json` and `data.json` for a crawl into `dir`
pub fn write_crawl_output(dir: &Path, data: &CrawlData) -> Result<(), StorageError> {
    write_record(&dir.join(REPORT_FILE), &data.report)?;
    write_record(&dir.join(DATA_FILE), data)
}

/// Writes `report.json` and `data.json` for a transform into `dir`
pub fn write_transform_output(dir: &Path, data: &TransformData) -> Result<(), StorageError> {
    write_record(&dir.join(REPORT_FILE), &data.report)?;
    write_record(&dir.join(DATA_FILE), data)
}

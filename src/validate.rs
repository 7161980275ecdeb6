use std::{fs, fs::File, path::Path};

use csv::{Reader, ReaderBuilder};
use tracing::debug;

use crate::error::{Result, TimeDiffError};
use crate::process::raw_table::{START_COLUMN, STOP_COLUMN};

/// Checks that `path` names a non-empty `.csv` file whose first two header
/// columns are exactly `start_time` and `stop_time`.
///
/// The reader used for the header check is handed back, positioned after the
/// header, so the loader never reopens the file.
pub fn check_input(path: &Path) -> Result<Reader<File>> {
    if !path.exists() {
        return Err(TimeDiffError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let meta = fs::metadata(path).map_err(|source| TimeDiffError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(TimeDiffError::invalid(path, "not a regular file"));
    }
    let named_csv = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".csv"));
    if !named_csv {
        return Err(TimeDiffError::invalid(path, "extension is not .csv"));
    }
    if meta.len() == 0 {
        return Err(TimeDiffError::invalid(path, "file is empty"));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| TimeDiffError::invalid(path, e.to_string()))?;
    let headers = rdr
        .headers()
        .map_err(|e| TimeDiffError::invalid(path, format!("unreadable header: {e}")))?;

    match (headers.get(0), headers.get(1)) {
        (Some(START_COLUMN), Some(STOP_COLUMN)) => {
            debug!(columns = headers.len(), "header accepted");
        }
        _ => {
            return Err(TimeDiffError::invalid(
                path,
                format!("header must start with {START_COLUMN},{STOP_COLUMN}"),
            ))
        }
    }
    Ok(rdr)
}

// src/process/mod.rs
pub mod duration;
pub mod normalize;
pub mod raw_table;

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{Reader, WriterBuilder};
use tracing::{debug, info};

use crate::error::{Result, TimeDiffError};
use crate::validate::check_input;
use duration::append_diff_column;
use normalize::{normalize_table, NormalizeReport};
use raw_table::RawTable;

#[derive(Debug)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows_written: usize,
    pub report: NormalizeReport,
}

/// Reads the rest of an open CSV reader into memory. Empty cells and cells
/// missing from short rows are loaded as missing; rows wider than the header
/// make the file invalid. `path` is only used for error reporting.
#[tracing::instrument(level = "info", skip(rdr, path), fields(path = %path.display()))]
pub fn load_table<R: Read>(mut rdr: Reader<R>, path: &Path) -> Result<RawTable> {
    let csv_err = |source| TimeDiffError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(String::from)
        .collect();
    let width = headers.len();
    let mut table = RawTable::new(headers);

    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_err)?;
        if record.len() > width {
            return Err(TimeDiffError::invalid(
                path,
                format!(
                    "record {} has {} fields, header has {}",
                    idx + 1,
                    record.len(),
                    width
                ),
            ));
        }
        let mut row: Vec<_> = record
            .iter()
            .map(|s| (!s.is_empty()).then(|| s.to_string()))
            .collect();
        row.resize(width, None);
        table.rows.push(row);
    }

    info!(rows = table.len(), columns = width, "loaded table");
    Ok(table)
}

/// `<dir>/<stem>_diff.csv` next to the input.
pub fn output_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_diff.csv"))
}

/// Writes headers and rows, overwriting `path`. Missing cells are written empty.
pub fn write_table(table: &RawTable, path: &Path) -> Result<()> {
    let csv_err = |source| TimeDiffError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = WriterBuilder::new().from_path(path).map_err(csv_err)?;
    wtr.write_record(&table.headers).map_err(csv_err)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or_default()))
            .map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| TimeDiffError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(rows = table.len(), path = %path.display(), "wrote table");
    Ok(())
}

/// Validate, load, normalize, compute `diff_time` and write `<stem>_diff.csv`.
#[tracing::instrument(level = "info", skip(input), fields(input = %input.display()))]
pub fn run(input: &Path) -> Result<RunSummary> {
    let rdr = check_input(input)?;
    let table = load_table(rdr, input)?;

    let (mut table, report) = normalize_table(table);
    if report.total_dropped() > 0 {
        info!(
            dropped = report.total_dropped(),
            kept = report.output_rows(),
            "rows dropped during normalization"
        );
    }
    if table.is_empty() {
        debug!("no rows survived normalization; writing header only");
    }

    append_diff_column(&mut table)?;

    let output = output_path_for(input);
    write_table(&table, &output)?;

    Ok(RunSummary {
        output,
        rows_written: table.len(),
        report,
    })
}

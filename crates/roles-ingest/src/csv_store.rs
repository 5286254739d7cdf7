use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use roles_model::table::{insert_column_into, set_cell_in};
use roles_model::{CellValue, SiftError, TabularStore};

/// A delimited file held in memory as typed rows.
///
/// No row is treated as a header here; header discovery belongs to the
/// column resolver.
#[derive(Debug, Clone)]
pub struct CsvStore {
    pub rows: Vec<Vec<CellValue>>,
    output: PathBuf,
}

impl CsvStore {
    /// Read every non-blank record of `path`. `save` writes back to `path`
    /// unless redirected with [`CsvStore::with_output`].
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("read csv: {}", path.display()))?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("read record: {}", path.display()))?;
            if record.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(CellValue::from_raw).collect());
        }
        debug!(path = %path.display(), rows = rows.len(), "csv loaded");
        Ok(Self {
            rows,
            output: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl TabularStore for CsvStore {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    fn insert_column(&mut self, position: usize) {
        insert_column_into(&mut self.rows, position);
    }

    fn delete_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    fn append_row(&mut self, cells: Vec<CellValue>) {
        self.rows.push(cells);
    }

    fn set_cell(&mut self, row: usize, column: usize, value: CellValue) {
        set_cell_in(&mut self.rows, row, column, value);
    }

    fn save(&mut self) -> roles_model::Result<()> {
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&self.output)
            .map_err(|error| SiftError::Store(format!("{}: {error}", self.output.display())))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(ToString::to_string))
                .map_err(|error| SiftError::Store(error.to_string()))?;
        }
        writer.flush()?;
        debug!(path = %self.output.display(), rows = self.rows.len(), "csv saved");
        Ok(())
    }
}

/// `roles.csv` becomes `roles_out.csv` next to it.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("csv");
    input.with_file_name(format!("{stem}_out.{extension}"))
}

#![deny(unsafe_code)]

use crate::cell::CellValue;
use crate::error::Result;

/// Row-oriented table the passes read and update in place.
///
/// Rows may be ragged; reading past the end of a row yields an empty cell.
pub trait TabularStore {
    fn row_count(&self) -> usize;

    fn row(&self, index: usize) -> Option<&[CellValue]>;

    /// Insert an empty column so that it lands at `position` in every row.
    fn insert_column(&mut self, position: usize);

    fn delete_row(&mut self, index: usize);

    /// Add a row after the last one.
    fn append_row(&mut self, cells: Vec<CellValue>);

    fn set_cell(&mut self, row: usize, column: usize, value: CellValue);

    fn save(&mut self) -> Result<()>;

    fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.row(row).and_then(|cells| cells.get(column))
    }
}

/// Plain in-memory table; `save` is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    pub rows: Vec<Vec<CellValue>>,
}

impl MemoryTable {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Build from text cells; blank strings become `Empty`.
    pub fn from_text<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|value| {
                        let value = value.as_ref();
                        if value.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::text(value)
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }
}

impl TabularStore for MemoryTable {
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

    fn save(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared column insertion for vector-backed stores; short rows are padded.
pub fn insert_column_into(rows: &mut [Vec<CellValue>], position: usize) {
    for row in rows.iter_mut() {
        if row.len() < position {
            row.resize(position, CellValue::Empty);
        }
        row.insert(position, CellValue::Empty);
    }
}

/// Shared cell write for vector-backed stores; grows the row as needed.
pub fn set_cell_in(rows: &mut [Vec<CellValue>], row: usize, column: usize, value: CellValue) {
    let Some(cells) = rows.get_mut(row) else {
        return;
    };
    if cells.len() <= column {
        cells.resize(column + 1, CellValue::Empty);
    }
    cells[column] = value;
}

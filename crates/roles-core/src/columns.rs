//! Header discovery and logical column positions.
//!
//! A [`ColumnIndex`] owns every header-name to position mapping for one
//! table. Inserting a physical column goes through
//! [`ColumnIndex::shift_indexes_after_insert`] so that no resolved position
//! goes stale.

use std::collections::BTreeMap;

use tracing::debug;

use roles_model::{CellValue, ColumnRequirement, HeaderMarker, Result, SiftError, TabularStore};

use crate::run_context::RunContext;

/// Rows searched for the header marker.
pub const HEADER_SCAN_LIMIT: usize = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    positions: BTreeMap<String, usize>,
    header_row: usize,
}

impl ColumnIndex {
    /// Locate the header row and index its non-blank headers.
    ///
    /// Without a marker the first row is the header. With one, the first of
    /// the leading [`HEADER_SCAN_LIMIT`] rows holding the marker text at the
    /// marker position is the header.
    pub fn resolve(store: &dyn TabularStore, marker: Option<&HeaderMarker>) -> Result<Self> {
        let header_row = match marker {
            Some(marker) if !marker.marker.is_empty() => find_header_row(store, marker)?,
            _ => 0,
        };
        let header = store.row(header_row).unwrap_or_default();
        let index = Self::from_header(header, header_row);
        debug!(header_row, columns = index.len(), "column headers resolved");
        Ok(index)
    }

    /// Index a header row. A repeated header maps to its last position.
    pub fn from_header(header: &[CellValue], header_row: usize) -> Self {
        let positions = header
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_blank())
            .map(|(position, cell)| (cell.to_string().trim().to_string(), position))
            .collect();
        Self {
            positions,
            header_row,
        }
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    pub fn first_data_row(&self) -> usize {
        self.header_row + 1
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Position of `column`, or [`SiftError::MissingColumn`] naming `option`.
    pub fn require(&self, column: &str, option: &str) -> Result<usize> {
        self.position(column)
            .ok_or_else(|| SiftError::MissingColumn {
                column: column.to_string(),
                option: option.to_string(),
            })
    }

    pub fn require_all(&self, requirements: &[ColumnRequirement]) -> Result<()> {
        for requirement in requirements {
            self.require(&requirement.column, &requirement.source)?;
        }
        Ok(())
    }

    pub fn register(&mut self, column: impl Into<String>, position: usize) {
        self.positions.insert(column.into(), position);
    }

    /// Move every position at or past `position` one column right.
    pub fn shift_indexes_after_insert(&mut self, position: usize) {
        for index in self.positions.values_mut() {
            if *index >= position {
                *index += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.positions
            .iter()
            .map(|(column, position)| (column.as_str(), *position))
    }
}

/// Return the position of `column`, inserting it right of `anchor` first
/// when the header does not have it.
pub fn ensure_column(
    store: &mut dyn TabularStore,
    columns: &mut ColumnIndex,
    column: &str,
    anchor: usize,
    run: &mut RunContext<'_>,
) -> usize {
    if let Some(position) = columns.position(column) {
        return position;
    }
    let position = anchor + 1;
    store.insert_column(position);
    store.set_cell(columns.header_row(), position, CellValue::text(column));
    columns.shift_indexes_after_insert(position);
    columns.register(column, position);
    debug!(column, position, "column inserted");
    run.report(format!("Inserting \"{column}\" column."));
    position
}

fn find_header_row(store: &dyn TabularStore, marker: &HeaderMarker) -> Result<usize> {
    let scanned = store.row_count().min(HEADER_SCAN_LIMIT);
    (0..scanned)
        .find(|&row| {
            store
                .cell(row, marker.position)
                .is_some_and(|cell| cell.to_string().trim() == marker.marker)
        })
        .ok_or_else(|| SiftError::HeaderNotFound {
            marker: marker.marker.clone(),
            position: marker.position,
            scanned,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_ignores_blank_cells() {
        let header = [
            CellValue::text("Request #"),
            CellValue::Empty,
            CellValue::text(" Title "),
        ];
        let index = ColumnIndex::from_header(&header, 0);
        assert_eq!(index.position("Request #"), Some(0));
        assert_eq!(index.position("Title"), Some(2));
        assert_eq!(index.len(), 2);
    }
}

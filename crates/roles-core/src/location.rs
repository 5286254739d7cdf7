//! Location resolution and co-location proximity checks.
//!
//! Two independent jobs live here:
//!
//! - [`CategoryResolver`] turns a raw project location (possibly several
//!   values joined with `|`) into a My Location category, using a location
//!   directory and a rank table to pick the nearest value.
//! - [`ProximityComparator`] decides whether a row's My Location is too far
//!   from its co-location requirement, given the two rank tables a
//!   `location` rule names.
//!
//! In both, a lower rank means closer.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use roles_model::{
    CellValue, NON_CATEGORY, RankTable, Reporter, Result, SiftError, TabularStore,
    UNKNOWN_CATEGORY,
};

/// Unresolved My Location values tolerated in one run before it fails.
pub const UNRESOLVED_LOCATION_LIMIT: usize = 10;

/// Separator between the values of a multi-valued location cell.
pub const MULTI_VALUE_SEPARATOR: char = '|';

/// Raw location text to My Location category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationDirectory {
    entries: BTreeMap<String, String>,
}

impl LocationDirectory {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Read a two-column table: raw location, then category.
    ///
    /// The first row is a header. Rows with a blank first cell are skipped.
    pub fn from_store(store: &dyn TabularStore) -> Self {
        let mut entries = BTreeMap::new();
        for index in 1..store.row_count() {
            let Some(key) = store.cell(index, 0).and_then(cell_label) else {
                continue;
            };
            let category = store
                .cell(index, 1)
                .map(ToString::to_string)
                .unwrap_or_default();
            entries.insert(key, category.trim().to_string());
        }
        debug!(entries = entries.len(), "location directory loaded");
        Self { entries }
    }

    pub fn lookup(&self, location: &str) -> Option<&str> {
        self.entries.get(location).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves project locations to categories and counts what it saw.
#[derive(Debug)]
pub struct CategoryResolver<'a> {
    directory: &'a LocationDirectory,
    compare: &'a RankTable,
    /// Values that resolved, including blanks resolved to `Non`.
    pub matched: usize,
    /// Extra values found in multi-valued cells.
    pub multi: usize,
    unresolved: Vec<String>,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(directory: &'a LocationDirectory, compare: &'a RankTable) -> Self {
        Self {
            directory,
            compare,
            matched: 0,
            multi: 0,
            unresolved: Vec::new(),
        }
    }

    /// Category for a raw location.
    ///
    /// Blank input resolves to `Non`. A multi-valued input resolves to the
    /// part with the lowest rank; on equal ranks the earlier part wins, and
    /// parts missing from the rank table sort after every ranked part.
    pub fn resolve_category(&mut self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            self.matched += 1;
            return NON_CATEGORY.to_string();
        }
        if !raw.contains(MULTI_VALUE_SEPARATOR) {
            return self.resolve_single(raw);
        }

        let parts: Vec<&str> = raw.split(MULTI_VALUE_SEPARATOR).collect();
        self.multi += parts.len() - 1;
        let mut nearest: Option<(String, u32)> = None;
        for part in parts.into_iter().map(str::trim).filter(|part| !part.is_empty()) {
            let category = self.resolve_single(part);
            let rank = self
                .compare
                .rank(&category)
                .unwrap_or_else(|| self.compare.unranked());
            if nearest.as_ref().is_none_or(|(_, best)| rank < *best) {
                nearest = Some((category, rank));
            }
        }
        nearest.map_or_else(|| UNKNOWN_CATEGORY.to_string(), |(category, _)| category)
    }

    /// Same as [`Self::resolve_category`], reading the raw value from a cell.
    pub fn resolve_cell(&mut self, cell: &CellValue) -> String {
        self.resolve_category(&cell.to_string())
    }

    /// Unique unresolved locations, in first-seen order.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    pub fn into_unresolved(self) -> Vec<String> {
        self.unresolved
    }

    fn resolve_single(&mut self, location: &str) -> String {
        if let Some(category) = self.directory.lookup(location) {
            self.matched += 1;
            return category.to_string();
        }
        if !self.unresolved.iter().any(|seen| seen == location) {
            debug!(location, "location not in directory");
            self.unresolved.push(location.to_string());
        }
        UNKNOWN_CATEGORY.to_string()
    }
}

/// Compares co-location requirements against My Location for one run.
///
/// Counts unresolved My Location values across the run and fails once the
/// count passes the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityComparator {
    unresolved: usize,
    limit: usize,
}

impl Default for ProximityComparator {
    fn default() -> Self {
        Self::with_limit(UNRESOLVED_LOCATION_LIMIT)
    }
}

impl ProximityComparator {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            unresolved: 0,
            limit,
        }
    }

    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// Whether My Location is farther than the co-location requirement allows.
    ///
    /// `true` only when both values resolve and My Location's rank is
    /// strictly greater than the co-location rank. An unresolved co-location
    /// is reported and treated as not too far. An unresolved My Location is
    /// reported, counted, and treated as not too far until the count exceeds
    /// the limit, at which point the run fails.
    pub fn too_far(
        &mut self,
        co_table: &RankTable,
        my_table: &RankTable,
        co_location: &CellValue,
        my_location: &CellValue,
        reporter: &mut dyn Reporter,
    ) -> Result<bool> {
        let Some(my_label) = cell_label(my_location) else {
            reporter.report("Blank My Location value. It should have been filled by the locate pass.");
            return self.count_unresolved(reporter).map(|()| false);
        };
        let Some(my_rank) = my_table.rank(&my_label) else {
            reporter.report(&format!(
                "Did not find match for \"{my_label}\" in {}. Note: Is case-sensitive.",
                my_table.name()
            ));
            return self.count_unresolved(reporter).map(|()| false);
        };

        let co_label = cell_label(co_location).unwrap_or_default();
        let Some(co_rank) = co_table.rank(&co_label) else {
            warn!(co_location = %co_label, table = co_table.name(), "co-location not ranked");
            reporter.report(&format!(
                "Did not find match for \"{co_label}\" in {}.",
                co_table.name()
            ));
            return Ok(false);
        };

        Ok(my_rank > co_rank)
    }

    fn count_unresolved(&mut self, reporter: &mut dyn Reporter) -> Result<()> {
        self.unresolved += 1;
        warn!(count = self.unresolved, limit = self.limit, "unresolved My Location");
        if self.unresolved > self.limit {
            reporter.report("Too many blank or unmatched My Location values.");
            return Err(SiftError::UnresolvedLocation {
                count: self.unresolved,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

/// Trimmed text of a non-blank cell.
fn cell_label(cell: &CellValue) -> Option<String> {
    if cell.is_blank() {
        None
    } else {
        Some(cell.to_string().trim().to_string())
    }
}

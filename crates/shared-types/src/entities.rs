//! # Core Domain Entities
//!
//! Value types shared by every subsystem of the sheets coordination core.
//!
//! ## Clusters
//!
//! - **Addressing**: `ServiceUri`, `qualified_service_name`
//! - **Ordering**: `Version`, `WriteTime`, `Timestamp`
//! - **Imports**: `ImportKey`, `CellGrid`
//! - **Documents**: `Spreadsheet`

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// CLUSTER A: ADDRESSING
// =============================================================================

/// Network location of a service instance, e.g. `http://h1:8080/rest`.
///
/// Two URIs are the same peer if and only if their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceUri(String);

impl ServiceUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URI with any trailing slash removed, for building sub-paths.
    pub fn base(&self) -> &str {
        self.0.trim_end_matches('/')
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ServiceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ServiceUri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Domain-qualified service name used as the discovery key: `"<domain>:<service>"`.
pub fn qualified_service_name(domain: &str, service: &str) -> String {
    format!("{domain}:{service}")
}

// =============================================================================
// CLUSTER B: ORDERING
// =============================================================================

/// Position of a mutation in a domain's total order of writes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    pub const ZERO: Version = Version(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The version that immediately follows this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Freshness of data as observed by the requester (logical or wall-clock).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WriteTime(pub u64);

impl WriteTime {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WriteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local wall-clock instant in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn saturating_sub_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_sub(millis))
    }

    pub fn add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

// =============================================================================
// CLUSTER C: IMPORTS
// =============================================================================

/// Rectangular block of cell values as rendered strings.
pub type CellGrid = Vec<Vec<String>>;

/// Identity of a cross-domain range import: remote sheet plus cell range.
///
/// Rendered as `"<sheetId>:<range>"`, e.g. `"S1:A1:B2"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportKey {
    pub sheet_id: String,
    pub range: String,
}

impl ImportKey {
    pub fn new(sheet_id: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            range: range.into(),
        }
    }

    /// Parse `"<sheetId>:<range>"`. The sheet id ends at the first colon.
    pub fn parse(raw: &str) -> Option<Self> {
        let (sheet_id, range) = raw.split_once(':')?;
        if sheet_id.is_empty() || range.is_empty() {
            return None;
        }
        Some(Self::new(sheet_id, range))
    }
}

impl fmt::Display for ImportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sheet_id, self.range)
    }
}

// =============================================================================
// CLUSTER D: DOCUMENTS
// =============================================================================

/// A spreadsheet as persisted by the storage backend.
///
/// `raw_values` holds what users typed (literals or formulas); evaluation is
/// done elsewhere. `shared_with` holds `"<user>@<domain>"` identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub sheet_id: String,
    pub owner: String,
    pub sheet_url: String,
    pub lines: usize,
    pub columns: usize,
    #[serde(default)]
    pub shared_with: BTreeSet<String>,
    pub raw_values: CellGrid,
}

impl Spreadsheet {
    /// Blank sheet of the given shape.
    pub fn blank(
        sheet_id: impl Into<String>,
        owner: impl Into<String>,
        sheet_url: impl Into<String>,
        lines: usize,
        columns: usize,
    ) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            owner: owner.into(),
            sheet_url: sheet_url.into(),
            lines,
            columns,
            shared_with: BTreeSet::new(),
            raw_values: vec![vec![String::new(); columns]; lines],
        }
    }

    /// True when `raw_values` has exactly `lines` rows of `columns` cells.
    pub fn is_well_formed(&self) -> bool {
        self.raw_values.len() == self.lines
            && self.raw_values.iter().all(|row| row.len() == self.columns)
    }

    /// Parse a cell reference like `"B3"` into zero-based `(row, column)`.
    ///
    /// Returns `None` for malformed references or cells outside the sheet,
    /// including cells missing from a grid shorter than its declared shape.
    pub fn cell_position(&self, cell: &str) -> Option<(usize, usize)> {
        let split = cell.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = cell.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let column = letters
            .chars()
            .try_fold(0usize, |acc, c| {
                let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
                acc.checked_mul(26)?.checked_add(digit)
            })?
            .checked_sub(1)?;
        let row = digits.parse::<usize>().ok()?.checked_sub(1)?;

        let stored = self
            .raw_values
            .get(row)
            .is_some_and(|cells| column < cells.len());
        (row < self.lines && column < self.columns && stored).then_some((row, column))
    }

    /// Raw values of a rectangular range such as `"A1:B2"` (or a single
    /// cell `"C3"`). Corners may be given in any order.
    pub fn range_values(&self, range: &str) -> Option<CellGrid> {
        let (from, to) = range.split_once(':').unwrap_or((range, range));
        let (r1, c1) = self.cell_position(from)?;
        let (r2, c2) = self.cell_position(to)?;
        let (top, bottom) = (r1.min(r2), r1.max(r2));
        let (left, right) = (c1.min(c2), c1.max(c2));

        self.raw_values
            .get(top..=bottom)?
            .iter()
            .map(|row| row.get(left..=right).map(<[String]>::to_vec))
            .collect()
    }

    /// Store a raw value. Returns false if the cell does not exist.
    pub fn set_cell(&mut self, cell: &str, raw_value: impl Into<String>) -> bool {
        let slot = self
            .cell_position(cell)
            .and_then(|(row, column)| self.raw_values.get_mut(row)?.get_mut(column));
        match slot {
            Some(slot) => {
                *slot = raw_value.into();
                true
            }
            None => false,
        }
    }
}

//! In-memory spreadsheet storage backend.
//!
//! Exposes the storage operations the sheets service relies on
//! (`put`/`get`/`last_modified`/`delete`) and executes replicated operations
//! against them, both on the primary (before propagation) and on replicas.
//!
//! Each document also keeps the version of the operation that last changed
//! it. The primary assigns that version, so every instance of a domain reports
//! the same write version for the same content. `last_modified` is local
//! wall-clock time and differs between instances.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use shared_types::{Spreadsheet, TimeSource, Timestamp, Version};
use ss_02_replication::{OperationApplier, ReplicatedOperation, SheetOperation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Spreadsheet {0} does not exist")]
    SheetNotFound(String),

    #[error("Spreadsheet {0} already exists")]
    SheetExists(String),

    #[error("Cell {cell} is outside spreadsheet {sheet_id}")]
    InvalidCell { sheet_id: String, cell: String },

    #[error("Spreadsheet {sheet_id} values do not match its {lines}x{columns} shape")]
    MalformedSheet {
        sheet_id: String,
        lines: usize,
        columns: usize,
    },
}

#[derive(Debug, Clone)]
struct StoredSheet {
    sheet: Spreadsheet,
    last_modified: Timestamp,
    write_version: Version,
}

pub struct InMemorySheetStore {
    sheets: RwLock<HashMap<String, StoredSheet>>,
    time_source: Arc<dyn TimeSource>,
}

impl InMemorySheetStore {
    pub fn new(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            sheets: RwLock::new(HashMap::new()),
            time_source,
        }
    }

    /// Insert or replace a document outside the replicated write path. Its
    /// write version is zero.
    pub fn put(&self, sheet: Spreadsheet) {
        self.insert(sheet, Version::ZERO);
    }

    fn insert(&self, sheet: Spreadsheet, write_version: Version) {
        let now = self.time_source.now();
        self.sheets.write().insert(
            sheet.sheet_id.clone(),
            StoredSheet {
                sheet,
                last_modified: now,
                write_version,
            },
        );
    }

    pub fn get(&self, sheet_id: &str) -> Option<Spreadsheet> {
        self.sheets.read().get(sheet_id).map(|s| s.sheet.clone())
    }

    pub fn last_modified(&self, sheet_id: &str) -> Option<Timestamp> {
        self.sheets.read().get(sheet_id).map(|s| s.last_modified)
    }

    /// Version of the operation that last changed the document.
    pub fn write_version(&self, sheet_id: &str) -> Option<Version> {
        self.sheets.read().get(sheet_id).map(|s| s.write_version)
    }

    pub fn delete(&self, sheet_id: &str) -> bool {
        self.sheets.write().remove(sheet_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sheets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.read().is_empty()
    }

    /// Execute one mutation carrying the version the primary assigned to it.
    pub fn execute(&self, operation: &SheetOperation, version: Version) -> Result<(), StoreError> {
        match operation {
            SheetOperation::CreateSpreadsheet(sheet) => {
                if !sheet.is_well_formed() {
                    return Err(StoreError::MalformedSheet {
                        sheet_id: sheet.sheet_id.clone(),
                        lines: sheet.lines,
                        columns: sheet.columns,
                    });
                }
                if self.sheets.read().contains_key(&sheet.sheet_id) {
                    return Err(StoreError::SheetExists(sheet.sheet_id.clone()));
                }
                self.insert(sheet.clone(), version);
                Ok(())
            }
            SheetOperation::DeleteSpreadsheet(args) => {
                if self.delete(&args.sheet_id) {
                    Ok(())
                } else {
                    Err(StoreError::SheetNotFound(args.sheet_id.clone()))
                }
            }
            SheetOperation::UpdateCell(args) => self.modify(&args.sheet_id, version, |sheet| {
                if sheet.set_cell(&args.cell, args.raw_value.clone()) {
                    Ok(())
                } else {
                    Err(StoreError::InvalidCell {
                        sheet_id: args.sheet_id.clone(),
                        cell: args.cell.clone(),
                    })
                }
            }),
            SheetOperation::ShareSpreadsheet(args) => self.modify(&args.sheet_id, version, |sheet| {
                sheet.shared_with.insert(args.user.clone());
                Ok(())
            }),
            SheetOperation::UnshareSpreadsheet(args) => self.modify(&args.sheet_id, version, |sheet| {
                sheet.shared_with.remove(&args.user);
                Ok(())
            }),
            SheetOperation::DeleteUserSpreadsheets(args) => {
                self.sheets
                    .write()
                    .retain(|_, stored| stored.sheet.owner != args.user_id);
                Ok(())
            }
        }
    }

    fn modify<F>(&self, sheet_id: &str, version: Version, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Spreadsheet) -> Result<(), StoreError>,
    {
        let now = self.time_source.now();
        let mut sheets = self.sheets.write();
        let stored = sheets
            .get_mut(sheet_id)
            .ok_or_else(|| StoreError::SheetNotFound(sheet_id.to_string()))?;
        change(&mut stored.sheet)?;
        stored.last_modified = now;
        stored.write_version = version;
        Ok(())
    }
}

impl OperationApplier for InMemorySheetStore {
    fn apply(&self, operation: &ReplicatedOperation) -> Result<(), String> {
        self.execute(&operation.operation, operation.version)
            .map_err(|e| e.to_string())
    }
}

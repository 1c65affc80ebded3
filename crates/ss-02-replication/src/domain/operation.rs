//! Replicated operations and their wire encoding.
//!
//! Wire format: `operationType<TAB>jsonArgs`. The version at emission travels
//! next to the encoding (as the version header), not inside it.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared_types::{Spreadsheet, Version, FIELD_DELIMITER};
use std::fmt;

use super::ReplicationError;

/// Tag identifying which mutation an encoded operation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    CreateSpreadsheet,
    DeleteSpreadsheet,
    UpdateCell,
    ShareSpreadsheet,
    UnshareSpreadsheet,
    DeleteUserSpreadsheets,
}

impl OperationType {
    pub const ALL: [OperationType; 6] = [
        Self::CreateSpreadsheet,
        Self::DeleteSpreadsheet,
        Self::UpdateCell,
        Self::ShareSpreadsheet,
        Self::UnshareSpreadsheet,
        Self::DeleteUserSpreadsheets,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateSpreadsheet => "createSpreadsheet",
            Self::DeleteSpreadsheet => "deleteSpreadsheet",
            Self::UpdateCell => "updateCell",
            Self::ShareSpreadsheet => "shareSpreadsheet",
            Self::UnshareSpreadsheet => "unshareSpreadsheet",
            Self::DeleteUserSpreadsheets => "deleteUserSpreadsheets",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRef {
    pub sheet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellArgs {
    pub sheet_id: String,
    pub cell: String,
    pub raw_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareArgs {
    pub sheet_id: String,
    /// `"<user>@<domain>"`
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

/// A mutation of the domain's spreadsheet state, as replayed on replicas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOperation {
    CreateSpreadsheet(Spreadsheet),
    DeleteSpreadsheet(SheetRef),
    UpdateCell(UpdateCellArgs),
    ShareSpreadsheet(ShareArgs),
    UnshareSpreadsheet(ShareArgs),
    DeleteUserSpreadsheets(UserRef),
}

impl SheetOperation {
    pub fn op_type(&self) -> OperationType {
        match self {
            Self::CreateSpreadsheet(_) => OperationType::CreateSpreadsheet,
            Self::DeleteSpreadsheet(_) => OperationType::DeleteSpreadsheet,
            Self::UpdateCell(_) => OperationType::UpdateCell,
            Self::ShareSpreadsheet(_) => OperationType::ShareSpreadsheet,
            Self::UnshareSpreadsheet(_) => OperationType::UnshareSpreadsheet,
            Self::DeleteUserSpreadsheets(_) => OperationType::DeleteUserSpreadsheets,
        }
    }

    /// Encode as `operationType\tjsonArgs`.
    pub fn encode(&self) -> Result<String, ReplicationError> {
        let args = match self {
            Self::CreateSpreadsheet(sheet) => serde_json::to_string(sheet),
            Self::DeleteSpreadsheet(args) => serde_json::to_string(args),
            Self::UpdateCell(args) => serde_json::to_string(args),
            Self::ShareSpreadsheet(args) | Self::UnshareSpreadsheet(args) => {
                serde_json::to_string(args)
            }
            Self::DeleteUserSpreadsheets(args) => serde_json::to_string(args),
        }
        .map_err(|e| ReplicationError::Serialization(e.to_string()))?;

        Ok(format!("{}{}{}", self.op_type(), FIELD_DELIMITER, args))
    }

    pub fn decode(encoded: &str) -> Result<Self, ReplicationError> {
        let (tag, args) = encoded.split_once(FIELD_DELIMITER).ok_or_else(|| {
            ReplicationError::MalformedOperation("missing field delimiter".into())
        })?;
        let op_type = OperationType::parse(tag)
            .ok_or_else(|| ReplicationError::UnknownOperationType(tag.to_string()))?;

        Ok(match op_type {
            OperationType::CreateSpreadsheet => Self::CreateSpreadsheet(parse_args(args)?),
            OperationType::DeleteSpreadsheet => Self::DeleteSpreadsheet(parse_args(args)?),
            OperationType::UpdateCell => Self::UpdateCell(parse_args(args)?),
            OperationType::ShareSpreadsheet => Self::ShareSpreadsheet(parse_args(args)?),
            OperationType::UnshareSpreadsheet => Self::UnshareSpreadsheet(parse_args(args)?),
            OperationType::DeleteUserSpreadsheets => {
                Self::DeleteUserSpreadsheets(parse_args(args)?)
            }
        })
    }
}

fn parse_args<T: DeserializeOwned>(json: &str) -> Result<T, ReplicationError> {
    serde_json::from_str(json).map_err(|e| ReplicationError::InvalidArguments(e.to_string()))
}

/// An operation together with the version the primary assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatedOperation {
    pub operation: SheetOperation,
    pub version: Version,
}

impl ReplicatedOperation {
    pub fn new(operation: SheetOperation, version: Version) -> Self {
        Self { operation, version }
    }

    pub fn decode(encoded: &str, version: Version) -> Result<Self, ReplicationError> {
        Ok(Self::new(SheetOperation::decode(encoded)?, version))
    }
}

//! Wire-level constants agreed between all instances of the service.

/// Response header carrying the primary's current version counter.
pub const VERSION_HEADER: &str = "X-SHEETS-version";

/// Separator between fields of announcements and encoded operations.
pub const FIELD_DELIMITER: char = '\t';

/// Logical service name of spreadsheet servers.
pub const SHEETS_SERVICE: &str = "sheets";

/// Logical service name of user servers.
pub const USERS_SERVICE: &str = "users";

//! Error types shared by storage, the lookup service, and the importer.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Unique constraint on the code column was violated.
    #[error("duplicate swift code: {swift_code}")]
    Duplicate { swift_code: String },

    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A thread panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Domain errors raised by the lookup service.
///
/// Messages follow `"<Entity> not found with <field>: '<value>'"` and
/// `"<Entity> already exists with <field>: '<value>'"`; the HTTP layer
/// returns them verbatim.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found with {field}: '{value}'")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{entity} already exists with {field}: '{value}'")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Storage(StorageError),
}

impl ServiceError {
    pub fn swift_code_not_found(code: &str) -> Self {
        ServiceError::NotFound {
            entity: "SwiftCode",
            field: "swiftCode",
            value: code.to_string(),
        }
    }

    pub fn country_not_found(iso2: &str) -> Self {
        ServiceError::NotFound {
            entity: "Country",
            field: "countryISO2",
            value: iso2.to_string(),
        }
    }

    pub fn swift_code_exists(code: &str) -> Self {
        ServiceError::Conflict {
            entity: "SwiftCode",
            field: "swiftCode",
            value: code.to_string(),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate { swift_code } => ServiceError::swift_code_exists(&swift_code),
            other => ServiceError::Storage(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Why a single import row was dropped. Never fatal for the batch.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("row {line}: unreadable record: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("row {line}: missing country ISO2 code")]
    MissingCountryCode { line: u64 },

    #[error("row {line}: country ISO2 code '{value}' must be exactly 2 characters")]
    InvalidCountryCode { line: u64, value: String },
}

/// Whole-file import failures.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read data file: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("failed to store imported records: {0}")]
    Storage(#[from] StorageError),
}

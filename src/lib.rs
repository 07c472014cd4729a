// SWIFT Code Lookup Service - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod importer;
pub mod logging;
pub mod model;
pub mod repository;
pub mod service;

// HTTP boundary - only with the server feature
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{setup_database, SqliteRepository};
pub use dto::{
    AddSwiftCodeRequest, BranchResponse, CountryResponse, FieldErrors, HeadquarterResponse,
    MessageResponse, NewSwiftCode, SwiftCodeDetails,
};
pub use error::{ImportError, RowError, ServiceError, ServiceResult, StorageError, StorageResult};
pub use importer::{
    import_from_reader, import_workbook, load_if_empty, parse_records, parse_workbook, ImportReport,
    LoadOutcome, SourceFormat,
};
pub use model::{institution_prefix, is_headquarter_code, SwiftCode};
pub use repository::{MemoryRepository, SwiftCodeRepository};
pub use service::SwiftCodeService;

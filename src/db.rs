// 🗄️ SQLite storage - swift_codes table + WAL
//
// Uniqueness of swift_code is a column constraint, not just an application
// check: concurrent inserts of the same code fail with a constraint violation
// that we translate into StorageError::Duplicate.

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::model::SwiftCode;
use crate::repository::SwiftCodeRepository;

const SELECT_COLUMNS: &str = "swift_code, is_headquarter, bank_name, address, city,
                              country_iso2, country_name, time_zone";

const INSERT_SQL: &str = "INSERT INTO swift_codes (
        swift_code, is_headquarter, bank_name, address, city,
        country_iso2, country_name, time_zone
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Create the schema (idempotent) and enable WAL mode
pub fn setup_database(conn: &Connection) -> StorageResult<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(journal_mode = %mode, "journal mode set");

    // ==========================================================================
    // Swift Codes Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS swift_codes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            swift_code TEXT NOT NULL UNIQUE,
            is_headquarter INTEGER NOT NULL,
            bank_name TEXT,
            address TEXT,
            city TEXT,
            country_iso2 TEXT NOT NULL CHECK (length(country_iso2) = 2),
            country_name TEXT,
            time_zone TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes (exact-code lookup is covered by the UNIQUE constraint)
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_swift_codes_country
         ON swift_codes(country_iso2 COLLATE NOCASE)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_swift_codes_branch_prefix
         ON swift_codes(swift_code) WHERE is_headquarter = 0",
        [],
    )?;

    Ok(())
}

fn row_to_swift_code(row: &Row) -> rusqlite::Result<SwiftCode> {
    Ok(SwiftCode {
        swift_code: row.get(0)?,
        is_headquarter: row.get(1)?,
        bank_name: row.get(2)?,
        address: row.get(3)?,
        city: row.get(4)?,
        country_iso2: row.get(5)?,
        country_name: row.get(6)?,
        time_zone: row.get(7)?,
    })
}

/// GLOB pattern matching every code that starts with `prefix`.
///
/// GLOB is case-sensitive (unlike LIKE) and can use the code index.
fn glob_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        match ch {
            '*' | '?' | '[' => {
                pattern.push('[');
                pattern.push(ch);
                pattern.push(']');
            }
            _ => pattern.push(ch),
        }
    }
    pattern.push('*');
    pattern
}

/// Map a unique-constraint failure on insert to `StorageError::Duplicate`
fn map_insert_error(err: rusqlite::Error, swift_code: &str) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StorageError::Duplicate {
                swift_code: swift_code.to_string(),
            }
        }
        other => StorageError::Sqlite(other),
    }
}

fn insert_one(conn: &Connection, record: &SwiftCode) -> StorageResult<()> {
    conn.execute(
        INSERT_SQL,
        params![
            record.swift_code,
            record.is_headquarter,
            record.bank_name,
            record.address,
            record.city,
            record.country_iso2,
            record.country_name,
            record.time_zone,
        ],
    )
    .map_err(|e| map_insert_error(e, &record.swift_code))?;

    Ok(())
}

// ============================================================================
// SQLITE REPOSITORY
// ============================================================================

/// SQLite-backed `SwiftCodeRepository`.
///
/// One connection behind a mutex, shared by every request handler.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Wrap an open connection, creating the schema if needed
    pub fn new(conn: Connection) -> StorageResult<Self> {
        setup_database(&conn)?;
        Ok(SqliteRepository {
            conn: Mutex::new(conn),
        })
    }

    /// Open (or create) a database file
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened database");
        Self::new(conn)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl SwiftCodeRepository for SqliteRepository {
    fn store(&self, record: &SwiftCode) -> StorageResult<()> {
        let conn = self.conn()?;
        insert_one(&conn, record)
    }

    fn store_all_if_empty(&self, records: &[SwiftCode]) -> StorageResult<Option<usize>> {
        let mut conn = self.conn()?;

        // IMMEDIATE takes the database write lock before the count, so two
        // processes sharing the file cannot both see an empty table.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(None);
        }

        for record in records {
            insert_one(&tx, record)?;
        }
        tx.commit()?;

        debug!(count = records.len(), "bulk loaded records into sqlite");
        Ok(Some(records.len()))
    }

    fn exists(&self, swift_code: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM swift_codes WHERE swift_code = ?1)",
            params![swift_code],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn find(&self, swift_code: &str) -> StorageResult<Option<SwiftCode>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM swift_codes WHERE swift_code = ?1");
        let record = conn
            .query_row(&sql, params![swift_code], row_to_swift_code)
            .optional()?;
        Ok(record)
    }

    fn find_by_prefix(
        &self,
        prefix: &str,
        exclude_headquarters: bool,
    ) -> StorageResult<Vec<SwiftCode>> {
        let conn = self.conn()?;
        let filter = if exclude_headquarters {
            " AND is_headquarter = 0"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM swift_codes
             WHERE swift_code GLOB ?1{filter}
             ORDER BY swift_code"
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![glob_prefix(prefix)], row_to_swift_code)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn find_by_country(&self, iso2: &str) -> StorageResult<Vec<SwiftCode>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM swift_codes
             WHERE country_iso2 = ?1 COLLATE NOCASE
             ORDER BY id"
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![iso2], row_to_swift_code)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn delete(&self, swift_code: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "DELETE FROM swift_codes WHERE swift_code = ?1",
            params![swift_code],
        )?;
        Ok(affected > 0)
    }

    fn count_all(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

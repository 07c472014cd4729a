//! Storage abstraction for swift code records.
//!
//! - `SwiftCodeRepository` - the operations the importer and lookup service need
//! - `MemoryRepository`    - in-memory implementation (tests, embedding)
//! - `crate::db::SqliteRepository` - SQLite implementation (production)
//!
//! Every implementation iterates records in insertion order and enforces
//! code uniqueness itself, so callers never rely on check-then-insert alone.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::model::SwiftCode;

/// Persistence operations for swift code records.
pub trait SwiftCodeRepository: Send + Sync + 'static {
    /// Insert one record.
    ///
    /// Fails with `StorageError::Duplicate` when the code already exists.
    fn store(&self, record: &SwiftCode) -> StorageResult<()>;

    /// Insert all records in one atomic step, but only if storage is empty.
    ///
    /// Returns `Ok(None)` without writing when at least one record exists,
    /// otherwise the number of records inserted. The emptiness check and the
    /// insert happen under the same write lock.
    fn store_all_if_empty(&self, records: &[SwiftCode]) -> StorageResult<Option<usize>>;

    /// Exact-match existence check.
    fn exists(&self, swift_code: &str) -> StorageResult<bool>;

    /// Exact-match lookup.
    fn find(&self, swift_code: &str) -> StorageResult<Option<SwiftCode>>;

    /// Records whose code starts with `prefix` (case-sensitive), ordered by code.
    fn find_by_prefix(
        &self,
        prefix: &str,
        exclude_headquarters: bool,
    ) -> StorageResult<Vec<SwiftCode>>;

    /// Records whose ISO2 code matches case-insensitively, in insertion order.
    fn find_by_country(&self, iso2: &str) -> StorageResult<Vec<SwiftCode>>;

    /// Delete by exact code. Returns true when a record was removed.
    fn delete(&self, swift_code: &str) -> StorageResult<bool>;

    /// Number of stored records.
    fn count_all(&self) -> StorageResult<u64>;
}

// ============================================================================
// IN-MEMORY REPOSITORY
// ============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    /// Records keyed by surrogate id (insertion order)
    rows: BTreeMap<u64, SwiftCode>,
    /// swift_code -> surrogate id
    by_code: HashMap<String, u64>,
}

impl MemoryState {
    fn insert(&mut self, record: &SwiftCode) -> StorageResult<()> {
        if self.by_code.contains_key(&record.swift_code) {
            return Err(StorageError::Duplicate {
                swift_code: record.swift_code.clone(),
            });
        }

        self.next_id += 1;
        self.by_code.insert(record.swift_code.clone(), self.next_id);
        self.rows.insert(self.next_id, record.clone());
        Ok(())
    }
}

/// In-memory implementation of `SwiftCodeRepository`.
///
/// A single `RwLock` guards the whole state, so every write (including the
/// uniqueness check) is atomic.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SwiftCodeRepository for MemoryRepository {
    fn store(&self, record: &SwiftCode) -> StorageResult<()> {
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;
        state.insert(record)
    }

    fn store_all_if_empty(&self, records: &[SwiftCode]) -> StorageResult<Option<usize>> {
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;
        if !state.rows.is_empty() {
            return Ok(None);
        }

        // All or nothing: validate against a scratch copy first
        let mut staged = MemoryState::default();
        for record in records {
            staged.insert(record)?;
        }
        *state = staged;

        debug!(count = records.len(), "bulk loaded records into memory");
        Ok(Some(records.len()))
    }

    fn exists(&self, swift_code: &str) -> StorageResult<bool> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(state.by_code.contains_key(swift_code))
    }

    fn find(&self, swift_code: &str) -> StorageResult<Option<SwiftCode>> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(state
            .by_code
            .get(swift_code)
            .and_then(|id| state.rows.get(id))
            .cloned())
    }

    fn find_by_prefix(
        &self,
        prefix: &str,
        exclude_headquarters: bool,
    ) -> StorageResult<Vec<SwiftCode>> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut matches: Vec<SwiftCode> = state
            .rows
            .values()
            .filter(|r| r.swift_code.starts_with(prefix))
            .filter(|r| !(exclude_headquarters && r.is_headquarter))
            .cloned()
            .collect();

        matches.sort_by(|a, b| a.swift_code.cmp(&b.swift_code));
        Ok(matches)
    }

    fn find_by_country(&self, iso2: &str) -> StorageResult<Vec<SwiftCode>> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(state
            .rows
            .values()
            .filter(|r| r.country_iso2.eq_ignore_ascii_case(iso2))
            .cloned()
            .collect())
    }

    fn delete(&self, swift_code: &str) -> StorageResult<bool> {
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;
        match state.by_code.remove(swift_code) {
            Some(id) => {
                state.rows.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn count_all(&self) -> StorageResult<u64> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(state.rows.len() as u64)
    }
}

// ============================================================================
// TESTS
// ============================================================================

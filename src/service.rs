// 🔎 Lookup / Classification Engine
//
// Answers "what is this code" and "what is in this country", and performs
// single-record add/delete. Inputs are assumed shape-valid (see dto.rs);
// this layer only enforces existence and uniqueness.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dto::{BranchResponse, CountryResponse, HeadquarterResponse, NewSwiftCode, SwiftCodeDetails};
use crate::error::{ServiceError, ServiceResult};
use crate::model::{institution_prefix, is_headquarter_code, SwiftCode};
use crate::repository::SwiftCodeRepository;

pub const ADDED_MESSAGE: &str = "Swift code added successfully";
pub const DELETED_MESSAGE: &str = "Swift code deleted successfully";

#[derive(Clone)]
pub struct SwiftCodeService {
    repo: Arc<dyn SwiftCodeRepository>,
}

impl SwiftCodeService {
    pub fn new(repo: Arc<dyn SwiftCodeRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn SwiftCodeRepository> {
        &self.repo
    }

    /// Look up one code.
    ///
    /// A headquarters comes back with every non-headquarters record sharing
    /// the first 8 characters of `swift_code`; a branch comes back alone.
    pub fn get_details(&self, swift_code: &str) -> ServiceResult<SwiftCodeDetails> {
        let record = self
            .repo
            .find(swift_code)?
            .ok_or_else(|| ServiceError::swift_code_not_found(swift_code))?;

        if record.is_headquarter {
            let prefix = institution_prefix(swift_code);
            let branches = self.repo.find_by_prefix(prefix, true)?;
            debug!(swift_code, prefix, branches = branches.len(), "headquarter lookup");

            Ok(SwiftCodeDetails::Headquarter(HeadquarterResponse::new(
                record, branches,
            )))
        } else {
            Ok(SwiftCodeDetails::Branch(record.into()))
        }
    }

    /// Every record whose ISO2 code matches `iso2`, ignoring case.
    ///
    /// ISO2 and country name are echoed from the first record in storage
    /// order.
    pub fn get_by_country(&self, iso2: &str) -> ServiceResult<CountryResponse> {
        let records = self.repo.find_by_country(iso2)?;

        let (country_iso2, country_name) = match records.first() {
            Some(first) => (first.country_iso2.clone(), first.country_name.clone()),
            None => return Err(ServiceError::country_not_found(iso2)),
        };

        Ok(CountryResponse {
            country_iso2,
            country_name,
            swift_codes: records.into_iter().map(BranchResponse::from).collect(),
        })
    }

    /// Delete one code. Branches of a deleted headquarters are left alone.
    pub fn delete(&self, swift_code: &str) -> ServiceResult<String> {
        if !self.repo.exists(swift_code)? {
            return Err(ServiceError::swift_code_not_found(swift_code));
        }

        // Lost a race with another delete
        if !self.repo.delete(swift_code)? {
            return Err(ServiceError::swift_code_not_found(swift_code));
        }

        info!(swift_code, "swift code deleted");
        Ok(DELETED_MESSAGE.to_string())
    }

    /// Add one code; country fields are uppercased before storing.
    ///
    /// The headquarters flag is derived from the code suffix. A concurrent
    /// insert of the same code that slips past the existence check is caught
    /// by the storage uniqueness constraint and reported as Conflict too.
    pub fn add(&self, input: NewSwiftCode) -> ServiceResult<String> {
        if self.repo.exists(&input.swift_code)? {
            return Err(ServiceError::swift_code_exists(&input.swift_code));
        }

        let derived = is_headquarter_code(&input.swift_code);
        if derived != input.is_headquarter {
            warn!(
                swift_code = %input.swift_code,
                requested = input.is_headquarter,
                derived,
                "isHeadquarter does not match code suffix, using suffix"
            );
        }

        let mut record = SwiftCode::new(input.swift_code, input.country_iso2)
            .with_bank_name(input.bank_name)
            .with_address(input.address)
            .with_country_name(input.country_name);
        record.is_headquarter = derived;

        self.repo.store(&record)?;

        info!(swift_code = %record.swift_code, "swift code added");
        Ok(ADDED_MESSAGE.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRepository;
    use crate::error::StorageResult;
    use crate::repository::MemoryRepository;

    fn record(code: &str, iso2: &str, country: &str) -> SwiftCode {
        SwiftCode::new(code.to_string(), iso2.to_string())
            .with_bank_name("Test Bank")
            .with_address("Test Address")
            .with_country_name(country)
    }

    fn seeded_service() -> SwiftCodeService {
        let repo = MemoryRepository::new();
        for r in [
            record("BPKOPLPWXXX", "PL", "Poland"),
            record("BPKOPLPWWAR", "PL", "Poland"),
            record("BPKOPLPWKRK", "PL", "Poland"),
            record("ALBPPLPWXXX", "PL", "Poland"),
            record("AAISALTRXXX", "AL", "Albania"),
            record("AAISALTR123", "AL", "Albania"),
        ] {
            repo.store(&r).unwrap();
        }
        SwiftCodeService::new(Arc::new(repo))
    }

    fn new_code(code: &str, is_headquarter: bool) -> NewSwiftCode {
        NewSwiftCode {
            address: "Pulawska 15".to_string(),
            bank_name: "PKO BANK POLSKI".to_string(),
            country_iso2: "pl".to_string(),
            country_name: "Poland".to_string(),
            is_headquarter,
            swift_code: code.to_string(),
        }
    }

    #[test]
    fn test_headquarter_details_list_same_prefix_branches() {
        let service = seeded_service();

        let details = service.get_details("BPKOPLPWXXX").unwrap();
        let hq = match details {
            SwiftCodeDetails::Headquarter(hq) => hq,
            other => panic!("expected headquarter, got {other:?}"),
        };

        let codes: Vec<&str> = hq.branches.iter().map(|b| b.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["BPKOPLPWKRK", "BPKOPLPWWAR"]);
        assert!(hq.branches.iter().all(|b| !b.is_headquarter));
        assert!(hq.is_headquarter);
    }

    #[test]
    fn test_headquarter_without_branches() {
        let service = seeded_service();

        match service.get_details("ALBPPLPWXXX").unwrap() {
            SwiftCodeDetails::Headquarter(hq) => assert!(hq.branches.is_empty()),
            other => panic!("expected headquarter, got {other:?}"),
        }
    }

    #[test]
    fn test_branch_details() {
        let service = seeded_service();

        match service.get_details("BPKOPLPWWAR").unwrap() {
            SwiftCodeDetails::Branch(branch) => {
                assert_eq!(branch.swift_code, "BPKOPLPWWAR");
                assert!(!branch.is_headquarter);
                assert_eq!(branch.country_name.as_deref(), Some("POLAND"));
            }
            other => panic!("expected branch, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_code_not_found() {
        let service = seeded_service();

        let err = service.get_details("NOTFOUND").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert_eq!(err.to_string(), "SwiftCode not found with swiftCode: 'NOTFOUND'");
    }

    #[test]
    fn test_get_by_country() {
        let service = seeded_service();

        let country = service.get_by_country("pl").unwrap();
        assert_eq!(country.country_iso2, "PL");
        assert_eq!(country.country_name.as_deref(), Some("POLAND"));
        assert_eq!(country.swift_codes.len(), 4);
        // Headquarters and branches intermixed
        assert!(country.swift_codes.iter().any(|c| c.is_headquarter));
        assert!(country.swift_codes.iter().any(|c| !c.is_headquarter));
    }

    #[test]
    fn test_country_name_taken_from_first_record() {
        let repo = MemoryRepository::new();
        repo.store(&record("FIRSTPLXXXX", "PL", "Polska")).unwrap();
        repo.store(&record("SECONDPLXXX", "PL", "Poland")).unwrap();
        let service = SwiftCodeService::new(Arc::new(repo));

        let country = service.get_by_country("PL").unwrap();
        assert_eq!(country.country_name.as_deref(), Some("POLSKA"));
        assert_eq!(country.swift_codes.len(), 2);
    }

    #[test]
    fn test_unknown_country_not_found() {
        let service = seeded_service();

        let err = service.get_by_country("XX").unwrap_err();
        assert_eq!(err.to_string(), "Country not found with countryISO2: 'XX'");
    }

    #[test]
    fn test_delete_then_lookup_not_found() {
        let service = seeded_service();

        assert_eq!(service.delete("BPKOPLPWWAR").unwrap(), DELETED_MESSAGE);

        let err = service.get_details("BPKOPLPWWAR").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[test]
    fn test_delete_headquarter_keeps_branches() {
        let service = seeded_service();

        service.delete("BPKOPLPWXXX").unwrap();

        assert!(service.get_details("BPKOPLPWWAR").is_ok());
        assert!(service.get_details("BPKOPLPWKRK").is_ok());
    }

    #[test]
    fn test_delete_unknown_not_found() {
        let service = seeded_service();

        let err = service.delete("DOESNOTEXIST").unwrap_err();
        assert_eq!(
            err.to_string(),
            "SwiftCode not found with swiftCode: 'DOESNOTEXIST'"
        );
    }

    #[test]
    fn test_add_uppercases_country_fields() {
        let service = SwiftCodeService::new(Arc::new(MemoryRepository::new()));

        assert_eq!(service.add(new_code("BPKOPLPWXXX", true)).unwrap(), ADDED_MESSAGE);

        let stored = service.repository().find("BPKOPLPWXXX").unwrap().unwrap();
        assert_eq!(stored.country_iso2, "PL");
        assert_eq!(stored.country_name.as_deref(), Some("POLAND"));
        assert_eq!(stored.bank_name.as_deref(), Some("PKO BANK POLSKI"));
        assert!(stored.is_headquarter);
    }

    #[test]
    fn test_add_derives_headquarter_flag_from_suffix() {
        let service = SwiftCodeService::new(Arc::new(MemoryRepository::new()));

        service.add(new_code("BPKOPLPWXXX", false)).unwrap();
        service.add(new_code("BPKOPLPWWAR", true)).unwrap();

        let repo = service.repository();
        assert!(repo.find("BPKOPLPWXXX").unwrap().unwrap().is_headquarter);
        assert!(!repo.find("BPKOPLPWWAR").unwrap().unwrap().is_headquarter);
    }

    #[test]
    fn test_add_twice_conflicts_and_keeps_one_record() {
        let repo = Arc::new(SqliteRepository::open_in_memory().unwrap());
        let service = SwiftCodeService::new(repo.clone());

        service.add(new_code("DUPLICATE", false)).unwrap();
        let err = service.add(new_code("DUPLICATE", false)).unwrap_err();

        assert!(matches!(err, ServiceError::Conflict { .. }));
        assert_eq!(
            err.to_string(),
            "SwiftCode already exists with swiftCode: 'DUPLICATE'"
        );
        assert_eq!(repo.count_all().unwrap(), 1);
    }

    /// Repository whose existence check always misses, as if another
    /// request inserted the same code in between.
    struct RacingRepository(MemoryRepository);

    impl SwiftCodeRepository for RacingRepository {
        fn store(&self, record: &SwiftCode) -> StorageResult<()> {
            self.0.store(record)
        }
        fn store_all_if_empty(&self, records: &[SwiftCode]) -> StorageResult<Option<usize>> {
            self.0.store_all_if_empty(records)
        }
        fn exists(&self, _swift_code: &str) -> StorageResult<bool> {
            Ok(false)
        }
        fn find(&self, swift_code: &str) -> StorageResult<Option<SwiftCode>> {
            self.0.find(swift_code)
        }
        fn find_by_prefix(&self, prefix: &str, exclude: bool) -> StorageResult<Vec<SwiftCode>> {
            self.0.find_by_prefix(prefix, exclude)
        }
        fn find_by_country(&self, iso2: &str) -> StorageResult<Vec<SwiftCode>> {
            self.0.find_by_country(iso2)
        }
        fn delete(&self, swift_code: &str) -> StorageResult<bool> {
            self.0.delete(swift_code)
        }
        fn count_all(&self) -> StorageResult<u64> {
            self.0.count_all()
        }
    }

    #[test]
    fn test_add_race_reported_as_conflict() {
        let inner = MemoryRepository::new();
        inner.store(&record("RACECODEXXX", "PL", "Poland")).unwrap();
        let service = SwiftCodeService::new(Arc::new(RacingRepository(inner)));

        let err = service.add(new_code("RACECODEXXX", true)).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
        assert_eq!(service.repository().count_all().unwrap(), 1);
    }
}

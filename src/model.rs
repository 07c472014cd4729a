// 🏦 SwiftCode Record - canonical bank identifier entry
//
// One row per SWIFT/BIC code. Headquarters and branches are NOT linked by a
// stored pointer: a headquarters owns every branch that shares its 8-char
// institution prefix, computed at read time.

use serde::{Deserialize, Serialize};

// ============================================================================
// CODE CONVENTIONS
// ============================================================================

/// Suffix that marks a headquarters code ("AAISALTRXXX")
pub const HEADQUARTER_SUFFIX: &str = "XXX";

/// Length of the institution prefix shared by a headquarters and its branches
pub const INSTITUTION_PREFIX_LEN: usize = 8;

/// Shortest code accepted anywhere (import or add)
pub const MIN_CODE_LEN: usize = 8;

/// Longest code accepted by the add operation
pub const MAX_CODE_LEN: usize = 11;

/// Exact length of a country ISO2 code
pub const ISO2_LEN: usize = 2;

/// True when the code denotes a headquarters
pub fn is_headquarter_code(code: &str) -> bool {
    code.ends_with(HEADQUARTER_SUFFIX)
}

/// First 8 characters of a code (the whole code if it is shorter)
pub fn institution_prefix(code: &str) -> &str {
    match code.char_indices().nth(INSTITUTION_PREFIX_LEN) {
        Some((idx, _)) => &code[..idx],
        None => code,
    }
}

// ============================================================================
// SWIFT CODE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCode {
    pub swift_code: String,
    pub is_headquarter: bool,
    pub bank_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2, always uppercase
    pub country_iso2: String,
    /// Always uppercase
    pub country_name: Option<String>,
    pub time_zone: Option<String>,
}

impl SwiftCode {
    /// Create a record with the headquarters flag derived from the code
    pub fn new(swift_code: String, country_iso2: String) -> Self {
        let is_headquarter = is_headquarter_code(&swift_code);

        SwiftCode {
            swift_code,
            is_headquarter,
            bank_name: None,
            address: None,
            city: None,
            country_iso2: country_iso2.to_uppercase(),
            country_name: None,
            time_zone: None,
        }
    }

    /// Builder pattern: add optional bank name
    pub fn with_bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = Some(bank_name.into());
        self
    }

    /// Builder pattern: add optional address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Builder pattern: add country name (uppercased)
    pub fn with_country_name(mut self, country_name: impl Into<String>) -> Self {
        self.country_name = Some(country_name.into().to_uppercase());
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================

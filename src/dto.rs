// 📦 Wire shapes - JSON bodies for the /v1/swift-codes API
//
// Field names are camelCase except `countryISO2`, which keeps its acronym.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{SwiftCode, ISO2_LEN, MAX_CODE_LEN, MIN_CODE_LEN};

// ============================================================================
// RESPONSES
// ============================================================================

/// Summary of one record (branch shape, also used inside lists)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchResponse {
    pub address: Option<String>,
    pub bank_name: Option<String>,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: Option<String>,
    pub is_headquarter: bool,
    pub swift_code: String,
}

impl From<SwiftCode> for BranchResponse {
    fn from(code: SwiftCode) -> Self {
        Self {
            address: code.address,
            bank_name: code.bank_name,
            country_iso2: code.country_iso2,
            country_name: code.country_name,
            is_headquarter: code.is_headquarter,
            swift_code: code.swift_code,
        }
    }
}

/// Headquarters record plus every branch sharing its prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadquarterResponse {
    pub address: Option<String>,
    pub bank_name: Option<String>,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: Option<String>,
    pub is_headquarter: bool,
    pub swift_code: String,
    pub branches: Vec<BranchResponse>,
}

impl HeadquarterResponse {
    pub fn new(headquarter: SwiftCode, branches: Vec<SwiftCode>) -> Self {
        Self {
            address: headquarter.address,
            bank_name: headquarter.bank_name,
            country_iso2: headquarter.country_iso2,
            country_name: headquarter.country_name,
            is_headquarter: true,
            swift_code: headquarter.swift_code,
            branches: branches.into_iter().map(BranchResponse::from).collect(),
        }
    }
}

/// Result of a code lookup; the shape depends on `isHeadquarter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SwiftCodeDetails {
    Headquarter(HeadquarterResponse),
    Branch(BranchResponse),
}

/// Every record of one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryResponse {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: Option<String>,
    pub swift_codes: Vec<BranchResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// ADD REQUEST
// ============================================================================

/// POST body. Every field is optional on the wire so that missing fields
/// surface as validation errors instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSwiftCodeRequest {
    pub address: Option<String>,
    pub bank_name: Option<String>,
    #[serde(rename = "countryISO2")]
    pub country_iso2: Option<String>,
    pub country_name: Option<String>,
    pub is_headquarter: Option<bool>,
    pub swift_code: Option<String>,
}

/// A request that passed boundary validation; `country_iso2` is uppercased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSwiftCode {
    pub address: String,
    pub bank_name: String,
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
    pub swift_code: String,
}

/// field name -> reason, one entry per failing field
pub type FieldErrors = BTreeMap<String, String>;

fn non_blank<'a>(
    value: &'a Option<String>,
    field: &str,
    message: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.insert(field.to_string(), message.to_string());
            None
        }
    }
}

impl AddSwiftCodeRequest {
    /// Check field shapes; the uniqueness rule is the service's job
    pub fn validate(self) -> Result<NewSwiftCode, FieldErrors> {
        let mut errors = FieldErrors::new();

        let address = non_blank(&self.address, "address", "Address cannot be empty", &mut errors);
        let bank_name = non_blank(&self.bank_name, "bankName", "Bank name cannot be empty", &mut errors);
        let country_name = non_blank(&self.country_name, "countryName", "Country cannot be empty", &mut errors);

        let country_iso2 = non_blank(
            &self.country_iso2,
            "countryISO2",
            "Country ISO2 code cannot be empty",
            &mut errors,
        )
        // Checked on the uppercased form; "ß" uppercases to "SS"
        .map(str::to_uppercase)
        .filter(|iso2| {
            let ok = iso2.chars().count() == ISO2_LEN;
            if !ok {
                errors.insert(
                    "countryISO2".to_string(),
                    "Country ISO2 code must be exactly 2 characters".to_string(),
                );
            }
            ok
        });

        let swift_code = non_blank(&self.swift_code, "swiftCode", "Swift code cannot be empty", &mut errors)
            .filter(|code| {
                let len = code.chars().count();
                let ok = (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&len);
                if !ok {
                    errors.insert(
                        "swiftCode".to_string(),
                        "Swift code must be between 8 and 11 characters".to_string(),
                    );
                }
                ok
            });

        if self.is_headquarter.is_none() {
            errors.insert(
                "isHeadquarter".to_string(),
                "isHeadquarter cannot be empty".to_string(),
            );
        }

        match (address, bank_name, country_iso2, country_name, self.is_headquarter, swift_code) {
            (Some(address), Some(bank_name), Some(country_iso2), Some(country_name), Some(is_headquarter), Some(swift_code))
                if errors.is_empty() =>
            {
                Ok(NewSwiftCode {
                    address: address.to_string(),
                    bank_name: bank_name.to_string(),
                    country_iso2,
                    country_name: country_name.to_string(),
                    is_headquarter,
                    swift_code: swift_code.to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_request() -> AddSwiftCodeRequest {
        AddSwiftCodeRequest {
            address: Some("Pulawska 15".to_string()),
            bank_name: Some("PKO BANK POLSKI".to_string()),
            country_iso2: Some("pl".to_string()),
            country_name: Some("Poland".to_string()),
            is_headquarter: Some(true),
            swift_code: Some("BPKOPLPWXXX".to_string()),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let new_code = valid_request().validate().unwrap();
        assert_eq!(new_code.swift_code, "BPKOPLPWXXX");
        assert_eq!(new_code.country_iso2, "PL");
    }

    #[test]
    fn test_short_code_rejected_on_swift_code_field() {
        for code in ["A", "ABCDEFG"] {
            let mut request = valid_request();
            request.swift_code = Some(code.to_string());

            let errors = request.validate().unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors["swiftCode"],
                "Swift code must be between 8 and 11 characters"
            );
        }
    }

    #[test]
    fn test_long_code_rejected() {
        let mut request = valid_request();
        request.swift_code = Some("BPKOPLPWXXXX".to_string());

        let errors = request.validate().unwrap_err();
        assert!(errors.contains_key("swiftCode"));
    }

    #[test]
    fn test_iso2_length() {
        let mut request = valid_request();
        request.country_iso2 = Some("POL".to_string());

        let errors = request.validate().unwrap_err();
        assert_eq!(
            errors["countryISO2"],
            "Country ISO2 code must be exactly 2 characters"
        );
    }

    #[test]
    fn test_iso2_length_checked_after_uppercasing() {
        let mut request = valid_request();
        request.country_iso2 = Some("ßa".to_string());

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors["countryISO2"],
            "Country ISO2 code must be exactly 2 characters"
        );
    }

    #[test]
    fn test_empty_body_reports_every_field() {
        let errors = AddSwiftCodeRequest::default().validate().unwrap_err();

        assert_eq!(errors.len(), 6);
        assert_eq!(errors["address"], "Address cannot be empty");
        assert_eq!(errors["bankName"], "Bank name cannot be empty");
        assert_eq!(errors["countryISO2"], "Country ISO2 code cannot be empty");
        assert_eq!(errors["countryName"], "Country cannot be empty");
        assert_eq!(errors["isHeadquarter"], "isHeadquarter cannot be empty");
        assert_eq!(errors["swiftCode"], "Swift code cannot be empty");
    }

    #[test]
    fn test_blank_strings_are_empty() {
        let mut request = valid_request();
        request.bank_name = Some("   ".to_string());

        let errors = request.validate().unwrap_err();
        assert_eq!(errors["bankName"], "Bank name cannot be empty");
    }

    #[test]
    fn test_request_field_names() {
        let request: AddSwiftCodeRequest = serde_json::from_value(json!({
            "address": "Addr",
            "bankName": "Bank",
            "countryISO2": "PL",
            "countryName": "Poland",
            "isHeadquarter": false,
            "swiftCode": "BPKOPLPW123"
        }))
        .unwrap();

        assert_eq!(request.country_iso2.as_deref(), Some("PL"));
        assert_eq!(request.is_headquarter, Some(false));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_details_shape_depends_on_variant() {
        let branch = SwiftCode::new("BPKOPLPWWAR".to_string(), "PL".to_string())
            .with_country_name("Poland");
        let hq = SwiftCode::new("BPKOPLPWXXX".to_string(), "PL".to_string())
            .with_country_name("Poland");

        let branch_json =
            serde_json::to_value(SwiftCodeDetails::Branch(branch.clone().into())).unwrap();
        assert_eq!(branch_json["swiftCode"], "BPKOPLPWWAR");
        assert_eq!(branch_json["countryISO2"], "PL");
        assert_eq!(branch_json["isHeadquarter"], false);
        assert!(branch_json.get("branches").is_none());

        let hq_json = serde_json::to_value(SwiftCodeDetails::Headquarter(
            HeadquarterResponse::new(hq, vec![branch]),
        ))
        .unwrap();
        assert_eq!(hq_json["isHeadquarter"], true);
        assert_eq!(hq_json["branches"][0]["swiftCode"], "BPKOPLPWWAR");
    }
}

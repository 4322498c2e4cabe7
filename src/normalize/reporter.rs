//! Fixed reporter-code mapping.
//!
//! Single-letter codes are MAUDE `report_source_code` values; longer codes are
//! `reporter_occupation_code` values. Anything unlisted is `Other`.

use crate::core::ReporterType;

const PATIENT_CODES: &[&str] = &["P", "PATIENT", "LAY USER/PATIENT", "CONSUMER"];

const HEALTHCARE_CODES: &[&str] = &[
    "U",
    "H",
    "PHYSICIAN",
    "NURSE",
    "HEALTH PROFESSIONAL",
    "PHARMACIST",
    "OTHER HEALTH CARE PROFESSIONAL",
    "RISK MANAGER",
    "BIOMEDICAL ENGINEER",
];

const MANUFACTURER_CODES: &[&str] = &["M", "MANUFACTURER"];

/// Raw fields consulted for the reporter code, in order.
pub const REPORTER_FIELDS: &[&str] = &[
    "reporter_occupation_code",
    "report_source_code",
    "source_type",
];

/// Map a reporter/source code to a reporter type. Missing codes map to `Other`.
pub fn classify_reporter(code: Option<&str>) -> ReporterType {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return ReporterType::Other;
    };
    let code = code.to_ascii_uppercase();
    let listed = |codes: &[&str]| codes.contains(&code.as_str());

    if listed(PATIENT_CODES) {
        ReporterType::Patient
    } else if listed(HEALTHCARE_CODES) {
        ReporterType::Healthcare
    } else if listed(MANUFACTURER_CODES) {
        ReporterType::Manufacturer
    } else {
        ReporterType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_codes() {
        assert_eq!(classify_reporter(Some("P")), ReporterType::Patient);
        assert_eq!(classify_reporter(Some("U")), ReporterType::Healthcare);
        assert_eq!(classify_reporter(Some("M")), ReporterType::Manufacturer);
        assert_eq!(classify_reporter(Some("D")), ReporterType::Other);
    }

    #[test]
    fn test_occupation_codes_are_case_insensitive() {
        assert_eq!(classify_reporter(Some("lay user/patient")), ReporterType::Patient);
        assert_eq!(classify_reporter(Some(" Physician ")), ReporterType::Healthcare);
    }

    #[test]
    fn test_missing_or_unknown_is_other() {
        assert_eq!(classify_reporter(None), ReporterType::Other);
        assert_eq!(classify_reporter(Some("")), ReporterType::Other);
        assert_eq!(classify_reporter(Some("ATTORNEY")), ReporterType::Other);
    }
}

//! Fixed reference-ID lookup tables from the OFAC delta feed. These are
//! closed enumerations; unmapped IDs render with a labeled fallback so the
//! raw ID survives into the output.

use once_cell::sync::Lazy;
use std::collections::HashMap;

// Feature type IDs dispatched by the normalizer.
pub const FEATURE_BIRTHDATE: &str = "8";
pub const FEATURE_PLACE_OF_BIRTH: &str = "9";
pub const FEATURE_NATIONALITY: &str = "10";
pub const FEATURE_GENDER: &str = "224";
pub const FEATURE_VESSEL_FLAG: &str = "3";

// Entity type reference IDs.
pub const TYPE_INDIVIDUAL: &str = "600";
pub const TYPE_ENTITY: &str = "601";
pub const TYPE_VESSEL: &str = "602";

static DOCUMENT_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("1571", "Passport"),
        ("1584", "National ID"),
        ("1608", "Identification Number"),
        ("1626", "Vessel Registration"),
        ("1632", "Residency Number"),
        ("91264", "MMSI"),
        ("91761", "Registration Number"),
        ("1575", "Driver License"),
        ("1576", "Tax ID"),
        ("1577", "Social Security Number"),
        ("1578", "Business Registration"),
        ("1579", "Military ID"),
    ])
});

static SANCTIONS_PROGRAMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("91901", "IRAN-EO13902"),
        ("91902", "IRAN-EO13902"),
        ("1556", "UKRAINE-EO13660"),
        ("1557", "UKRAINE-EO13661"),
        ("1558", "UKRAINE-EO13662"),
        ("1559", "UKRAINE-EO13685"),
        ("1560", "RUSSIA-EO14024"),
        ("1550", "SDN"),
        ("1551", "CRIM"),
        ("1552", "SYRIA"),
        ("1553", "CUBA"),
        ("1554", "NORTH KOREA"),
        ("1555", "NICARAGUA"),
    ])
});

/// Map a document type reference ID to a readable name.
pub fn document_type_name(ref_id: &str) -> String {
    DOCUMENT_TYPES
        .get(ref_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Doc Type {ref_id}"))
}

/// Map a sanctions program reference ID to a readable name.
pub fn sanctions_program_name(ref_id: &str) -> String {
    SANCTIONS_PROGRAMS
        .get(ref_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Program {ref_id}"))
}

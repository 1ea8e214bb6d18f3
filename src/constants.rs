/// Source name constants to ensure consistency across the codebase
/// These identify the provenance of each extracted table.

// Source names (used in CLI and run reports)
pub const OFAC_SOURCE: &str = "ofac";
pub const UN_SOURCE: &str = "un";
pub const DOCUMENT_SOURCE: &str = "documents";

// Fixed endpoints
pub const OFAC_DELTA_URL: &str = "https://sanctionslistservice.ofac.treas.gov/changes/latest";
pub const UN_LIST_PAGE_URL: &str =
    "https://main.un.org/securitycouncil/en/content/un-sc-consolidated-list";

/// Namespace of the OFAC delta feed documents.
pub const OFAC_DELTA_NAMESPACE: &str = "https://www.treasury.gov/ofac/DeltaFile/1.0";

/// Watchlist label stamped on rows extracted from the OFAC delta feed.
pub const OFAC_WATCHLIST_LABEL: &str = "OFAC - Specially Designated National List";

/// Source label stamped on rows extracted from the UN consolidated list.
pub const UN_SOURCE_LABEL: &str = "UN Security Council";

/// The canonical 17-column header, in fixed output order.
pub const CANONICAL_COLUMNS: [&str; 17] = [
    "Name",
    "Aliases",
    "Type",
    "Date of Birth",
    "Place of Birth",
    "Gender",
    "Nationality",
    "COUNTRY",
    "ID_1",
    "ID_Type1",
    "ID_2",
    "ID_Type2",
    "Date of listing",
    "Watchlist",
    "Other info",
    "DOB_DJ",
    "DOB_YEAR",
];

/// Origin name given to a table normalized from a document, e.g.
/// `sanctions_from_202501578_20250806_101500`. The embedded numeric code is
/// what EU watchlist derivation keys on during consolidation.
pub fn document_table_origin(stem: &str, timestamp: &str) -> String {
    format!("sanctions_from_{stem}_{timestamp}")
}

/// Get all supported source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![OFAC_SOURCE, UN_SOURCE, DOCUMENT_SOURCE]
}

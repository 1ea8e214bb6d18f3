use crate::constants::CANONICAL_COLUMNS;
use crate::dates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when a list-valued field is rendered into a single cell.
pub const LIST_SEPARATOR: &str = "; ";

/// Kind of sanctioned party a record describes.
///
/// Reference IDs the OFAC delta feed uses that we don't recognize are kept
/// verbatim as `Other("Type {id}")` rather than collapsed to `Unknown`, so
/// nothing is lost before consolidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Individual,
    Entity,
    Vessel,
    Port,
    Airport,
    Airplane,
    Unknown,
    Other(String),
}

impl Default for EntityType {
    fn default() -> Self {
        EntityType::Unknown
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Individual => write!(f, "Individual"),
            EntityType::Entity => write!(f, "Entity"),
            EntityType::Vessel => write!(f, "Vessel"),
            EntityType::Port => write!(f, "Port"),
            EntityType::Airport => write!(f, "Airport"),
            EntityType::Airplane => write!(f, "Airplane"),
            EntityType::Unknown => write!(f, "Unknown"),
            EntityType::Other(label) => write!(f, "{label}"),
        }
    }
}

impl EntityType {
    /// Parses a cell value back into a type; unrecognized labels are kept
    /// verbatim.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Individual" => EntityType::Individual,
            "Entity" => EntityType::Entity,
            "Vessel" => EntityType::Vessel,
            "Port" => EntityType::Port,
            "Airport" => EntityType::Airport,
            "Airplane" => EntityType::Airplane,
            "Unknown" | "" => EntityType::Unknown,
            other => EntityType::Other(other.to_string()),
        }
    }
}

/// One sanctioned party in the canonical 17-column schema.
///
/// List-valued fields stay as ordered vectors until rendered; everything
/// else is free text exactly as the source produced it. A record without a
/// resolvable `name` is discarded at extraction time and never reaches a
/// table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub name: String,
    pub aliases: Vec<String>,
    pub entity_type: EntityType,
    pub date_of_birth: String,
    pub place_of_birth: String,
    pub gender: String,
    pub nationality: Vec<String>,
    pub country: String,
    pub id_1: String,
    pub id_type_1: String,
    pub id_2: String,
    pub id_type_2: String,
    pub date_of_listing: String,
    pub watchlist: String,
    pub other_info: String,
    pub dob_dj: String,
    pub dob_year: String,
}

impl CanonicalRecord {
    /// Renders the record as a row in canonical column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.aliases.join(LIST_SEPARATOR),
            self.entity_type.to_string(),
            self.date_of_birth.clone(),
            self.place_of_birth.clone(),
            self.gender.clone(),
            self.nationality.join(LIST_SEPARATOR),
            self.country.clone(),
            self.id_1.clone(),
            self.id_type_1.clone(),
            self.id_2.clone(),
            self.id_type_2.clone(),
            self.date_of_listing.clone(),
            self.watchlist.clone(),
            self.other_info.clone(),
            self.dob_dj.clone(),
            self.dob_year.clone(),
        ]
    }

    /// Rebuilds a record from a canonical-order row (document-derived
    /// tables arrive this way). Short rows are padded with empty cells;
    /// the `"None"` missing-value sentinel is preserved as-is.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        let list = |i: usize| split_list(&cell(i));
        CanonicalRecord {
            name: cell(0),
            aliases: list(1),
            entity_type: EntityType::from_label(&cell(2)),
            date_of_birth: cell(3),
            place_of_birth: cell(4),
            gender: cell(5),
            nationality: list(6),
            country: cell(7),
            id_1: cell(8),
            id_type_1: cell(9),
            id_2: cell(10),
            id_type_2: cell(11),
            date_of_listing: cell(12),
            watchlist: cell(13),
            other_info: cell(14),
            dob_dj: cell(15),
            dob_year: cell(16),
        }
    }

    pub fn column_count() -> usize {
        CANONICAL_COLUMNS.len()
    }
}

/// Splits a rendered list cell back into its parts.
pub fn split_list(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    cell.split(';')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// One UN consolidated-list entry in the UN-specific intermediate shape.
/// This is not the canonical schema; `map_un_listing` converts it when the
/// consolidation engine ingests a UN table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnListing {
    pub entity_type: EntityType,
    pub name: String,
    pub reference_number: String,
    pub listed_on: String,
    pub gender: String,
    pub designations: Vec<String>,
    pub nationalities: Vec<String>,
    pub aliases: Vec<String>,
    pub dates_of_birth: Vec<String>,
    pub places_of_birth: Vec<String>,
    pub addresses: Vec<String>,
    /// Country parts of the address blocks, kept separately so canonical
    /// country resolution doesn't have to re-parse rendered strings.
    pub address_countries: Vec<String>,
    pub comments: String,
    pub source: String,
}

/// The UN intermediate column set, in fixed order.
pub const UN_COLUMNS: [&str; 13] = [
    "Type",
    "Name",
    "Reference_Number",
    "Listed_On",
    "Gender",
    "Designations",
    "Nationalities",
    "Aliases",
    "Date_of_Birth",
    "Place_of_Birth",
    "Addresses",
    "Comments",
    "Source",
];

impl UnListing {
    /// Renders the listing as a row in UN intermediate column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.entity_type.to_string(),
            self.name.clone(),
            self.reference_number.clone(),
            self.listed_on.clone(),
            self.gender.clone(),
            self.designations.join(LIST_SEPARATOR),
            self.nationalities.join(LIST_SEPARATOR),
            self.aliases.join(LIST_SEPARATOR),
            self.dates_of_birth.join(LIST_SEPARATOR),
            self.places_of_birth.join(LIST_SEPARATOR),
            self.addresses.join(LIST_SEPARATOR),
            self.comments.clone(),
            self.source.clone(),
        ]
    }
}

/// Maps a UN intermediate listing down to the canonical schema.
///
/// Fields with no canonical counterpart (reference number, designations,
/// addresses, comments) fold into `OtherInfo` as labeled segments; the
/// `Source` field only drives Watchlist resolution and is then dropped.
pub fn map_un_listing(listing: &UnListing) -> CanonicalRecord {
    let dob = listing.dates_of_birth.join(LIST_SEPARATOR);

    let country = listing
        .nationalities
        .first()
        .or_else(|| listing.address_countries.first())
        .cloned()
        .unwrap_or_default();

    let mut info_segments = Vec::new();
    if !listing.reference_number.is_empty() {
        info_segments.push(format!("Ref: {}", listing.reference_number));
    }
    if !listing.designations.is_empty() {
        info_segments.push(format!(
            "Designation: {}",
            listing.designations.join(LIST_SEPARATOR)
        ));
    }
    if !listing.addresses.is_empty() {
        info_segments.push(format!(
            "Address: {}",
            listing.addresses.join(LIST_SEPARATOR)
        ));
    }
    if !listing.comments.is_empty() {
        info_segments.push(format!("Note: {}", listing.comments));
    }

    let source_lower = listing.source.to_lowercase();
    let watchlist = if source_lower.contains("un") || source_lower.contains("security council") {
        "UN".to_string()
    } else {
        String::new()
    };

    CanonicalRecord {
        name: listing.name.clone(),
        aliases: listing.aliases.clone(),
        entity_type: listing.entity_type.clone(),
        date_of_birth: dob.clone(),
        place_of_birth: listing.places_of_birth.join(LIST_SEPARATOR),
        gender: listing.gender.clone(),
        nationality: listing.nationalities.clone(),
        country,
        date_of_listing: listing.listed_on.clone(),
        watchlist,
        other_info: info_segments.join(" | "),
        dob_dj: dob.clone(),
        dob_year: dates::extract_year(&dob).unwrap_or_default(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trip() {
        let record = CanonicalRecord {
            name: "ACME SHIPPING LLC".to_string(),
            aliases: vec!["ACME CO".to_string(), "ACME LTD".to_string()],
            entity_type: EntityType::Entity,
            nationality: vec!["Panama".to_string()],
            country: "Panama".to_string(),
            watchlist: "OFAC".to_string(),
            ..Default::default()
        };

        let row = record.to_row();
        assert_eq!(row.len(), CanonicalRecord::column_count());
        assert_eq!(row[1], "ACME CO; ACME LTD");

        let back = CanonicalRecord::from_row(&row);
        assert_eq!(back, record);
    }

    #[test]
    fn unknown_type_label_kept_verbatim() {
        assert_eq!(
            EntityType::from_label("Type 605"),
            EntityType::Other("Type 605".to_string())
        );
        assert_eq!(EntityType::from_label("Type 605").to_string(), "Type 605");
    }

    #[test]
    fn un_mapping_folds_unmapped_fields_into_other_info() {
        let listing = UnListing {
            entity_type: EntityType::Individual,
            name: "DOE JOHN".to_string(),
            reference_number: "QDi.432".to_string(),
            listed_on: "2025-07-30".to_string(),
            designations: vec!["financier".to_string()],
            nationalities: vec!["Mali".to_string()],
            addresses: vec!["Bamako, Mali".to_string()],
            address_countries: vec!["Mali".to_string()],
            comments: "Listed pursuant to resolution 2368".to_string(),
            dates_of_birth: vec!["1958-10-12".to_string()],
            source: "UN Security Council".to_string(),
            ..Default::default()
        };

        let record = map_un_listing(&listing);
        assert_eq!(record.country, "Mali");
        assert_eq!(record.watchlist, "UN");
        assert_eq!(record.date_of_listing, "2025-07-30");
        assert_eq!(record.dob_year, "1958");
        assert!(record.other_info.contains("Ref: QDi.432"));
        assert!(record.other_info.contains("Designation: financier"));
        assert!(record.other_info.contains("Address: Bamako, Mali"));
        assert!(record.other_info.contains("Note: Listed pursuant"));
    }

    #[test]
    fn un_mapping_country_falls_back_to_address() {
        let listing = UnListing {
            entity_type: EntityType::Entity,
            name: "SOME ENTITY".to_string(),
            address_countries: vec!["Yemen".to_string()],
            source: "UN Security Council".to_string(),
            ..Default::default()
        };
        assert_eq!(map_un_listing(&listing).country, "Yemen");
    }
}

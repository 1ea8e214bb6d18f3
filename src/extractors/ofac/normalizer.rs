//! Maps parsed delta entities onto the canonical record schema. Only
//! additive actions survive; modify/delete entities are skipped before any
//! field mapping happens.

use super::parser::DeltaEntity;
use super::reference;
use crate::constants::OFAC_WATCHLIST_LABEL;
use crate::dates;
use crate::schema::{CanonicalRecord, EntityType};
use chrono::NaiveDate;

/// Birthdate formats the feed has been observed to carry, tried in order.
const BIRTHDATE_PATTERNS: [&str; 2] = ["%d %b %Y", "%Y-%m-%d"];

/// Normalizes one delta entity. Returns `None` for non-additive actions and
/// for entities without a resolvable primary name.
pub fn normalize_entity(entity: &DeltaEntity) -> Option<CanonicalRecord> {
    if entity.action != "add" {
        return None;
    }

    let mut record = CanonicalRecord {
        entity_type: entity_type(entity.entity_type_ref.as_deref()),
        ..Default::default()
    };

    // Primary name and aliases. The first primary-flagged translated name
    // wins; every non-primary translation becomes an alias in document
    // order.
    for name in &entity.names {
        for translated in &name.translated {
            if translated.is_empty() {
                continue;
            }
            if name.is_primary {
                if record.name.is_empty() {
                    record.name = translated.clone();
                }
            } else {
                record.aliases.push(translated.clone());
            }
        }
    }
    if record.name.is_empty() {
        return None;
    }

    let mut vessel_flag = String::new();
    for feature in &entity.features {
        if feature.value.is_empty() {
            continue;
        }
        match feature.type_id.as_str() {
            reference::FEATURE_BIRTHDATE => apply_birthdate(&mut record, &feature.value),
            reference::FEATURE_PLACE_OF_BIRTH => record.place_of_birth = feature.value.clone(),
            reference::FEATURE_GENDER => {
                let lower = feature.value.to_lowercase();
                record.gender = if lower == "male" || lower == "female" {
                    lower
                } else {
                    feature.value.clone()
                };
            }
            reference::FEATURE_NATIONALITY => record.nationality.push(feature.value.clone()),
            reference::FEATURE_VESSEL_FLAG => vessel_flag = feature.value.clone(),
            _ => {}
        }
    }

    // Country precedence: vessel flag for vessels, then nationality, then
    // the first address country.
    if record.entity_type == EntityType::Vessel && !vessel_flag.is_empty() {
        record.country = vessel_flag;
    } else if let Some(nationality) = record.nationality.first() {
        record.country = nationality.clone();
    } else if let Some(address_country) = entity.address_countries.first() {
        record.country = address_country.clone();
    }

    // At most two identity documents are retained, first seen wins.
    for doc in entity
        .identity_documents
        .iter()
        .filter(|doc| doc.type_ref.is_some() && !doc.number.is_empty())
        .take(2)
    {
        let type_name = reference::document_type_name(doc.type_ref.as_deref().unwrap_or_default());
        if record.id_1.is_empty() {
            record.id_1 = doc.number.clone();
            record.id_type_1 = type_name;
        } else {
            record.id_2 = doc.number.clone();
            record.id_type_2 = type_name;
        }
    }

    if let Some(list) = &entity.sanctions_list {
        record.watchlist = OFAC_WATCHLIST_LABEL.to_string();
        if let Some(published) = &list.date_published {
            record.date_of_listing = match NaiveDate::parse_from_str(published, "%Y-%m-%d") {
                Ok(date) => date.format("%d/%m/%Y").to_string(),
                Err(_) => published.clone(),
            };
        }
    }

    let programs: Vec<String> = entity
        .program_refs
        .iter()
        .map(|ref_id| reference::sanctions_program_name(ref_id))
        .collect();
    record.other_info = programs.join("; ");

    Some(record)
}

fn entity_type(ref_id: Option<&str>) -> EntityType {
    match ref_id {
        Some(reference::TYPE_INDIVIDUAL) => EntityType::Individual,
        Some(reference::TYPE_ENTITY) => EntityType::Entity,
        Some(reference::TYPE_VESSEL) => EntityType::Vessel,
        Some(other) => EntityType::Other(format!("Type {other}")),
        None => EntityType::Unknown,
    }
}

fn apply_birthdate(record: &mut CanonicalRecord, value: &str) {
    record.date_of_birth = value.to_string();
    for pattern in BIRTHDATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(value, pattern) {
            record.dob_dj = date.format("%d/%m/%Y").to_string();
            record.dob_year = date.format("%Y").to_string();
            return;
        }
    }
    // Fall back to a bare year when no pattern matches.
    if let Some(year) = dates::extract_year(value) {
        record.dob_year = year;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ofac::parser::{
        DeltaDocument, DeltaFeature, DeltaName, SanctionsListRef,
    };

    fn add_entity() -> DeltaEntity {
        DeltaEntity {
            action: "add".to_string(),
            entity_type_ref: Some("600".to_string()),
            names: vec![DeltaName {
                is_primary: true,
                translated: vec!["DOE John".to_string()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn non_add_actions_contribute_nothing() {
        for action in ["modify", "delete", ""] {
            let mut entity = add_entity();
            entity.action = action.to_string();
            assert!(normalize_entity(&entity).is_none());
        }
    }

    #[test]
    fn first_primary_name_wins_and_rest_alias() {
        let mut entity = add_entity();
        entity.names = vec![
            DeltaName {
                is_primary: false,
                translated: vec!["JOHNNY D".to_string()],
            },
            DeltaName {
                is_primary: true,
                translated: vec!["DOE John".to_string()],
            },
            DeltaName {
                is_primary: true,
                translated: vec!["DOE Jonathan".to_string()],
            },
        ];
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.name, "DOE John");
        assert_eq!(record.aliases, vec!["JOHNNY D"]);
    }

    #[test]
    fn birthdate_formats_and_year_fallback() {
        let mut entity = add_entity();
        entity.features = vec![DeltaFeature {
            type_id: "8".to_string(),
            value: "12 Oct 1958".to_string(),
        }];
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.date_of_birth, "12 Oct 1958");
        assert_eq!(record.dob_dj, "12/10/1958");
        assert_eq!(record.dob_year, "1958");

        entity.features[0].value = "1958-10-12".to_string();
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.dob_dj, "12/10/1958");

        entity.features[0].value = "circa 1958".to_string();
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.dob_dj, "");
        assert_eq!(record.dob_year, "1958");
    }

    #[test]
    fn vessel_flag_beats_nationality_for_vessels() {
        let mut entity = add_entity();
        entity.entity_type_ref = Some("602".to_string());
        entity.features = vec![
            DeltaFeature {
                type_id: "3".to_string(),
                value: "Panama".to_string(),
            },
            DeltaFeature {
                type_id: "10".to_string(),
                value: "Liberia".to_string(),
            },
        ];
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.country, "Panama");
        assert_eq!(record.nationality, vec!["Liberia"]);
    }

    #[test]
    fn nationality_beats_address_country_for_individuals() {
        let mut entity = add_entity();
        entity.features = vec![DeltaFeature {
            type_id: "10".to_string(),
            value: "France".to_string(),
        }];
        entity.address_countries = vec!["Belgium".to_string()];
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.country, "France");

        entity.features.clear();
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.country, "Belgium");
    }

    #[test]
    fn identity_documents_cap_at_two() {
        let mut entity = add_entity();
        entity.identity_documents = (0..5)
            .map(|i| DeltaDocument {
                type_ref: Some("1571".to_string()),
                number: format!("P-{i}"),
            })
            .collect();
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.id_1, "P-0");
        assert_eq!(record.id_type_1, "Passport");
        assert_eq!(record.id_2, "P-1");
        assert_eq!(record.id_type_2, "Passport");
    }

    #[test]
    fn listing_date_reformats_with_raw_passthrough() {
        let mut entity = add_entity();
        entity.sanctions_list = Some(SanctionsListRef {
            date_published: Some("2025-07-30".to_string()),
        });
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.watchlist, OFAC_WATCHLIST_LABEL);
        assert_eq!(record.date_of_listing, "30/07/2025");

        entity.sanctions_list = Some(SanctionsListRef {
            date_published: Some("July 2025".to_string()),
        });
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.date_of_listing, "July 2025");
    }

    #[test]
    fn programs_map_into_other_info() {
        let mut entity = add_entity();
        entity.program_refs = vec!["1560".to_string(), "7777".to_string()];
        let record = normalize_entity(&entity).unwrap();
        assert_eq!(record.other_info, "RUSSIA-EO14024; Program 7777");
    }
}

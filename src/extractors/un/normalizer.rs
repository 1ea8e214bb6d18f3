//! Maps raw UN parties onto the UN intermediate shape, applying the
//! two-day listing window.

use super::parser::{RawParty, UnDocument};
use crate::constants::UN_SOURCE_LABEL;
use crate::schema::{EntityType, UnListing};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, warn};

/// The listing-date window: the generation date and the day before it,
/// tolerating processing lag and timezone skew. A strict inclusion filter,
/// not a recency heuristic.
pub fn target_dates(document: &UnDocument) -> [NaiveDate; 2] {
    let generated = document
        .date_generated
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|| {
            warn!("Missing or unparseable dateGenerated; falling back to today");
            Utc::now().date_naive()
        });
    [generated, generated - Duration::days(1)]
}

/// Filters and converts one section's parties. Records whose LISTED_ON is
/// absent or unparseable are skipped, not errors.
pub fn normalize_section(
    parties: &[RawParty],
    entity_type: EntityType,
    window: &[NaiveDate; 2],
) -> Vec<UnListing> {
    let mut listings = Vec::new();
    for party in parties {
        let Ok(listed) = NaiveDate::parse_from_str(&party.listed_on, "%Y-%m-%d") else {
            continue;
        };
        if !window.contains(&listed) {
            continue;
        }
        let listing = normalize_party(party, entity_type.clone());
        if listing.name.is_empty() {
            continue;
        }
        info!("Found {}: {} listed on {}", entity_type, listing.name, listed);
        listings.push(listing);
    }
    listings
}

fn normalize_party(party: &RawParty, entity_type: EntityType) -> UnListing {
    let name = match entity_type {
        // The flat schema reuses FIRST_NAME for entity names.
        EntityType::Entity => party.first_name.clone(),
        _ => {
            let parts = [
                &party.first_name,
                &party.second_name,
                &party.third_name,
                &party.fourth_name,
            ];
            parts
                .iter()
                .filter(|part| !part.is_empty())
                .map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }
    };

    let aliases = party
        .aliases
        .iter()
        .filter(|alias| !alias.name.is_empty())
        .map(|alias| {
            if alias.quality.is_empty() {
                alias.name.clone()
            } else {
                format!("{} ({})", alias.name, alias.quality)
            }
        })
        .collect();

    // Per DOB block: a full date, else a bare year, else a free-text note.
    let dates_of_birth = party
        .dobs
        .iter()
        .filter_map(|dob| {
            [&dob.date, &dob.year, &dob.note]
                .into_iter()
                .find(|value| !value.is_empty())
                .cloned()
        })
        .collect();

    let places_of_birth = party
        .pobs
        .iter()
        .filter_map(|pob| {
            let parts: Vec<&str> = [&pob.city, &pob.state, &pob.country]
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(|part| part.as_str())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        })
        .collect();

    let mut addresses = Vec::new();
    let mut address_countries = Vec::new();
    for addr in &party.addresses {
        let parts: Vec<&str> = [&addr.street, &addr.city, &addr.state, &addr.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect();
        if !addr.country.is_empty() {
            address_countries.push(addr.country.clone());
        }
        if parts.is_empty() {
            continue;
        }
        let mut rendered = parts.join(", ");
        if !addr.note.is_empty() {
            rendered.push_str(&format!(" ({})", addr.note));
        }
        addresses.push(rendered);
    }

    UnListing {
        entity_type,
        name,
        reference_number: party.reference_number.clone(),
        listed_on: party.listed_on.clone(),
        gender: party.gender.clone(),
        designations: party.designations.clone(),
        nationalities: party.nationalities.clone(),
        aliases,
        dates_of_birth,
        places_of_birth,
        addresses,
        address_countries,
        comments: party.comments.clone(),
        source: UN_SOURCE_LABEL.to_string(),
    }
}

//! UN consolidated-list extractor: walks the flat XML roster and keeps only
//! parties listed inside the two-day window around the generation date.

pub mod normalizer;
pub mod parser;

use crate::error::Result;
use crate::schema::EntityType;
use crate::table::UnTable;
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Outcome of one consolidated-list extraction: the two UN intermediate
/// tables plus the window that was applied.
#[derive(Debug)]
pub struct UnExtraction {
    pub individuals: UnTable,
    pub entities: UnTable,
    pub window: [NaiveDate; 2],
    pub total_parties: usize,
}

pub struct UnExtractor;

impl UnExtractor {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, xml))]
    pub fn extract(&self, xml: &str) -> Result<UnExtraction> {
        let document = parser::parse_consolidated(xml)?;
        let window = normalizer::target_dates(&document);
        info!(
            "Looking for listings on {} and {}",
            window[0], window[1]
        );

        let individuals = normalizer::normalize_section(
            &document.individuals,
            EntityType::Individual,
            &window,
        );
        let entities =
            normalizer::normalize_section(&document.entities, EntityType::Entity, &window);

        let total_parties = document.individuals.len() + document.entities.len();
        info!(
            "Matched {} individuals and {} entities out of {} parties",
            individuals.len(),
            entities.len(),
            total_parties
        );

        Ok(UnExtraction {
            individuals: UnTable {
                origin: format!("un_consolidated_{}", window[0]),
                listings: individuals,
            },
            entities: UnTable {
                origin: format!("un_consolidated_entities_{}", window[0]),
                listings: entities,
            },
            window,
            total_parties,
        })
    }
}

impl Default for UnExtractor {
    fn default() -> Self {
        Self::new()
    }
}

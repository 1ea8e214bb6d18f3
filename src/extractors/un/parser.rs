//! Walk of the UN consolidated list document. The format is flat XML with
//! INDIVIDUALS and ENTITIES sections and no namespaces; both party kinds
//! share most substructures, so one raw shape covers them.

use crate::error::Result;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

/// The whole consolidated document, split by section.
#[derive(Debug, Clone, Default)]
pub struct UnDocument {
    /// Value of the root `dateGenerated` attribute, when present.
    pub date_generated: Option<String>,
    pub individuals: Vec<RawParty>,
    pub entities: Vec<RawParty>,
}

/// One INDIVIDUAL or ENTITY element, fields as the feed spells them.
#[derive(Debug, Clone, Default)]
pub struct RawParty {
    pub first_name: String,
    pub second_name: String,
    pub third_name: String,
    pub fourth_name: String,
    pub reference_number: String,
    pub listed_on: String,
    pub gender: String,
    pub comments: String,
    pub designations: Vec<String>,
    pub nationalities: Vec<String>,
    pub aliases: Vec<RawAlias>,
    pub dobs: Vec<RawDateOfBirth>,
    pub pobs: Vec<RawPlace>,
    pub addresses: Vec<RawAddress>,
}

#[derive(Debug, Clone, Default)]
pub struct RawAlias {
    pub name: String,
    pub quality: String,
}

#[derive(Debug, Clone, Default)]
pub struct RawDateOfBirth {
    pub date: String,
    pub year: String,
    pub note: String,
}

#[derive(Debug, Clone, Default)]
pub struct RawPlace {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, Default)]
pub struct RawAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub note: String,
}

fn attr(e: &BytesStart, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn in_scope(stack: &[Vec<u8>], element: &[u8]) -> bool {
    stack.iter().any(|name| name == element)
}

pub fn parse_consolidated(xml: &str) -> Result<UnDocument> {
    let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut document = UnDocument::default();
    let mut party: Option<RawParty> = None;
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name().as_ref().to_vec();
                if document.date_generated.is_none() {
                    document.date_generated = attr(e, "dateGenerated");
                }
                match name.as_slice() {
                    b"INDIVIDUAL" | b"ENTITY" => party = Some(RawParty::default()),
                    b"INDIVIDUAL_ALIAS" | b"ENTITY_ALIAS" => {
                        if let Some(party) = party.as_mut() {
                            party.aliases.push(RawAlias::default());
                        }
                    }
                    b"INDIVIDUAL_DATE_OF_BIRTH" => {
                        if let Some(party) = party.as_mut() {
                            party.dobs.push(RawDateOfBirth::default());
                        }
                    }
                    b"INDIVIDUAL_PLACE_OF_BIRTH" => {
                        if let Some(party) = party.as_mut() {
                            party.pobs.push(RawPlace::default());
                        }
                    }
                    b"INDIVIDUAL_ADDRESS" | b"ENTITY_ADDRESS" => {
                        if let Some(party) = party.as_mut() {
                            party.addresses.push(RawAddress::default());
                        }
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                if document.date_generated.is_none() {
                    document.date_generated = attr(e, "dateGenerated");
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if let Some(party) = party.as_mut() {
                    apply_text(&stack, party, text);
                }
            }
            Ok(Event::End(ref e)) => {
                stack.pop();
                match e.name().as_ref() {
                    b"INDIVIDUAL" => {
                        if let Some(party) = party.take() {
                            document.individuals.push(party);
                        }
                    }
                    b"ENTITY" => {
                        if let Some(party) = party.take() {
                            document.entities.push(party);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Parsed {} individuals and {} entities",
        document.individuals.len(),
        document.entities.len()
    );
    Ok(document)
}

fn apply_text(stack: &[Vec<u8>], party: &mut RawParty, text: &str) {
    let Some(element) = stack.last() else {
        return;
    };

    // Alias, date-of-birth, place-of-birth and address blocks carry
    // overlapping element names (CITY, COUNTRY, NOTE), so scope checks pick
    // the innermost open block first.
    if in_scope(stack, b"INDIVIDUAL_ALIAS") || in_scope(stack, b"ENTITY_ALIAS") {
        if let Some(alias) = party.aliases.last_mut() {
            match element.as_slice() {
                b"ALIAS_NAME" => alias.name = text.to_string(),
                b"QUALITY" => alias.quality = text.to_string(),
                _ => {}
            }
        }
        return;
    }
    if in_scope(stack, b"INDIVIDUAL_DATE_OF_BIRTH") {
        if let Some(dob) = party.dobs.last_mut() {
            match element.as_slice() {
                b"DATE" => dob.date = text.to_string(),
                b"YEAR" => dob.year = text.to_string(),
                b"NOTE" => dob.note = text.to_string(),
                _ => {}
            }
        }
        return;
    }
    if in_scope(stack, b"INDIVIDUAL_PLACE_OF_BIRTH") {
        if let Some(pob) = party.pobs.last_mut() {
            match element.as_slice() {
                b"CITY" => pob.city = text.to_string(),
                b"STATE_PROVINCE" => pob.state = text.to_string(),
                b"COUNTRY" => pob.country = text.to_string(),
                _ => {}
            }
        }
        return;
    }
    if in_scope(stack, b"INDIVIDUAL_ADDRESS") || in_scope(stack, b"ENTITY_ADDRESS") {
        if let Some(address) = party.addresses.last_mut() {
            match element.as_slice() {
                b"STREET" => address.street = text.to_string(),
                b"CITY" => address.city = text.to_string(),
                b"STATE_PROVINCE" => address.state = text.to_string(),
                b"COUNTRY" => address.country = text.to_string(),
                b"NOTE" => address.note = text.to_string(),
                _ => {}
            }
        }
        return;
    }
    if in_scope(stack, b"DESIGNATION") {
        if element.as_slice() == b"VALUE" {
            party.designations.push(text.to_string());
        }
        return;
    }
    if in_scope(stack, b"NATIONALITY") {
        if element.as_slice() == b"VALUE" {
            party.nationalities.push(text.to_string());
        }
        return;
    }

    match element.as_slice() {
        b"FIRST_NAME" => party.first_name = text.to_string(),
        b"SECOND_NAME" => party.second_name = text.to_string(),
        b"THIRD_NAME" => party.third_name = text.to_string(),
        b"FOURTH_NAME" => party.fourth_name = text.to_string(),
        b"REFERENCE_NUMBER" => party.reference_number = text.to_string(),
        b"LISTED_ON" => party.listed_on = text.to_string(),
        b"GENDER" => party.gender = text.to_string(),
        b"COMMENTS1" => party.comments = text.to_string(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<CONSOLIDATED_LIST dateGenerated="2025-07-30T23:00:05.333Z">
  <INDIVIDUALS>
    <INDIVIDUAL>
      <FIRST_NAME>MOHAMED</FIRST_NAME>
      <SECOND_NAME>SALEM</SECOND_NAME>
      <THIRD_NAME>OULD</THIRD_NAME>
      <REFERENCE_NUMBER>QDi.437</REFERENCE_NUMBER>
      <LISTED_ON>2025-07-30</LISTED_ON>
      <GENDER>Male</GENDER>
      <COMMENTS1>Listed pursuant to resolution 2734</COMMENTS1>
      <DESIGNATION><VALUE>emir</VALUE></DESIGNATION>
      <NATIONALITY><VALUE>Mali</VALUE></NATIONALITY>
      <INDIVIDUAL_ALIAS>
        <QUALITY>Good</QUALITY>
        <ALIAS_NAME>ABU QUMQUM</ALIAS_NAME>
      </INDIVIDUAL_ALIAS>
      <INDIVIDUAL_DATE_OF_BIRTH>
        <YEAR>1979</YEAR>
      </INDIVIDUAL_DATE_OF_BIRTH>
      <INDIVIDUAL_PLACE_OF_BIRTH>
        <CITY>Timbuktu</CITY>
        <COUNTRY>Mali</COUNTRY>
      </INDIVIDUAL_PLACE_OF_BIRTH>
      <INDIVIDUAL_ADDRESS>
        <CITY>Gao</CITY>
        <COUNTRY>Mali</COUNTRY>
        <NOTE>as at 2024</NOTE>
      </INDIVIDUAL_ADDRESS>
    </INDIVIDUAL>
    <INDIVIDUAL>
      <FIRST_NAME>OLD</FIRST_NAME>
      <SECOND_NAME>LISTING</SECOND_NAME>
      <LISTED_ON>2011-03-04</LISTED_ON>
    </INDIVIDUAL>
  </INDIVIDUALS>
  <ENTITIES>
    <ENTITY>
      <FIRST_NAME>KATIBAT MACINA</FIRST_NAME>
      <REFERENCE_NUMBER>QDe.175</REFERENCE_NUMBER>
      <LISTED_ON>2025-07-29</LISTED_ON>
      <ENTITY_ALIAS>
        <QUALITY>a.k.a.</QUALITY>
        <ALIAS_NAME>MACINA LIBERATION FRONT</ALIAS_NAME>
      </ENTITY_ALIAS>
      <ENTITY_ADDRESS>
        <COUNTRY>Mali</COUNTRY>
      </ENTITY_ADDRESS>
    </ENTITY>
  </ENTITIES>
</CONSOLIDATED_LIST>"#;

    #[test]
    fn parses_sections_and_root_attribute() {
        let document = parse_consolidated(SAMPLE).unwrap();
        assert_eq!(
            document.date_generated.as_deref(),
            Some("2025-07-30T23:00:05.333Z")
        );
        assert_eq!(document.individuals.len(), 2);
        assert_eq!(document.entities.len(), 1);
    }

    #[test]
    fn captures_nested_blocks() {
        let document = parse_consolidated(SAMPLE).unwrap();
        let individual = &document.individuals[0];
        assert_eq!(individual.first_name, "MOHAMED");
        assert_eq!(individual.third_name, "OULD");
        assert_eq!(individual.listed_on, "2025-07-30");
        assert_eq!(individual.designations, vec!["emir"]);
        assert_eq!(individual.nationalities, vec!["Mali"]);
        assert_eq!(individual.aliases[0].name, "ABU QUMQUM");
        assert_eq!(individual.aliases[0].quality, "Good");
        assert_eq!(individual.dobs[0].year, "1979");
        assert_eq!(individual.pobs[0].city, "Timbuktu");
        assert_eq!(individual.addresses[0].city, "Gao");
        assert_eq!(individual.addresses[0].note, "as at 2024");

        let entity = &document.entities[0];
        assert_eq!(entity.first_name, "KATIBAT MACINA");
        assert_eq!(entity.aliases[0].name, "MACINA LIBERATION FRONT");
        assert_eq!(entity.addresses[0].country, "Mali");
    }

    #[test]
    fn missing_sections_are_tolerated() {
        let document = parse_consolidated(r#"<CONSOLIDATED_LIST dateGenerated="2025-07-30T23:00:05.333Z"/>"#).unwrap();
        assert!(document.individuals.is_empty());
        assert!(document.entities.is_empty());
    }
}

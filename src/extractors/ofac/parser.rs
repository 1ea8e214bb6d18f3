//! Event-driven walk of an OFAC delta-file document into intermediate
//! entity structs. Namespace prefixes are stripped, so the walk is
//! insensitive to the prefix variants the feed has shipped under.

use crate::error::Result;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

/// One `<entity>` element of the delta document, structurally faithful to
/// the feed but flattened to just the substructures extraction needs.
#[derive(Debug, Clone, Default)]
pub struct DeltaEntity {
    pub action: String,
    pub entity_type_ref: Option<String>,
    pub names: Vec<DeltaName>,
    pub features: Vec<DeltaFeature>,
    pub address_countries: Vec<String>,
    pub identity_documents: Vec<DeltaDocument>,
    pub sanctions_list: Option<SanctionsListRef>,
    pub program_refs: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeltaName {
    pub is_primary: bool,
    pub translated: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeltaFeature {
    pub type_id: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct DeltaDocument {
    pub type_ref: Option<String>,
    pub number: String,
}

#[derive(Debug, Clone, Default)]
pub struct SanctionsListRef {
    pub date_published: Option<String>,
}

fn local_name(name: &[u8]) -> &[u8] {
    // strip "prefix:" if present
    if let Some(pos) = name.iter().rposition(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
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

/// Parses all `<entity>` elements out of a delta document, wherever they
/// sit in the tree. An unrecognized document shape simply yields zero
/// entities; the caller decides what to do with an empty result.
pub fn parse_delta(xml: &str) -> Result<Vec<DeltaEntity>> {
    let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut entities: Vec<DeltaEntity> = Vec::new();
    let mut current: Option<DeltaEntity> = None;
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                handle_open(e, &stack, &mut current, &mut entities, false);
                stack.push(local_name(e.name().as_ref()).to_vec());
            }
            Ok(Event::Empty(ref e)) => {
                handle_open(e, &stack, &mut current, &mut entities, true);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if let Some(entity) = current.as_mut() {
                    handle_text(&stack, entity, text);
                }
            }
            Ok(Event::End(ref e)) => {
                stack.pop();
                if local_name(e.name().as_ref()) == b"entity" {
                    if let Some(entity) = current.take() {
                        entities.push(entity);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    debug!("Parsed {} delta entities", entities.len());
    Ok(entities)
}

fn handle_open(
    e: &BytesStart,
    stack: &[Vec<u8>],
    current: &mut Option<DeltaEntity>,
    entities: &mut Vec<DeltaEntity>,
    self_closing: bool,
) {
    let name_buf = e.name();
    let local = local_name(name_buf.as_ref());
    match local {
        b"entity" => {
            let entity = DeltaEntity {
                action: attr(e, "action").unwrap_or_default(),
                ..Default::default()
            };
            if self_closing {
                // An entity with no body still counts as seen.
                entities.push(entity);
            } else {
                *current = Some(entity);
            }
        }
        _ => {
            let Some(entity) = current.as_mut() else {
                return;
            };
            match local {
                b"entityType" => {
                    if entity.entity_type_ref.is_none() {
                        entity.entity_type_ref = attr(e, "refId");
                    }
                }
                b"name" if in_scope(stack, b"names") => {
                    entity.names.push(DeltaName::default());
                }
                b"feature" => {
                    entity.features.push(DeltaFeature::default());
                }
                b"identityDocument" => {
                    entity.identity_documents.push(DeltaDocument::default());
                }
                b"type" => {
                    if in_scope(stack, b"feature") {
                        if let (Some(feature), Some(id)) =
                            (entity.features.last_mut(), attr(e, "featureTypeId"))
                        {
                            feature.type_id = id;
                        }
                    } else if in_scope(stack, b"identityDocument") {
                        if let Some(doc) = entity.identity_documents.last_mut() {
                            doc.type_ref = attr(e, "refId");
                        }
                    }
                }
                b"sanctionsList" => {
                    if entity.sanctions_list.is_none() {
                        entity.sanctions_list = Some(SanctionsListRef {
                            date_published: attr(e, "datePublished"),
                        });
                    }
                }
                b"sanctionsProgram" => {
                    if let Some(ref_id) = attr(e, "refId") {
                        entity.program_refs.push(ref_id);
                    }
                }
                _ => {}
            }
        }
    }
}

fn handle_text(stack: &[Vec<u8>], entity: &mut DeltaEntity, text: &str) {
    let Some(element) = stack.last() else {
        return;
    };
    match element.as_slice() {
        b"isPrimary" => {
            if let Some(name) = entity.names.last_mut() {
                name.is_primary = text == "true";
            }
        }
        b"formattedFullName" if in_scope(stack, b"translation") => {
            if let Some(name) = entity.names.last_mut() {
                name.translated.push(text.to_string());
            }
        }
        b"value" if in_scope(stack, b"feature") => {
            if let Some(feature) = entity.features.last_mut() {
                feature.value.push_str(text);
            }
        }
        b"country" if in_scope(stack, b"address") => {
            entity.address_countries.push(text.to_string());
        }
        b"documentNumber" if in_scope(stack, b"identityDocument") => {
            if let Some(doc) = entity.identity_documents.last_mut() {
                doc.number.push_str(text);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<deltaFile xmlns="https://www.treasury.gov/ofac/DeltaFile/1.0">
  <entities>
    <entity action="add">
      <generalInfo><entityType refId="602">Vessel</entityType></generalInfo>
      <names>
        <name>
          <isPrimary>true</isPrimary>
          <translations><translation><formattedFullName>OCEAN PRIDE</formattedFullName></translation></translations>
        </name>
        <name>
          <isPrimary>false</isPrimary>
          <translations><translation><formattedFullName>PRIDE OF OCEAN</formattedFullName></translation></translations>
        </name>
      </names>
      <features>
        <feature><type featureTypeId="3">Vessel Flag</type><value>Panama</value></feature>
        <feature><type featureTypeId="10">Nationality</type><value>Liberia</value></feature>
      </features>
      <identityDocuments>
        <identityDocument><type refId="91264">MMSI</type><documentNumber>123456789</documentNumber></identityDocument>
        <identityDocument><type refId="1626">Vessel Registration</type><documentNumber>REG-1</documentNumber></identityDocument>
        <identityDocument><type refId="1571">Passport</type><documentNumber>EXTRA</documentNumber></identityDocument>
      </identityDocuments>
      <sanctionsLists>
        <sanctionsList datePublished="2025-07-30">SDN List</sanctionsList>
      </sanctionsLists>
      <sanctionsPrograms>
        <sanctionsProgram refId="1560">RUSSIA-EO14024</sanctionsProgram>
      </sanctionsPrograms>
    </entity>
    <entity action="modify">
      <names>
        <name>
          <isPrimary>true</isPrimary>
          <translations><translation><formattedFullName>SHOULD NOT APPEAR</formattedFullName></translation></translations>
        </name>
      </names>
    </entity>
  </entities>
</deltaFile>"#;

    #[test]
    fn parses_entities_with_actions() {
        let entities = parse_delta(SAMPLE).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].action, "add");
        assert_eq!(entities[1].action, "modify");
    }

    #[test]
    fn captures_substructures() {
        let entities = parse_delta(SAMPLE).unwrap();
        let entity = &entities[0];
        assert_eq!(entity.entity_type_ref.as_deref(), Some("602"));
        assert_eq!(entity.names.len(), 2);
        assert!(entity.names[0].is_primary);
        assert_eq!(entity.names[0].translated, vec!["OCEAN PRIDE"]);
        assert!(!entity.names[1].is_primary);
        assert_eq!(entity.features.len(), 2);
        assert_eq!(entity.features[0].type_id, "3");
        assert_eq!(entity.features[0].value, "Panama");
        assert_eq!(entity.identity_documents.len(), 3);
        assert_eq!(entity.identity_documents[0].number, "123456789");
        assert_eq!(
            entity.sanctions_list.as_ref().unwrap().date_published.as_deref(),
            Some("2025-07-30")
        );
        assert_eq!(entity.program_refs, vec!["1560"]);
    }

    #[test]
    fn unrecognized_shape_yields_no_entities() {
        let entities = parse_delta("<root><nothing/></root>").unwrap();
        assert!(entities.is_empty());
    }
}

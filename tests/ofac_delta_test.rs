use anyhow::Result;
use sanctions_pipeline::extractors::ofac::OfacExtractor;
use sanctions_pipeline::schema::EntityType;

fn delta(entities: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<deltaFile xmlns="https://www.treasury.gov/ofac/DeltaFile/1.0">
  <entities>{entities}</entities>
</deltaFile>"#
    )
}

fn entity(action: &str, body: &str) -> String {
    format!(
        r#"<entity action="{action}">
  <names><name><isPrimary>true</isPrimary>
    <translations><translation><formattedFullName>TEST PARTY</formattedFullName></translation></translations>
  </name></names>
  {body}
</entity>"#
    )
}

#[test]
fn modify_and_delete_actions_contribute_zero_rows() -> Result<()> {
    let xml = delta(&format!(
        "{}{}",
        entity("modify", "<generalInfo><entityType refId=\"600\"/></generalInfo>"),
        entity("delete", "<generalInfo><entityType refId=\"601\"/></generalInfo>"),
    ));
    let extraction = OfacExtractor::new().extract(&xml)?;
    assert_eq!(extraction.table.records.len(), 0);
    assert_eq!(extraction.skipped, 2);
    Ok(())
}

#[test]
fn five_identity_documents_cap_at_two() -> Result<()> {
    let docs: String = (1..=5)
        .map(|i| {
            format!(
                "<identityDocument><type refId=\"1571\"/><documentNumber>DOC-{i}</documentNumber></identityDocument>"
            )
        })
        .collect();
    let xml = delta(&entity(
        "add",
        &format!("<identityDocuments>{docs}</identityDocuments>"),
    ));
    let extraction = OfacExtractor::new().extract(&xml)?;
    let record = &extraction.table.records[0];
    assert_eq!(record.id_1, "DOC-1");
    assert_eq!(record.id_type_1, "Passport");
    assert_eq!(record.id_2, "DOC-2");
    assert_eq!(record.id_type_2, "Passport");
    Ok(())
}

#[test]
fn vessel_flag_wins_over_nationality() -> Result<()> {
    let xml = delta(&entity(
        "add",
        r#"<generalInfo><entityType refId="602"/></generalInfo>
<features>
  <feature><type featureTypeId="3"/><value>Panama</value></feature>
  <feature><type featureTypeId="10"/><value>Liberia</value></feature>
</features>"#,
    ));
    let extraction = OfacExtractor::new().extract(&xml)?;
    let record = &extraction.table.records[0];
    assert_eq!(record.entity_type, EntityType::Vessel);
    assert_eq!(record.country, "Panama");
    Ok(())
}

#[test]
fn unmapped_type_reference_renders_verbatim() -> Result<()> {
    let xml = delta(&entity(
        "add",
        "<generalInfo><entityType refId=\"605\"/></generalInfo>",
    ));
    let extraction = OfacExtractor::new().extract(&xml)?;
    assert_eq!(
        extraction.table.records[0].entity_type.to_string(),
        "Type 605"
    );
    Ok(())
}

//! Configuration files and declared schemas.

use std::sync::Arc;

use anyhow::Context;
use ntest::timeout;
use tempfile::tempdir;

use cd_record_core::schema::{builtin_schemas, SchemaDecl};
use cd_record_core::{
    Area, CdError, CodecConfig, FieldAccess, FieldAccessMut, RecordFactory, RecordKey,
    RecordType, RecordTypeRegistry, Utf8TextCodec,
};

use super::helpers::write_config;

const NOTE_DECL: &str = r#"
name = "CDNOTE"
header = "word"

[[fields]]
name = "Color"
type = "COLOR_VALUE"

[[fields]]
name = "Priority"
type = "WORD"

[[fields]]
name = "TextLen"
type = "WORD"

[[variables]]
name = "Text"
kind = "text"
length_field = "TextLen"
padding = "word"
"#;

#[timeout(1000)]
#[test]
fn test_config_file_limits_records() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "max_record_length = 24\ndefault_area = \"view-map\"\n",
    )
    .unwrap();

    let config = CodecConfig::from_file(&path).unwrap();
    assert_eq!(config.default_area, Area::ViewMap);
    let factory = RecordFactory::with_builtin_records(config).unwrap();
    let mut action = factory.create("CDACTION").unwrap();
    assert_eq!(action.limit(), 24);
    action.set_text("Title", "ok", &Utf8TextCodec).unwrap();
    assert!(matches!(
        action.set_text("Title", "too long", &Utf8TextCodec),
        Err(CdError::SizeLimitExceeded { limit: 24, .. })
    ));
}

#[timeout(1000)]
#[test]
fn test_missing_config_file() {
    let dir = tempdir().unwrap();
    let err = CodecConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, CdError::Config(_)));
}

#[test]
fn test_declared_schema_registers_and_wraps() -> anyhow::Result<()> {
    let decl = SchemaDecl::from_toml(NOTE_DECL)?;
    let schema = Arc::new(decl.build(builtin_schemas()?)?);
    assert_eq!(schema.fixed_size(), 4 + 6 + 2 + 2);

    let registry = Arc::new(RecordTypeRegistry::new());
    let record_type = registry.register(RecordType::new(
        RecordKey::new(0xFF70, Area::RichText),
        Arc::clone(&schema),
    ))?;
    let factory = RecordFactory::new(Arc::clone(&registry), CodecConfig::default())?;

    let mut note = factory.create("CDNOTE")?;
    assert_eq!(note.signature()?, Some(record_type.key.signature));
    note.set_int("Priority", 3u16)?;
    note.set_text("Text", "remember", &Utf8TextCodec)?;

    let entry = factory.wrap(note.as_bytes(), Area::RichText)?;
    let view = entry.view().context("CDNOTE not recognized")?;
    assert_eq!(view.get_int::<u16>("Priority")?, 3);
    assert_eq!(view.get_text("Text", &Utf8TextCodec)?, "remember");

    let description = serde_json::to_value(schema.describe())?;
    assert_eq!(description["fixed_size"], 14);
    assert_eq!(description["variables"][0]["length"], "field:TextLen");
    Ok(())
}

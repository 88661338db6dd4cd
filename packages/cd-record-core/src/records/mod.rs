//! Built-in record schemas.
//!
//! Each submodule declares the layouts of one area as data. Signature values
//! are normalized: the full word for word-header records, the low byte for
//! byte-header records.

mod action;
mod frameset;
mod rich_text;
mod view_map;

use std::sync::Arc;

pub use action::{
    ActionFlag, ActionType, CdAction, SIG_CD_ACTION, SIG_CD_ACTIONEXT, SIG_CD_ACTIONHEADER,
};
pub use frameset::{
    FrameFlag, ScrollStyle, TargetFlag, SIG_CD_FRAME, SIG_CD_FRAMESETHEADER, SIG_CD_TARGET,
};
pub use rich_text::{
    BarBorderType, BarFlag, CellFlag, SIG_CD_BAR, SIG_CD_PARAGRAPH, SIG_CD_TABLEDATAEXTENSION,
    SIG_CD_TEXT,
};
pub use view_map::SIG_CD_VMPOLYLINE;

use crate::error::CdError;
use crate::registry::{Area, RecordKey, RecordType, RecordTypeRegistry};
use crate::schema::{
    builtin_schemas, Primitive, SchemaBuilder, SchemaCache, SchemaError, StructureSchema,
};

crate::cd_flags! {
    pub enum ColorFlag {
        IsRgb = 0x0001,
        NoColor = 0x0004,
        SystemColor = 0x0008,
        HasGradient = 0x0010,
    }
}

fn color_value_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("COLOR_VALUE")
        .flags::<ColorFlag>("Flags", Primitive::U16)
        .int("Component1", Primitive::U8)
        .int("Component2", Primitive::U8)
        .int("Component3", Primitive::U8)
        .int("Component4", Primitive::U8)
        .build()
}

fn point_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("POINT")
        .int("x", Primitive::I16)
        .int("y", Primitive::I16)
        .build()
}

/// Builds every shared structure and built-in record schema into `cache`.
pub(crate) fn register_builtin_schemas(cache: &SchemaCache) -> Result<(), SchemaError> {
    let color: Arc<StructureSchema> = cache.get_or_try_insert_with("COLOR_VALUE", color_value_schema)?;
    let point = cache.get_or_try_insert_with("POINT", point_schema)?;

    cache.get_or_try_insert_with("CDACTION", action::action_schema)?;
    cache.get_or_try_insert_with("CDACTIONEXT", action::action_ext_schema)?;
    cache.get_or_try_insert_with("CDACTIONHEADER", action::action_header_schema)?;
    cache.get_or_try_insert_with("CDTEXT", rich_text::text_schema)?;
    cache.get_or_try_insert_with("CDPARAGRAPH", rich_text::paragraph_schema)?;
    cache.get_or_try_insert_with("CDBAR", rich_text::bar_schema)?;
    cache.get_or_try_insert_with(
        "CDTABLEDATAEXTENSION",
        rich_text::table_data_extension_schema,
    )?;
    cache.get_or_try_insert_with("CDFRAMESETHEADER", frameset::frameset_header_schema)?;
    cache.get_or_try_insert_with("CDFRAME", || frameset::frame_schema(&color))?;
    cache.get_or_try_insert_with("CDTARGET", frameset::target_schema)?;
    cache.get_or_try_insert_with("CDVMPOLYLINE", || view_map::polyline_schema(&point))?;
    Ok(())
}

/// (name, signature, area, encapsulating type)
const BUILTIN_RECORDS: &[(&str, u16, Area, Option<&str>)] = &[
    ("CDTEXT", SIG_CD_TEXT, Area::RichText, None),
    ("CDPARAGRAPH", SIG_CD_PARAGRAPH, Area::RichText, None),
    ("CDBAR", SIG_CD_BAR, Area::RichText, None),
    ("CDTABLEDATAEXTENSION", SIG_CD_TABLEDATAEXTENSION, Area::RichText, None),
    ("CDACTION", SIG_CD_ACTION, Area::RichText, None),
    ("CDACTIONEXT", SIG_CD_ACTIONEXT, Area::RichText, Some("CDACTION")),
    ("CDACTIONHEADER", SIG_CD_ACTIONHEADER, Area::EmbeddedAction, None),
    ("CDFRAMESETHEADER", SIG_CD_FRAMESETHEADER, Area::Frameset, None),
    ("CDFRAME", SIG_CD_FRAME, Area::Frameset, None),
    ("CDTARGET", SIG_CD_TARGET, Area::TargetFrame, None),
    ("CDVMPOLYLINE", SIG_CD_VMPOLYLINE, Area::ViewMap, None),
];

/// Registers every built-in record type.
pub fn register_builtin_records(registry: &RecordTypeRegistry) -> Result<(), CdError> {
    let cache = builtin_schemas()?;
    for &(name, signature, area, encapsulating) in BUILTIN_RECORDS {
        let schema = cache
            .get(name)
            .ok_or_else(|| CdError::UnknownRecordType(name.to_string()))?;
        let mut record_type = RecordType::new(RecordKey::new(signature, area), schema);
        if let Some(outer) = encapsulating {
            record_type = record_type.encapsulated_by(outer);
        }
        registry.register(record_type)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Resolution;

    #[test]
    fn test_builtin_records_register() {
        let registry = RecordTypeRegistry::with_builtin_records().unwrap();
        assert_eq!(registry.len(), BUILTIN_RECORDS.len());

        let frameset = registry.resolve(0xFF01, Area::Frameset);
        let target = registry.resolve(0xFF01, Area::TargetFrame);
        assert_eq!(frameset.known().unwrap().name, "CDFRAMESETHEADER");
        assert_eq!(target.known().unwrap().name, "CDTARGET");
        assert!(matches!(
            registry.resolve(0xFF01, Area::RichText),
            Resolution::Unrecognized(_)
        ));
    }

    #[test]
    fn test_every_builtin_header_matches_signature_form() {
        let cache = builtin_schemas().unwrap();
        for &(name, signature, _, _) in BUILTIN_RECORDS {
            let schema = cache.get(name).unwrap();
            let header = schema.header().unwrap();
            let word_form = signature >> 8 == 0xFF;
            assert_eq!(
                word_form,
                header == crate::record::HeaderKind::Word,
                "{} signature {:#06x}",
                name,
                signature
            );
        }
    }

    #[test]
    fn test_shared_structures() {
        let cache = builtin_schemas().unwrap();
        assert_eq!(cache.size_of("COLOR_VALUE"), Some(6));
        assert_eq!(cache.size_of("POINT"), Some(4));
    }
}

//! Rich text body records.

use crate::record::HeaderKind;
use crate::schema::{
    Primitive, SchemaBuilder, SchemaError, StructureSchema, VariableField, VariableKind,
};

pub const SIG_CD_TEXT: u16 = 0xFF85;
pub const SIG_CD_PARAGRAPH: u16 = 0x0081;
pub const SIG_CD_BAR: u16 = 0xFF58;
pub const SIG_CD_TABLEDATAEXTENSION: u16 = 0xFF9E;

crate::cd_flags! {
    pub enum BarFlag {
        Collapsed = 0x0000_0001,
        NoBorder = 0x0000_0002,
        TextOnly = 0x0000_0004,
        HasColor = 0x0000_0010,
        DisableAutoCollapse = 0x0000_0400,
        UseTwistie = 0x0000_0800,
    }
}

crate::cd_enum! {
    /// Border drawn around a section bar, stored in bits 8-9 of `CDBAR.Flags`.
    pub enum BarBorderType {
        Flat = 0,
        Simple = 1,
        Shadow = 2,
        Double = 3,
    }
}

crate::cd_flags! {
    pub enum CellFlag {
        Spanned = 0x0001,
        HasAltBackground = 0x0002,
    }
}

/// `CDTEXT`: a run of text in one font. The text fills the rest of the record.
pub(crate) fn text_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDTEXT")
        .header(HeaderKind::Word)
        .int("FontID", Primitive::U32)
        .variable(VariableField::remainder("Text", VariableKind::Text))
        .build()
}

/// `CDPARAGRAPH`: paragraph break, header only.
pub(crate) fn paragraph_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDPARAGRAPH")
        .header(HeaderKind::Byte)
        .build()
}

/// `CDBAR`: collapsible section bar with its caption.
pub(crate) fn bar_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDBAR")
        .header(HeaderKind::Word)
        .flags::<BarFlag>("Flags", Primitive::U32)
        .int("FontID", Primitive::U32)
        .masked("BorderType", "Flags", 0x0000_0300, 8)
        .variable(VariableField::remainder("Caption", VariableKind::Text))
        .build()
}

/// `CDTABLEDATAEXTENSION`: per-cell table data. Newer producers append an
/// alternate background color.
pub(crate) fn table_data_extension_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDTABLEDATAEXTENSION")
        .header(HeaderKind::Word)
        .flags::<CellFlag>("Flags", Primitive::U32)
        .int("RowSpan", Primitive::U16)
        .int("ColumnSpan", Primitive::U16)
        .variable(VariableField::trailing("AltBackgroundColor", 6))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Utf8TextCodec;
    use crate::record::{FieldAccess, FieldAccessMut, Record};
    use crate::schema::{Coded, Confidence};
    use std::sync::Arc;

    #[test]
    fn test_text_run_fills_record() {
        let mut record = Record::new(Arc::new(text_schema().unwrap())).unwrap();
        record.set_text("Text", "Hello world", &Utf8TextCodec).unwrap();
        assert_eq!(record.len(), 8 + 11);
        assert_eq!(record.get_text("Text", &Utf8TextCodec).unwrap(), "Hello world");
        record.validate().unwrap();
    }

    #[test]
    fn test_bar_border_type() {
        let mut record = Record::new(Arc::new(bar_schema().unwrap())).unwrap();
        record.set_raw("Flags", 0x0000_0001).unwrap();
        record.set_masked("BorderType", 2).unwrap();
        assert_eq!(record.get_raw("Flags").unwrap(), 0x0000_0201);
        assert_eq!(
            record.get_masked_enum::<BarBorderType>("BorderType").unwrap(),
            Coded::Known(BarBorderType::Shadow)
        );
    }

    #[test]
    fn test_optional_trailing_color() {
        let mut record =
            Record::new(Arc::new(table_data_extension_schema().unwrap())).unwrap();
        let absent = record.variable("AltBackgroundColor").unwrap();
        assert!(absent.bytes.is_empty());
        assert_eq!(absent.confidence, Confidence::VersionDependent);

        record
            .set_variable("AltBackgroundColor", &[1, 0, 10, 20, 30, 0])
            .unwrap();
        assert_eq!(record.len(), 12 + 6);
        assert_eq!(
            record.variable("AltBackgroundColor").unwrap().bytes,
            &[1, 0, 10, 20, 30, 0]
        );
        assert!(record.set_variable("AltBackgroundColor", &[1, 2]).is_err());
    }
}

//! Frameset and target-frame records.
//!
//! `CDFRAMESETHEADER` and `CDTARGET` share signature `0xFF01`; only the area
//! tells them apart.

use std::sync::Arc;

use crate::record::HeaderKind;
use crate::schema::{Padding, Primitive, SchemaBuilder, SchemaError, StructureSchema, VariableField};

pub const SIG_CD_FRAMESETHEADER: u16 = 0xFF01;
pub const SIG_CD_FRAME: u16 = 0xFF03;
pub const SIG_CD_TARGET: u16 = 0xFF01;

crate::cd_flags! {
    pub enum FrameFlag {
        BorderEnable = 0x0000_0001,
        NoResize = 0x0000_0002,
        ScrollBarStyle = 0x0000_0004,
        MarginWidth = 0x0000_0008,
        MarginHeight = 0x0000_0010,
        FrameBorderColor = 0x0000_0020,
        Alignment = 0x0000_0040,
        NotesInitialFocus = 0x0000_0080,
    }
}

crate::cd_enum! {
    pub enum ScrollStyle {
        Always = 1,
        Never = 2,
        Auto = 3,
    }
}

crate::cd_flags! {
    pub enum TargetFlag {
        IsFormula = 0x0001,
    }
}

/// `CDFRAMESETHEADER`: opens a frameset description.
pub(crate) fn frameset_header_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDFRAMESETHEADER")
        .header(HeaderKind::Word)
        .int("Version", Primitive::U16)
        .int("RecCount", Primitive::U16)
        .array("Reserved", Primitive::U32, 4)
        .build()
}

/// `CDFRAME`: one frame with its name, target and border color.
pub(crate) fn frame_schema(color: &Arc<StructureSchema>) -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDFRAME")
        .header(HeaderKind::Word)
        .flags::<FrameFlag>("Flags", Primitive::U32)
        .int("DataFlags", Primitive::U16)
        .int("BorderEnable", Primitive::U8)
        .int("NoResize", Primitive::U8)
        .enumeration::<ScrollStyle>("ScrollBarStyle", Primitive::U16)
        .int("MarginWidth", Primitive::U16)
        .int("MarginHeight", Primitive::U16)
        .int("Reserved1", Primitive::U32)
        .int("FrameNameLength", Primitive::U16)
        .int("Reserved2", Primitive::U16)
        .int("FrameTargetLength", Primitive::U16)
        .substructure("FrameBorderColor", Arc::clone(color))
        .int("Reserved3", Primitive::U16)
        .variable(
            VariableField::text("FrameName", "FrameNameLength").with_padding(Padding::Word),
        )
        .variable(VariableField::text("FrameTarget", "FrameTargetLength"))
        .build()
}

/// `CDTARGET`: target frame of a link, literal or computed.
pub(crate) fn target_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDTARGET")
        .header(HeaderKind::Word)
        .int("TargetLength", Primitive::U16)
        .flags::<TargetFlag>("Flags", Primitive::U16)
        .int("Reserved", Primitive::U32)
        .variable(VariableField::text("Target", "TargetLength"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Utf8TextCodec;
    use crate::record::{FieldAccess, FieldAccessMut, Record};
    use crate::schema::{builtin_schemas, Coded};

    #[test]
    fn test_frame_layout() {
        let cache = builtin_schemas().unwrap();
        let schema = cache.get("CDFRAME").unwrap();
        assert_eq!(schema.fixed_size(), 36);
        let (offset, component) = schema.locate("FrameBorderColor.Component1").unwrap();
        assert_eq!(offset, 28 + 2);
        assert_eq!(component.size, 1);
    }

    #[test]
    fn test_frame_fields() {
        let schema = builtin_schemas().unwrap().get("CDFRAME").unwrap();
        let mut record = Record::new(schema).unwrap();
        record.set_enum("ScrollBarStyle", ScrollStyle::Auto).unwrap();
        record.set_int("FrameBorderColor.Component2", 200u8).unwrap();
        record.set_text("FrameName", "nav", &Utf8TextCodec).unwrap();
        record.set_text("FrameTarget", "_top", &Utf8TextCodec).unwrap();

        assert_eq!(
            record.get_enum::<ScrollStyle>("ScrollBarStyle").unwrap(),
            Coded::Known(ScrollStyle::Auto)
        );
        let color = record.substructure("FrameBorderColor").unwrap();
        assert_eq!(color.get_int::<u8>("Component2").unwrap(), 200);
        assert_eq!(record.get_text("FrameTarget", &Utf8TextCodec).unwrap(), "_top");
        // 3 bytes of name plus pad, 4 bytes of target
        assert_eq!(record.len(), 36 + 4 + 4);
        record.validate().unwrap();
    }
}

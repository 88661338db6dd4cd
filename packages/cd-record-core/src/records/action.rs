//! Action bar records.

use crate::codec::{FormulaCodec, TextCodec};
use crate::error::CdError;
use crate::record::{FieldAccess, FieldAccessMut, HeaderKind, Record};
use crate::schema::{
    Coded, FlagSet, Padding, Primitive, SchemaBuilder, SchemaError, StructureSchema,
    VariableField,
};

pub const SIG_CD_ACTION: u16 = 0xFFD6;
pub const SIG_CD_ACTIONEXT: u16 = 0xFFD5;
pub const SIG_CD_ACTIONHEADER: u16 = 0x00D9;

crate::cd_enum! {
    /// What an action runs.
    pub enum ActionType {
        RunFormula = 1,
        RunScript = 2,
        RunAgent = 3,
        OldSystem = 4,
        System = 5,
        RunJavaScript = 6,
    }
}

crate::cd_flags! {
    pub enum ActionFlag {
        ShowInMenu = 0x0000_0001,
        ShowInBar = 0x0000_0002,
        ShowWhenPreviewing = 0x0000_0004,
        ShowWhenEditing = 0x0000_0008,
        ShowOnOleLaunch = 0x0000_0010,
        OleCloseWhenChosen = 0x0000_0020,
        NoFormula = 0x0000_0040,
        ShowWhenPreviewEditing = 0x0000_0080,
        OleDocWindowToFront = 0x0000_1000,
        HideFromNotes = 0x0000_2000,
        HideFromWeb = 0x0000_4000,
        ReadingOrderRtl = 0x0000_8000,
        IsShared = 0x0004_0000,
        ModifiedShared = 0x0008_0000,
    }
}

/// `CDACTION`: one action bar button with its title and body.
///
/// The body following the title is a compiled formula for
/// [`ActionType::RunFormula`] and script source for [`ActionType::RunScript`];
/// `FormulaLen` counts it either way.
pub(crate) fn action_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDACTION")
        .header(HeaderKind::Word)
        .enumeration::<ActionType>("Type", Primitive::U16)
        .int("IconIndex", Primitive::U16)
        .flags::<ActionFlag>("Flags", Primitive::U32)
        .int("TitleLen", Primitive::U16)
        .int("FormulaLen", Primitive::U16)
        .int("ShareId", Primitive::U32)
        .variable(VariableField::text("Title", "TitleLen").with_padding(Padding::Word))
        .variable(VariableField::formula("Formula", "FormulaLen"))
        .build()
}

/// `CDACTIONEXT`: web and control settings that accompany a `CDACTION`.
pub(crate) fn action_ext_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDACTIONEXT")
        .header(HeaderKind::Word)
        .int("Flags", Primitive::U32)
        .int("ControlType", Primitive::U16)
        .int("ControlFormat", Primitive::U16)
        .int("LabelFormulaLen", Primitive::U16)
        .int("ParentLabelFormulaLen", Primitive::U16)
        .int("CompActionIdLen", Primitive::U16)
        .int("ProgrammaticUseTextLen", Primitive::U16)
        .int("ExtFlags", Primitive::U32)
        .variable(VariableField::formula("LabelFormula", "LabelFormulaLen"))
        .variable(VariableField::formula(
            "ParentLabelFormula",
            "ParentLabelFormulaLen",
        ))
        .variable(VariableField::text("CompActionId", "CompActionIdLen"))
        .variable(VariableField::text(
            "ProgrammaticUseText",
            "ProgrammaticUseTextLen",
        ))
        .build()
}

/// `CDACTIONHEADER`: opens an embedded action bar.
pub(crate) fn action_header_schema() -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDACTIONHEADER")
        .header(HeaderKind::Byte)
        .build()
}

/// Typed accessors over a `CDACTION` record or view.
#[derive(Debug)]
pub struct CdAction<A> {
    inner: A,
}

impl<A: FieldAccess> CdAction<A> {
    /// Wraps `inner`, which must be laid out as `CDACTION`.
    pub fn new(inner: A) -> Result<Self, CdError> {
        let name = inner.schema().name();
        if name != "CDACTION" {
            return Err(CdError::KindMismatch {
                structure: name.to_string(),
                field: "Header".to_string(),
                expected: "CDACTION".to_string(),
                actual: name.to_string(),
            });
        }
        Ok(Self { inner })
    }

    pub fn get_ref(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }

    pub fn action_type(&self) -> Result<Coded<ActionType>, CdError> {
        self.inner.get_enum("Type")
    }

    pub fn icon_index(&self) -> Result<u16, CdError> {
        self.inner.get_int("IconIndex")
    }

    pub fn flags(&self) -> Result<FlagSet<ActionFlag>, CdError> {
        self.inner.get_flags("Flags")
    }

    pub fn share_id(&self) -> Result<u32, CdError> {
        self.inner.get_int("ShareId")
    }

    pub fn title(&self, codec: &dyn TextCodec) -> Result<String, CdError> {
        self.inner.get_text("Title", codec)
    }

    /// Formula body of a formula action.
    ///
    /// # Panics
    /// Panics if the action type is not [`ActionType::RunFormula`].
    pub fn formula(&self, codec: &dyn FormulaCodec) -> Result<String, CdError> {
        let action_type = self.action_type()?;
        assert_eq!(
            action_type,
            Coded::Known(ActionType::RunFormula),
            "formula requested from a {:?} action",
            action_type
        );
        self.inner.get_formula("Formula", codec)
    }

    /// Script source of a script action.
    ///
    /// # Panics
    /// Panics if the action type is not [`ActionType::RunScript`].
    pub fn script(&self, codec: &dyn TextCodec) -> Result<String, CdError> {
        let action_type = self.action_type()?;
        assert_eq!(
            action_type,
            Coded::Known(ActionType::RunScript),
            "script requested from a {:?} action",
            action_type
        );
        codec.decode(self.inner.variable("Formula")?.bytes)
    }
}

impl CdAction<Record> {
    pub fn set_title(&mut self, title: &str, codec: &dyn TextCodec) -> Result<(), CdError> {
        self.inner.set_text("Title", title, codec)
    }

    pub fn set_flags(&mut self, flags: &FlagSet<ActionFlag>) -> Result<(), CdError> {
        self.inner.set_flags("Flags", flags)
    }

    pub fn set_icon_index(&mut self, index: u16) -> Result<(), CdError> {
        self.inner.set_int("IconIndex", index)
    }

    /// Makes this a formula action running `formula`.
    pub fn set_formula(&mut self, formula: &str, codec: &dyn FormulaCodec) -> Result<(), CdError> {
        self.inner.set_formula("Formula", formula, codec)?;
        self.inner.set_enum("Type", ActionType::RunFormula)
    }

    /// Makes this a script action running `script`.
    pub fn set_script(&mut self, script: &str, codec: &dyn TextCodec) -> Result<(), CdError> {
        let encoded = codec.encode(script)?;
        self.inner.set_variable("Formula", &encoded)?;
        self.inner.set_enum("Type", ActionType::RunScript)
    }
}

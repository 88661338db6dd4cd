//! Variable tail field specifications.
//!
//! Variable fields have no stored offset. Their position is the running sum
//! of the extents of every earlier variable field, evaluated against the
//! current values of the length fields on every access.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::structure::StructureSchema;

/// Content of a variable field. Content is opaque to the engine except for
/// `Text`, which passes through a [`TextCodec`](crate::codec::TextCodec).
#[derive(Debug, Clone)]
pub enum VariableKind {
    /// Text in the legacy multi-byte charset
    Text,
    /// Compiled formula bytes
    Formula,
    /// Compiled or source script bytes
    Script,
    /// Uninterpreted bytes
    Blob,
    /// Packed list of fixed-size sub-structures
    List(Arc<StructureSchema>),
}

impl VariableKind {
    pub fn describe(&self) -> String {
        match self {
            VariableKind::Text => "text".to_string(),
            VariableKind::Formula => "formula".to_string(),
            VariableKind::Script => "script".to_string(),
            VariableKind::Blob => "blob".to_string(),
            VariableKind::List(schema) => format!("list:{}", schema.name()),
        }
    }
}

/// Where the byte length of a variable field comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthSource {
    /// Byte length stored in a fixed integer field
    Field(String),
    /// Element count stored in a fixed integer field
    Counted {
        count_field: String,
        element_size: usize,
    },
    /// Everything up to the declared record length
    Remainder,
    /// Fixed-size block present only when enough declared bytes remain
    Trailing { size: usize },
}

impl LengthSource {
    /// Name of the fixed field that stores the length or count.
    pub fn field(&self) -> Option<&str> {
        match self {
            LengthSource::Field(name) => Some(name),
            LengthSource::Counted { count_field, .. } => Some(count_field),
            LengthSource::Remainder | LengthSource::Trailing { .. } => None,
        }
    }

    /// Whether the extent is derived from the declared total length.
    pub fn is_open_ended(&self) -> bool {
        matches!(self, LengthSource::Remainder | LengthSource::Trailing { .. })
    }
}

/// Alignment padding after a variable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    #[default]
    None,
    /// One uncounted zero byte follows an odd-length value
    Word,
}

/// How far a decode path can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    #[default]
    Confirmed,
    /// Layout differs between producer releases; decoded best-effort
    VersionDependent,
}

/// A named field in the variable tail.
#[derive(Debug, Clone)]
pub struct VariableField {
    pub name: String,
    pub kind: VariableKind,
    pub length: LengthSource,
    pub padding: Padding,
    pub confidence: Confidence,
}

impl VariableField {
    pub fn new(name: impl Into<String>, kind: VariableKind, length: LengthSource) -> Self {
        let confidence = match length {
            LengthSource::Trailing { .. } => Confidence::VersionDependent,
            _ => Confidence::Confirmed,
        };
        Self {
            name: name.into(),
            kind,
            length,
            padding: Padding::None,
            confidence,
        }
    }

    /// Text whose byte length lives in `length_field`.
    pub fn text(name: impl Into<String>, length_field: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Text, LengthSource::Field(length_field.into()))
    }

    /// Compiled formula whose byte length lives in `length_field`.
    pub fn formula(name: impl Into<String>, length_field: impl Into<String>) -> Self {
        Self::new(
            name,
            VariableKind::Formula,
            LengthSource::Field(length_field.into()),
        )
    }

    /// Script bytes whose byte length lives in `length_field`.
    pub fn script(name: impl Into<String>, length_field: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Script, LengthSource::Field(length_field.into()))
    }

    /// Opaque bytes whose byte length lives in `length_field`.
    pub fn blob(name: impl Into<String>, length_field: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Blob, LengthSource::Field(length_field.into()))
    }

    /// List of `element` structures whose count lives in `count_field`.
    pub fn list(
        name: impl Into<String>,
        element: Arc<StructureSchema>,
        count_field: impl Into<String>,
    ) -> Self {
        let element_size = element.fixed_size();
        Self::new(
            name,
            VariableKind::List(element),
            LengthSource::Counted {
                count_field: count_field.into(),
                element_size,
            },
        )
    }

    /// Field running to the declared end of the record.
    pub fn remainder(name: impl Into<String>, kind: VariableKind) -> Self {
        Self::new(name, kind, LengthSource::Remainder)
    }

    /// Optional trailing block of `size` bytes.
    pub fn trailing(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, VariableKind::Blob, LengthSource::Trailing { size })
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn version_dependent(mut self) -> Self {
        self.confidence = Confidence::VersionDependent;
        self
    }

    /// Stored extent of a value of `len` bytes.
    pub fn extent(&self, len: usize, pads_present: bool) -> usize {
        if pads_present && self.padding == Padding::Word && len % 2 == 1 {
            len + 1
        } else {
            len
        }
    }
}

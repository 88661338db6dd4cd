//! Navigator (view map) drawing records.

use std::sync::Arc;

use crate::record::HeaderKind;
use crate::schema::{Primitive, SchemaBuilder, SchemaError, StructureSchema, VariableField};

pub const SIG_CD_VMPOLYLINE: u16 = 0xFF0B;

/// `CDVMPOLYLINE`: an open polyline. The points follow the fixed part.
pub(crate) fn polyline_schema(point: &Arc<StructureSchema>) -> Result<StructureSchema, SchemaError> {
    SchemaBuilder::new("CDVMPOLYLINE")
        .header(HeaderKind::Word)
        .int("LineColor", Primitive::U16)
        .int("PenStyle", Primitive::U16)
        .int("PenWidth", Primitive::U16)
        .int("PointCount", Primitive::U16)
        .variable(VariableField::list("Points", Arc::clone(point), "PointCount"))
        .build()
}

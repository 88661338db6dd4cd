//! Record buffers, views and typed field access.

mod access;
mod buffer;
mod header;
#[allow(clippy::module_inception)]
mod record;
mod tail;
mod view;

pub use access::{FieldAccess, FieldAccessMut, VariableValue};
pub use buffer::{RecordBuffer, ViewHandle};
pub use header::{HeaderKind, RecordHeader};
pub use record::Record;
pub use tail::{TailLayout, TailSpan};
pub use view::{RecordMut, RecordRef};

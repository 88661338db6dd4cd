//! Text and formula collaborators.
//!
//! The engine moves bytes; turning them into strings is delegated. Text goes
//! through a [`TextCodec`] for the legacy multi-byte charset, compiled formulas
//! through a [`FormulaCodec`].

use crate::error::CdError;

/// Converts between strings and the stored text encoding.
pub trait TextCodec: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u8>, CdError>;

    fn decode(&self, bytes: &[u8]) -> Result<String, CdError>;
}

/// Compiles formula source to its stored form and back.
pub trait FormulaCodec: Send + Sync {
    fn compile(&self, source: &str) -> Result<Vec<u8>, CdError>;

    fn decompile(&self, compiled: &[u8]) -> Result<String, CdError>;
}

/// Plain UTF-8 text. Suitable for ASCII content and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8TextCodec;

impl TextCodec for Utf8TextCodec {
    fn encode(&self, text: &str) -> Result<Vec<u8>, CdError> {
        Ok(text.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CdError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| CdError::Codec(e.to_string()))
    }
}

/// Stores formula source verbatim as UTF-8.
///
/// Stands in for a real formula compiler where only the byte plumbing
/// matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFormulaCodec;

impl FormulaCodec for SourceFormulaCodec {
    fn compile(&self, source: &str) -> Result<Vec<u8>, CdError> {
        Ok(source.as_bytes().to_vec())
    }

    fn decompile(&self, compiled: &[u8]) -> Result<String, CdError> {
        String::from_utf8(compiled.to_vec()).map_err(|e| CdError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_codec() {
        let codec = Utf8TextCodec;
        assert_eq!(codec.encode("Hello").unwrap(), b"Hello");
        assert_eq!(codec.decode(b"Hello").unwrap(), "Hello");
        assert!(matches!(codec.decode(&[0xFF, 0xFE]), Err(CdError::Codec(_))));
    }

    #[test]
    fn test_source_formula_codec() {
        let codec = SourceFormulaCodec;
        let compiled = codec.compile("@Command([FileSave])").unwrap();
        assert_eq!(codec.decompile(&compiled).unwrap(), "@Command([FileSave])");
    }
}

//! Shared fixtures for the integration tests.

use std::path::{Path, PathBuf};

use anyhow::Context;

use cd_record_core::config::CodecConfig;
use cd_record_core::factory::RecordFactory;
use cd_record_core::records::{ActionType, CdAction};
use cd_record_core::{Record, SourceFormulaCodec, Utf8TextCodec};

pub fn factory() -> RecordFactory {
    RecordFactory::with_builtin_records(CodecConfig::default()).unwrap()
}

/// Formula action with the given title and formula source.
pub fn formula_action(factory: &RecordFactory, title: &str, formula: &str) -> CdAction<Record> {
    let mut action = CdAction::new(factory.create("CDACTION").unwrap()).unwrap();
    action.set_title(title, &Utf8TextCodec).unwrap();
    action.set_formula(formula, &SourceFormulaCodec).unwrap();
    assert_eq!(
        action.action_type().unwrap().known(),
        Some(ActionType::RunFormula)
    );
    action
}

/// Little-endian POINT list bytes.
pub fn points(coords: &[(i16, i16)]) -> Vec<u8> {
    coords
        .iter()
        .flat_map(|(x, y)| x.to_le_bytes().into_iter().chain(y.to_le_bytes()))
        .collect()
}

/// Writes a codec config file into `dir`.
pub fn write_config(dir: &Path, contents: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join("codec.toml");
    std::fs::write(&path, contents)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

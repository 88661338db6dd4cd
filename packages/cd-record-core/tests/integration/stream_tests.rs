//! Record streams and area-scoped signature resolution.

use std::sync::Arc;

use ntest::timeout;

use cd_record_core::records::{SIG_CD_FRAMESETHEADER, SIG_CD_TARGET};
use cd_record_core::stream::RecordStreamWriter;
use cd_record_core::{
    Area, CdError, CodecConfig, FieldAccess, RecordKey, RecordType, RecordTypeRegistry,
    Resolution, StreamEntry, Utf8TextCodec,
};

use super::helpers::factory;

#[timeout(1000)]
#[test]
fn test_stream_skips_records_of_other_areas() {
    let factory = factory();
    let mut text = factory.create("CDTEXT").unwrap();
    text.set_text("Text", "abc", &Utf8TextCodec).unwrap();
    let frameset = factory.create("CDFRAMESETHEADER").unwrap();
    let paragraph = factory.create("CDPARAGRAPH").unwrap();

    let mut writer = RecordStreamWriter::new(factory.config());
    writer.push(&text).unwrap();
    writer.push(&frameset).unwrap();
    writer.push(&paragraph).unwrap();
    assert_eq!(writer.len(), 3);
    let data = writer.finish();
    // 11-byte text run is followed by a pad byte
    assert_eq!(data.len(), 12 + 24 + 2);

    let entries: Vec<_> = factory
        .stream(&data, Area::RichText)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries[0].view().unwrap().get_text("Text", &Utf8TextCodec).unwrap(),
        "abc"
    );
    match &entries[1] {
        StreamEntry::Unrecognized { key, offset, length } => {
            assert_eq!(key.signature, SIG_CD_FRAMESETHEADER);
            assert_eq!(*offset, 12);
            assert_eq!(*length, 24);
        }
        other => panic!("expected unrecognized record, got {:?}", other),
    }
    assert_eq!(entries[2].offset(), 36);
    assert_eq!(entries[2].view().unwrap().schema().name(), "CDPARAGRAPH");
}

#[timeout(1000)]
#[test]
fn test_shared_signature_resolves_per_area() {
    let factory = factory();
    let target = factory.create("CDTARGET").unwrap();
    assert_eq!(target.signature().unwrap(), Some(SIG_CD_TARGET));

    let in_frameset = factory.wrap(target.as_bytes(), Area::Frameset).unwrap();
    let in_target = factory.wrap(target.as_bytes(), Area::TargetFrame).unwrap();
    let in_view_map = factory.wrap(target.as_bytes(), Area::ViewMap).unwrap();

    assert_eq!(
        in_frameset.view().unwrap().schema().name(),
        "CDFRAMESETHEADER"
    );
    assert_eq!(in_target.view().unwrap().schema().name(), "CDTARGET");
    assert!(in_view_map.view().is_none());
}

#[timeout(1000)]
#[test]
fn test_registry_rejects_second_type_at_key() {
    let factory = factory();
    let registry = factory.registry();
    let schema = Arc::clone(&registry.by_name("CDTARGET").unwrap().schema);

    let clash = RecordType::new(RecordKey::new(0xFF01, Area::Frameset), Arc::clone(&schema));
    assert!(registry.register(clash).is_err());
    assert!(matches!(
        registry.resolve(0xFF01, Area::Frameset),
        Resolution::Known(ref t) if t.name == "CDFRAMESETHEADER"
    ));

    // the same schema is free to live under an unused area
    let fresh = RecordTypeRegistry::new();
    fresh
        .register(RecordType::new(
            RecordKey::new(0xFF01, Area::AltSequence),
            schema,
        ))
        .unwrap();
    assert!(fresh.contains(&RecordKey::new(0xFF01, Area::AltSequence)));
}

#[timeout(1000)]
#[test]
fn test_truncated_record_ends_stream() {
    let factory = factory();
    let paragraph = factory.create("CDPARAGRAPH").unwrap();
    let mut data = paragraph.as_bytes().to_vec();
    // CDTEXT header claiming 40 bytes with only 6 present
    data.extend_from_slice(&[0x85, 0xFF, 40, 0, 1, 2]);

    let results: Vec<_> = factory.stream(&data, Area::RichText).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(CdError::Truncated { offset: 2, .. })
    ));
}

#[timeout(1000)]
#[test]
fn test_unaligned_streams() {
    let config = CodecConfig {
        word_aligned_records: false,
        ..CodecConfig::default()
    };
    let factory = cd_record_core::RecordFactory::with_builtin_records(config).unwrap();
    let mut text = factory.create("CDTEXT").unwrap();
    text.set_text("Text", "abc", &Utf8TextCodec).unwrap();
    let paragraph = factory.create("CDPARAGRAPH").unwrap();

    let mut writer = RecordStreamWriter::new(factory.config());
    writer.push(&text).unwrap();
    writer.push(&paragraph).unwrap();
    let data = writer.finish();
    assert_eq!(data.len(), 11 + 2);

    let offsets: Vec<usize> = factory
        .stream(&data, Area::RichText)
        .map(|entry| entry.unwrap().offset())
        .collect();
    assert_eq!(offsets, vec![0, 11]);
}

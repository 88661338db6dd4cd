//! Built-in record access through the public API.

use ntest::timeout;

use cd_record_core::records::{ActionFlag, ActionType, BarBorderType, CdAction, FrameFlag};
use cd_record_core::schema::Confidence;
use cd_record_core::{
    CdError, Coded, FieldAccess, FieldAccessMut, FlagSet, SourceFormulaCodec, Utf8TextCodec,
};

use super::helpers::{factory, formula_action, points};

#[timeout(1000)]
#[test]
fn test_action_title_then_formula() {
    let factory = factory();
    let action = formula_action(&factory, "Hello", "@Command([FileSave])");
    let record = action.get_ref();

    assert_eq!(record.get_int::<u16>("TitleLen").unwrap(), 5);
    assert_eq!(record.get_int::<u16>("FormulaLen").unwrap(), 20);
    let tail = record.tail().unwrap();
    // odd title is padded to the next word
    assert_eq!(tail.spans()[1].start, 20 + 6);
    assert_eq!(record.len(), 20 + 6 + 20);
    assert_eq!(record.declared_length().unwrap(), record.len());
    assert_eq!(
        action.formula(&SourceFormulaCodec).unwrap(),
        "@Command([FileSave])"
    );
    record.validate().unwrap();
}

#[timeout(1000)]
#[test]
fn test_action_flags_combine() {
    let factory = factory();
    let mut action = formula_action(&factory, "Save", "1");
    let flags = FlagSet::from_flags([ActionFlag::ShowInMenu, ActionFlag::ShowWhenPreviewing]);
    action.set_flags(&flags).unwrap();
    assert_eq!(action.get_ref().get_raw("Flags").unwrap(), 0x5);

    let read = action.flags().unwrap();
    assert!(read.contains(ActionFlag::ShowInMenu));
    assert!(!read.contains(ActionFlag::ShowInBar));
    assert_eq!(read.unknown_bits(), 0);
}

#[timeout(1000)]
#[test]
fn test_unknown_codes_pass_through() {
    let factory = factory();
    let mut action = formula_action(&factory, "Run", "1");
    let mut record = action.get_ref().clone();
    record.set_raw("Type", 42).unwrap();
    record.set_raw("Flags", 0x0100_0001).unwrap();
    action = CdAction::new(record).unwrap();

    assert_eq!(action.action_type().unwrap(), Coded::<ActionType>::Unknown(42));
    let flags = action.flags().unwrap();
    assert!(flags.contains(ActionFlag::ShowInMenu));
    assert_eq!(flags.unknown_bits(), 0x0100_0000);

    // rewriting known flags keeps the unknown bit
    let mut record = action.into_inner();
    record
        .set_flags("Flags", &FlagSet::from_flags([ActionFlag::ShowInBar]))
        .unwrap();
    assert_eq!(record.get_raw("Flags").unwrap(), 0x0100_0002);
}

#[timeout(1000)]
#[test]
fn test_resize_keeps_siblings() {
    let factory = factory();
    let mut action = formula_action(&factory, "Hello", "abc");
    action.set_title("Hi!!", &Utf8TextCodec).unwrap();

    let record = action.get_ref();
    assert_eq!(record.len(), 20 + 4 + 3);
    assert_eq!(action.title(&Utf8TextCodec).unwrap(), "Hi!!");
    assert_eq!(action.formula(&SourceFormulaCodec).unwrap(), "abc");
    record.validate().unwrap();
}

#[timeout(1000)]
#[test]
fn test_resize_over_limit_leaves_record_unchanged() {
    let factory = factory();
    let action = formula_action(&factory, "Hello", "abc");
    let mut record = action.into_inner().with_limit(32);
    let before = record.as_bytes().to_vec();

    let err = record
        .set_text("Title", "A much longer title", &Utf8TextCodec)
        .unwrap_err();
    assert!(matches!(err, CdError::SizeLimitExceeded { limit: 32, .. }));
    assert_eq!(record.as_bytes(), &before[..]);
}

#[timeout(1000)]
#[test]
fn test_stale_handle_after_resize() {
    let factory = factory();
    let mut record = formula_action(&factory, "Hello", "abc").into_inner();
    let handle = record.variable_handle("Formula").unwrap();
    assert_eq!(record.resolve(&handle).unwrap(), b"abc");

    record.set_text("Title", "Hi", &Utf8TextCodec).unwrap();
    assert!(matches!(
        record.resolve(&handle),
        Err(CdError::StaleView { .. })
    ));
    let fresh = record.variable_handle("Formula").unwrap();
    assert_eq!(record.resolve(&fresh).unwrap(), b"abc");
}

#[timeout(1000)]
#[test]
fn test_frame_color_path() {
    let factory = factory();
    let mut frame = factory.create("CDFRAME").unwrap();
    frame
        .set_flags("Flags", &FlagSet::from_flags([FrameFlag::FrameBorderColor]))
        .unwrap();
    frame.set_int("FrameBorderColor.Component1", 0x12u8).unwrap();
    frame.set_int("FrameBorderColor.Component3", 0x34u8).unwrap();

    let color = frame.substructure("FrameBorderColor").unwrap();
    assert_eq!(color.get_int::<u8>("Component1").unwrap(), 0x12);
    assert_eq!(color.get_int::<u8>("Component3").unwrap(), 0x34);
    assert!(matches!(
        frame.set_int("FrameBorderColor.Component1", 300u16),
        Err(CdError::ValueOutOfRange { .. })
    ));
}

#[timeout(1000)]
#[test]
fn test_bar_border_bits_survive_flag_writes() {
    let factory = factory();
    let mut bar = factory.create("CDBAR").unwrap();
    bar.set_masked("BorderType", 3).unwrap();
    bar.set_flags("Flags", &FlagSet::from_flags([cd_record_core::records::BarFlag::Collapsed]))
        .unwrap();
    assert_eq!(
        bar.get_masked_enum::<BarBorderType>("BorderType").unwrap(),
        Coded::Known(BarBorderType::Double)
    );
    assert_eq!(bar.get_raw("Flags").unwrap(), 0x0301);
}

#[timeout(1000)]
#[test]
fn test_polyline_counted_points() {
    let factory = factory();
    let mut line = factory.create("CDVMPOLYLINE").unwrap();
    line.set_variable("Points", &points(&[(1, 2), (3, 4)])).unwrap();
    assert_eq!(line.get_int::<u16>("PointCount").unwrap(), 2);

    let err = line.set_variable("Points", &[0; 6]).unwrap_err();
    assert!(matches!(err, CdError::InvalidVariableLength { len: 6, .. }));
    assert_eq!(line.list("Points").unwrap().len(), 2);
}

#[timeout(1000)]
#[test]
fn test_trailing_block_reports_confidence() {
    let factory = factory();
    let record = factory.create("CDTABLEDATAEXTENSION").unwrap();
    let value = record.variable("AltBackgroundColor").unwrap();
    assert!(value.bytes.is_empty());
    assert_eq!(value.confidence, Confidence::VersionDependent);
}

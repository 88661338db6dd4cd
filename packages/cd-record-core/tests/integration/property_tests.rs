//! Property tests for offsets, numeric fields and tail resizing.

use std::sync::Arc;

use ntest::timeout;
use proptest::prelude::*;

use cd_record_core::records::{ActionFlag, ScrollStyle};
use cd_record_core::schema::{CodeEnum, Primitive, SchemaBuilder};
use cd_record_core::{Coded, FieldAccess, FieldAccessMut, FlagSet, Record};

use super::helpers::{factory, formula_action};

const PRIMITIVES: [Primitive; 8] = [
    Primitive::U8,
    Primitive::I8,
    Primitive::U16,
    Primitive::I16,
    Primitive::U32,
    Primitive::I32,
    Primitive::U64,
    Primitive::I64,
];

fn primitive() -> impl Strategy<Value = Primitive> {
    (0..PRIMITIVES.len()).prop_map(|i| PRIMITIVES[i])
}

fn numbers_schema() -> Arc<cd_record_core::StructureSchema> {
    Arc::new(
        SchemaBuilder::new("NUMBERS")
            .int("Small", Primitive::I8)
            .int("Word", Primitive::U16)
            .int("Signed", Primitive::I16)
            .int("Long", Primitive::I32)
            .build()
            .unwrap(),
    )
}

/// Variable fields of `CDACTIONEXT` in tail order.
const EXT_TAIL: [&str; 4] = [
    "LabelFormula",
    "ParentLabelFormula",
    "CompActionId",
    "ProgrammaticUseText",
];

fn tail_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..48)
}

#[timeout(1000)]
#[test]
fn flags_round_trip_empty_and_full() {
    let factory = factory();
    let mut record = factory.create("CDACTION").unwrap();
    for flags in [FlagSet::<ActionFlag>::all(), FlagSet::empty()] {
        record.set_flags("Flags", &flags).unwrap();
        assert_eq!(record.get_flags::<ActionFlag>("Flags").unwrap(), flags);
        assert_eq!(record.get_raw("Flags").unwrap(), flags.raw());
    }
}

proptest! {
    #[test]
    fn offsets_are_running_sums(kinds in prop::collection::vec(primitive(), 1..12)) {
        let build = || {
            kinds
                .iter()
                .enumerate()
                .fold(SchemaBuilder::new("GENERATED"), |b, (i, p)| b.int(format!("f{}", i), *p))
                .build()
                .unwrap()
        };
        let first = build();
        let second = build();

        let mut expected = 0;
        for (field, other) in first.fields().iter().zip(second.fields()) {
            prop_assert_eq!(field.offset, expected);
            prop_assert_eq!(field.offset, other.offset);
            expected += field.size;
        }
        prop_assert_eq!(first.fixed_size(), expected);
    }

    #[test]
    fn numeric_fields_round_trip(small: i8, word: u16, signed: i16, long: i32) {
        let mut record = Record::new(numbers_schema()).unwrap();
        record.set_int("Small", small).unwrap();
        record.set_int("Word", word).unwrap();
        record.set_int("Signed", signed).unwrap();
        record.set_int("Long", long).unwrap();

        prop_assert_eq!(record.get_int::<i8>("Small").unwrap(), small);
        prop_assert_eq!(record.get_int::<u16>("Word").unwrap(), word);
        prop_assert_eq!(record.get_int::<i16>("Signed").unwrap(), signed);
        prop_assert_eq!(record.get_int::<i32>("Long").unwrap(), long);
        // raw access sees the two's complement bit pattern
        prop_assert_eq!(record.get_raw("Signed").unwrap(), signed as u16 as u64);
        prop_assert_eq!(record.get_raw("Long").unwrap(), long as u32 as u64);
    }

    #[test]
    fn raw_writes_show_through_typed_reads(bits: u16) {
        let mut record = Record::new(numbers_schema()).unwrap();
        record.set_raw("Signed", bits as u64).unwrap();
        prop_assert_eq!(record.get_int::<i16>("Signed").unwrap(), bits as i16);
        prop_assert_eq!(&record.as_bytes()[3..5], &bits.to_le_bytes()[..]);
    }

    #[test]
    fn resizing_title_keeps_formula(
        title in "[a-zA-Z ]{0,40}",
        next_title in "[a-zA-Z ]{0,40}",
        formula in "[a-z@();]{0,30}",
    ) {
        let factory = factory();
        let mut record = formula_action(&factory, &title, &formula).into_inner();
        record
            .set_text("Title", &next_title, &cd_record_core::Utf8TextCodec)
            .unwrap();

        prop_assert_eq!(
            record.variable("Formula").unwrap().bytes,
            formula.as_bytes()
        );
        prop_assert_eq!(
            record.get_text("Title", &cd_record_core::Utf8TextCodec).unwrap(),
            next_title.clone()
        );
        let padded_title = next_title.len() + next_title.len() % 2;
        prop_assert_eq!(record.len(), 20 + padded_title + formula.len());
        prop_assert!(record.validate().is_ok());
    }

    #[test]
    fn resizing_middle_field_keeps_neighbours(
        initial in prop::collection::vec(tail_bytes(), 4),
        sizes in prop::collection::vec(0usize..64, 1..4),
    ) {
        let factory = factory();
        let mut record = factory.create("CDACTIONEXT").unwrap();
        for (name, bytes) in EXT_TAIL.iter().zip(&initial) {
            record.set_variable(name, bytes).unwrap();
        }

        // grow and shrink the second of four fields
        for size in sizes {
            let middle: Vec<u8> = (0..size).map(|i| i as u8 ^ 0x5A).collect();
            record.set_variable(EXT_TAIL[1], &middle).unwrap();

            prop_assert_eq!(record.variable(EXT_TAIL[1]).unwrap().bytes, &middle[..]);
            prop_assert_eq!(
                record.get_int::<u16>("ParentLabelFormulaLen").unwrap() as usize,
                size
            );
            for index in [0, 2, 3] {
                prop_assert_eq!(
                    record.variable(EXT_TAIL[index]).unwrap().bytes,
                    &initial[index][..]
                );
            }
            prop_assert_eq!(record.get_int::<u16>("LabelFormulaLen").unwrap() as usize, initial[0].len());
            prop_assert_eq!(record.get_int::<u16>("CompActionIdLen").unwrap() as usize, initial[2].len());
            prop_assert_eq!(
                record.get_int::<u16>("ProgrammaticUseTextLen").unwrap() as usize,
                initial[3].len()
            );
            let extents: usize = initial[0].len() + size + initial[2].len() + initial[3].len();
            prop_assert_eq!(record.len(), 24 + extents);
            prop_assert_eq!(record.declared_length().unwrap(), record.len());
            prop_assert!(record.validate().is_ok());
        }
    }

    #[test]
    fn enum_raw_codes_decode_consistently(bits: u16) {
        let factory = factory();
        let mut frame = factory.create("CDFRAME").unwrap();
        frame.set_raw("ScrollBarStyle", bits as u64).unwrap();

        prop_assert_eq!(frame.get_raw("ScrollBarStyle").unwrap(), bits as u64);
        let decoded = frame.get_enum::<ScrollStyle>("ScrollBarStyle").unwrap();
        let known = ScrollStyle::values().iter().any(|v| v.code() == bits as u64);
        prop_assert_eq!(decoded.is_known(), known);
        prop_assert_eq!(decoded.raw(), bits as u64);
        if let Coded::Known(style) = decoded {
            prop_assert_eq!(style.code(), bits as u64);
        }
    }

    #[test]
    fn flag_subsets_round_trip(
        flags in prop::sample::subsequence(
            ActionFlag::values().to_vec(),
            0..=ActionFlag::values().len(),
        ),
    ) {
        let factory = factory();
        let mut record = factory.create("CDACTION").unwrap();
        let written = FlagSet::from_flags(flags.iter().copied());
        record.set_flags("Flags", &written).unwrap();

        let read = record.get_flags::<ActionFlag>("Flags").unwrap();
        prop_assert_eq!(read, written);
        prop_assert_eq!(read.unknown_bits(), 0);
        for flag in ActionFlag::values() {
            prop_assert_eq!(read.contains(*flag), flags.contains(flag));
        }
    }
}

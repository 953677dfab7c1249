use crate::abbrev::{Abbr, Operand, RecordValue};
use crate::error::Error;
use crate::stream::{BitStream, BlockInfo};

/// Stream body, magic stripped, as lowercase hex.
fn body(stream: BitStream) -> String {
    let bytes = stream.end().unwrap();
    assert_eq!(&bytes[..4], &[0x42, 0x43, 0xc0, 0xde]);
    bytes[4..].iter().map(|b| format!("{b:02x}")).collect()
}

fn source_abbr() -> Abbr {
    Abbr::new(
        "source",
        vec![
            Operand::Literal(16),
            Operand::Array(Box::new(Operand::Char6)),
        ],
    )
}

#[test]
fn short_vbr() {
    let mut s = BitStream::new();
    s.write_vbr(0x3, 6).unwrap();
    assert_eq!(body(s), "03");
}

#[test]
fn long_vbr() {
    let mut s = BitStream::new();
    s.write_vbr(0xabba, 6).unwrap();
    assert_eq!(body(s), "7aaf06");
}

#[test]
fn long_64_bit_vbr() {
    let mut s = BitStream::new();
    s.write_vbr(0xabba_abba_c0de_c0de, 6).unwrap();
    assert_eq!(body(s), "be09f72db8de6bedde0a");
}

#[test]
fn enter_and_leave_a_block() {
    let mut s = BitStream::new();
    s.enter_block(8, 2).unwrap();
    s.end_block().unwrap();

    assert_eq!(body(s), "210800000100000000000000");
}

#[test]
fn enter_and_leave_nested_blocks() {
    let mut s = BitStream::new();
    s.enter_block(8, 4).unwrap();
    s.enter_block(9, 6).unwrap();
    s.end_block().unwrap();
    s.end_block().unwrap();

    assert_eq!(body(s), "211000000400000091600000010000000000000000000000");
}

#[test]
fn define_and_use_an_abbreviation() {
    let mut s = BitStream::new();
    s.enter_block(8, 4).unwrap();

    let id = s.define_abbr(source_abbr()).unwrap();
    assert_eq!(id, 4);
    assert!(s.has_abbr("source"));

    s.write_record("source", &[RecordValue::chars("hello_world")])
        .unwrap();
    s.end_block().unwrap();

    assert_eq!(body(s), "2110000004000000324218d27210cbe2fc96132d03000000");
}

#[test]
fn block_info_registers_abbreviations_for_other_blocks() {
    let mut s = BitStream::new();
    s.enter_block(8, 4).unwrap();

    let mut info = BlockInfo::default();
    info.insert(17, vec![source_abbr()]);
    s.write_block_info(info).unwrap();

    s.end_block().unwrap();

    assert_eq!(
        body(s),
        "211000000500000001200000020000000741e4086108000000000000"
    );
}

#[test]
fn block_info_abbreviations_are_inherited() {
    let mut s = BitStream::new();
    let mut info = BlockInfo::default();
    info.insert(17, vec![source_abbr()]);
    s.write_block_info(info).unwrap();

    s.enter_block(8, 4).unwrap();
    assert!(!s.has_abbr("source"));
    s.end_block().unwrap();

    s.enter_block(17, 4).unwrap();
    assert!(s.has_abbr("source"));
    s.write_record("source", &[RecordValue::chars("ok")]).unwrap();
    s.end_block().unwrap();

    s.end().unwrap();
}

#[test]
fn local_abbreviation_ids_follow_inherited_ones() {
    let mut s = BitStream::new();
    let mut info = BlockInfo::default();
    info.insert(17, vec![source_abbr()]);
    s.write_block_info(info).unwrap();

    s.enter_block(17, 4).unwrap();
    let id = s
        .define_abbr(Abbr::new("len", vec![Operand::Vbr(6)]))
        .unwrap();
    assert_eq!(id, 5);
    s.end_block().unwrap();
    s.end().unwrap();
}

#[test]
fn block_info_can_only_be_written_once() {
    let mut s = BitStream::new();
    s.write_block_info(BlockInfo::default()).unwrap();
    assert_eq!(
        s.write_block_info(BlockInfo::default()).unwrap_err(),
        Error::BlockInfoRewritten
    );
}

#[test]
fn unabbreviated_records() {
    let mut s = BitStream::new();
    s.enter_block(8, 2).unwrap();
    s.write_unabbrev_record(1, &[2]).unwrap();
    s.end_block().unwrap();
    s.end().unwrap();
}

#[test]
fn records_require_an_open_block() {
    let mut s = BitStream::new();
    assert_eq!(
        s.write_unabbrev_record(1, &[]).unwrap_err(),
        Error::RecordOutsideBlock
    );
    assert_eq!(
        s.write_record("source", &[]).unwrap_err(),
        Error::RecordOutsideBlock
    );
}

#[test]
fn definitions_require_an_open_block() {
    let mut s = BitStream::new();
    assert_eq!(
        s.define_abbr(source_abbr()).unwrap_err(),
        Error::DefineOutsideBlock
    );
}

#[test]
fn unknown_abbreviation_names_are_rejected() {
    let mut s = BitStream::new();
    s.enter_block(8, 2).unwrap();
    assert_eq!(
        s.write_record("nope", &[]).unwrap_err(),
        Error::UnknownAbbrev("nope".to_owned())
    );
}

#[test]
fn duplicate_abbreviation_names_are_rejected() {
    let mut s = BitStream::new();
    s.enter_block(8, 4).unwrap();
    s.define_abbr(source_abbr()).unwrap();
    assert_eq!(
        s.define_abbr(source_abbr()).unwrap_err(),
        Error::DuplicateAbbrev("source".to_owned())
    );
}

#[test]
fn abbreviation_scopes_do_not_leak_between_siblings() {
    let mut s = BitStream::new();
    s.enter_block(8, 4).unwrap();
    s.define_abbr(source_abbr()).unwrap();
    s.end_block().unwrap();

    s.enter_block(8, 4).unwrap();
    assert!(!s.has_abbr("source"));
    s.end_block().unwrap();
}

#[test]
fn narrow_abbreviation_id_widths_overflow() {
    let mut s = BitStream::new();
    s.enter_block(8, 2).unwrap();
    // Ids 0..=3 are control codes; a 2-bit block has no room for user ids.
    s.define_abbr(source_abbr()).unwrap();
    assert_eq!(
        s.write_record("source", &[RecordValue::chars("x")])
            .unwrap_err(),
        Error::AbbrevIdOverflow(4, 2)
    );
}

#[test]
fn abbreviation_id_width_bounds_are_enforced() {
    let mut s = BitStream::new();
    assert_eq!(s.enter_block(8, 1).unwrap_err(), Error::AbbrevIdWidth(1));
    assert_eq!(s.enter_block(8, 33).unwrap_err(), Error::AbbrevIdWidth(33));
    assert_eq!(s.enter_block(8, 64).unwrap_err(), Error::AbbrevIdWidth(64));
    s.enter_block(8, 32).unwrap();
    s.end_block().unwrap();
}

#[test]
fn unbalanced_blocks_fail() {
    let mut s = BitStream::new();
    assert_eq!(s.end_block().unwrap_err(), Error::NoOpenBlock);

    let mut s = BitStream::new();
    s.enter_block(8, 2).unwrap();
    assert_eq!(s.end().unwrap_err(), Error::OpenBlocks(1));
}

#[test]
fn blob_records_are_dword_aligned() {
    let mut s = BitStream::new();
    s.enter_block(23, 3).unwrap();
    s.define_abbr(Abbr::new(
        "blob",
        vec![Operand::Literal(1), Operand::Blob],
    ))
    .unwrap();
    s.write_record("blob", &[RecordValue::blob(b"abc".to_vec())])
        .unwrap();
    s.end_block().unwrap();

    // abbrev id 4 (3 bits), length 3 (vbr6), align32, "abc", pad to dword.
    assert_eq!(body(s), "5d0c000003000000120394036162630000000000");
}

use crate::bit_writer::BitWriter;
use crate::error::Error;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn bits_split_across_the_accumulator_boundary() {
    let mut w = BitWriter::new();
    w.write_bits(3, 31).unwrap();
    w.write_bits(7, 4).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "0300008003");
}

#[test]
fn align_pads_with_zero_bits() {
    let mut w = BitWriter::new();
    w.write_bits(3, 31).unwrap();
    w.align(32);
    assert_eq!(hex(&w.end().unwrap()), "03000000");
}

#[test]
fn align_on_a_boundary_is_a_no_op() {
    let mut w = BitWriter::new();
    w.write_dword(0xdec04342);
    w.align(32);
    assert_eq!(w.offset(), 4);
    assert_eq!(hex(&w.end().unwrap()), "4243c0de");
}

#[test]
fn bit_offset_counts_pending_bits() {
    let mut w = BitWriter::new();
    assert_eq!(w.bit_offset(), 0);
    w.write_bits(1, 3).unwrap();
    assert_eq!(w.bit_offset(), 3);
    w.write_dword(0);
    assert_eq!(w.bit_offset(), 35);
}

#[test]
fn width_over_32_is_rejected() {
    let mut w = BitWriter::new();
    assert_eq!(w.write_bits(0, 33).unwrap_err(), Error::InvalidBitCount(33));
}

#[test]
fn excess_value_bits_are_masked() {
    let mut w = BitWriter::new();
    w.write_bits(0xff, 4).unwrap();
    w.align(8);
    assert_eq!(hex(&w.end().unwrap()), "0f");
}

#[test]
fn short_vbr6() {
    let mut w = BitWriter::new();
    w.write_vbr(0x3, 6).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "03");
}

#[test]
fn long_vbr6() {
    let mut w = BitWriter::new();
    w.write_vbr(0xabba, 6).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "7aaf06");
}

#[test]
fn vbr6_of_a_64_bit_value() {
    let mut w = BitWriter::new();
    w.write_vbr(0xabba_abba_c0de_c0de, 6).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "be09f72db8de6bedde0a");
}

#[test]
fn vbr_group_boundary_values() {
    // 31 == mask for width 6: single group, no continuation.
    let mut w = BitWriter::new();
    w.write_vbr(31, 6).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "1f");

    // 32 needs a continuation group.
    let mut w = BitWriter::new();
    w.write_vbr(32, 6).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "6000");
}

#[test]
fn vbr_width_bounds() {
    let mut w = BitWriter::new();
    assert_eq!(w.write_vbr(0, 1).unwrap_err(), Error::VbrWidth(1));
    assert_eq!(w.write_vbr(0, 33).unwrap_err(), Error::VbrWidth(33));
    w.write_vbr(1, 2).unwrap();
    w.write_vbr(u64::MAX, 32).unwrap();
}

#[test]
fn reserve_requires_byte_alignment() {
    let mut w = BitWriter::new();
    w.write_bits(1, 3).unwrap();
    assert_eq!(w.reserve(32).unwrap_err(), Error::UnalignedReservation);

    w.align(8);
    assert_eq!(w.reserve(12).unwrap_err(), Error::PartialByteReservation(12));
}

#[test]
fn reserve_flushes_pending_whole_bytes() {
    let mut w = BitWriter::new();
    w.write_byte(0xaa);
    let r = w.reserve(32).unwrap();
    w.write_byte(0xbb);
    w.resolve_dword(r, 0x44332211).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "aa11223344bb");
}

#[test]
fn end_pads_the_last_partial_byte() {
    let mut w = BitWriter::new();
    w.write_bits(1, 1).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "01");
}

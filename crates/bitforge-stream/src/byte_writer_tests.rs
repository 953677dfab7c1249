use crate::byte_writer::ByteWriter;
use crate::error::Error;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn single_bytes() {
    let mut w = ByteWriter::new();
    w.write_byte(0xde);
    w.write_byte(0xad);
    assert_eq!(w.offset(), 2);
    assert_eq!(hex(&w.end().unwrap()), "dead");
}

#[test]
fn words_and_dwords_are_little_endian() {
    let mut w = ByteWriter::new();
    w.write_word(0xdead);
    w.write_dword(0xabbadead);
    assert_eq!(hex(&w.end().unwrap()), "addeaddebaab");
}

#[test]
fn identity_across_chunk_boundaries() {
    // Way past one 16 KiB chunk.
    let mut w = ByteWriter::new();
    for i in 0..32_000usize {
        w.write_byte((i % 256) as u8);
    }
    assert_eq!(w.offset(), 32_000);

    let out = w.end().unwrap();
    assert_eq!(out.len(), 32_000);
    for (i, byte) in out.iter().enumerate() {
        assert_eq!(*byte, (i % 256) as u8);
    }
}

#[test]
fn multi_byte_writes_across_chunk_boundaries() {
    let mut w = ByteWriter::new();
    for _ in 0..16 * 1024 - 1 {
        w.write_byte(0xff);
    }
    w.write_dword(0xaabbccdd);
    let out = w.end().unwrap();
    assert_eq!(out.len(), 16 * 1024 + 3);
    assert_eq!(out[16 * 1024 - 1..], [0xdd, 0xcc, 0xbb, 0xaa]);
}

#[test]
fn reserve_and_resolve() {
    let mut w = ByteWriter::new();
    w.write_byte(0x01);
    let r = w.reserve(4);
    w.write_byte(0x02);
    w.resolve_dword(r, 0xddccbbaa).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "01aabbccdd02");
}

#[test]
fn reservation_window_is_zeroed_until_resolved() {
    let mut w = ByteWriter::new();
    let r = w.reserve(4);
    assert_eq!(w.offset(), 4);
    w.resolve_dword(r, 0).unwrap();
    assert_eq!(hex(&w.end().unwrap()), "00000000");
}

#[test]
fn unresolved_reservation_fails_end() {
    let mut w = ByteWriter::new();
    let _r = w.reserve(4);
    assert_eq!(w.end().unwrap_err(), Error::PendingReservations(1));
}

#[test]
fn foreign_reservation_is_rejected() {
    let mut other = ByteWriter::new();
    other.write_byte(0xff);
    let r = other.reserve(4);

    let mut w = ByteWriter::new();
    assert_eq!(
        w.resolve_dword(r, 0).unwrap_err(),
        Error::ForeignReservation
    );
}

#[test]
fn resolve_checks_patch_size() {
    let mut w = ByteWriter::new();
    let r = w.reserve(4);
    assert_eq!(
        w.resolve(r, &[0, 1]).unwrap_err(),
        Error::ReservationSize { want: 4, got: 2 }
    );
}

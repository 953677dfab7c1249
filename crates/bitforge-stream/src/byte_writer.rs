//! Chunked little-endian byte sink.
//!
//! Output accumulates in fixed-size chunks that are concatenated once at
//! [`ByteWriter::end`]. The buffer is append-only except inside an
//! outstanding [`Reservation`] window: block lengths are known only after a
//! block closes, so the header dword is reserved up front and patched later.

use crate::error::{Error, Result};

const CHUNK_SIZE: usize = 16 * 1024;

/// A fixed window handed out by [`ByteWriter::reserve`], resolved exactly
/// once by a direct patch write.
///
/// Not `Clone`: resolving consumes the handle, so a window cannot be patched
/// twice through the type system alone. The writer additionally keeps a
/// ledger of pending windows, which catches handles from a different writer.
#[derive(Debug)]
pub struct Reservation {
    chunk: usize,
    offset: usize,
    len: usize,
}

/// Growable byte buffer with little-endian multi-byte appends.
#[derive(Debug, Default)]
pub struct ByteWriter {
    /// Sealed chunks, in order.
    chunks: Vec<Vec<u8>>,
    /// Chunk currently being filled.
    current: Vec<u8>,
    /// Total bytes across sealed chunks.
    sealed: usize,
    /// Unresolved reservation windows, as (chunk ordinal, offset).
    pending: Vec<(usize, usize)>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            current: Vec::with_capacity(CHUNK_SIZE),
            sealed: 0,
            pending: Vec::new(),
        }
    }

    /// Cumulative bytes written so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.sealed + self.current.len()
    }

    pub fn write_byte(&mut self, value: u8) {
        if self.current.len() == CHUNK_SIZE {
            self.seal();
        }
        self.current.push(value);
    }

    pub fn write_word(&mut self, value: u16) {
        if CHUNK_SIZE - self.current.len() >= 2 {
            self.current.extend_from_slice(&value.to_le_bytes());
        } else {
            let [lo, hi] = value.to_le_bytes();
            self.write_byte(lo);
            self.write_byte(hi);
        }
    }

    pub fn write_dword(&mut self, value: u32) {
        if CHUNK_SIZE - self.current.len() >= 4 {
            self.current.extend_from_slice(&value.to_le_bytes());
        } else {
            self.write_word((value & 0xffff) as u16);
            self.write_word((value >> 16) as u16);
        }
    }

    /// Reserve `len` zero bytes for a later patch.
    ///
    /// The window never straddles a chunk boundary: when the current chunk
    /// cannot hold it contiguously, the chunk is sealed and a fresh one
    /// begins.
    pub fn reserve(&mut self, len: usize) -> Reservation {
        debug_assert!(len > 0 && len <= CHUNK_SIZE);
        if CHUNK_SIZE - self.current.len() < len {
            self.seal();
        }
        let chunk = self.chunks.len();
        let offset = self.current.len();
        self.current.resize(offset + len, 0);
        self.pending.push((chunk, offset));
        Reservation { chunk, offset, len }
    }

    /// Patch a reserved window with its final bytes.
    pub fn resolve(&mut self, reservation: Reservation, bytes: &[u8]) -> Result<()> {
        let Reservation { chunk, offset, len } = reservation;
        if bytes.len() != len {
            return Err(Error::ReservationSize {
                want: len,
                got: bytes.len(),
            });
        }
        let slot = self
            .pending
            .iter()
            .position(|&p| p == (chunk, offset))
            .ok_or(Error::ForeignReservation)?;
        let target = if chunk == self.chunks.len() {
            &mut self.current
        } else {
            self.chunks.get_mut(chunk).ok_or(Error::ForeignReservation)?
        };
        if offset + len > target.len() {
            return Err(Error::ForeignReservation);
        }
        target[offset..offset + len].copy_from_slice(bytes);
        self.pending.swap_remove(slot);
        Ok(())
    }

    /// Patch a reserved dword window, little-endian.
    pub fn resolve_dword(&mut self, reservation: Reservation, value: u32) -> Result<()> {
        self.resolve(reservation, &value.to_le_bytes())
    }

    /// Concatenate all chunks into the final byte sequence.
    ///
    /// Fails if any reservation is still unresolved.
    pub fn end(mut self) -> Result<Vec<u8>> {
        if !self.pending.is_empty() {
            return Err(Error::PendingReservations(self.pending.len()));
        }
        self.seal();
        let mut out = Vec::with_capacity(self.sealed);
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        Ok(out)
    }

    fn seal(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let sealed = std::mem::replace(&mut self.current, Vec::with_capacity(CHUNK_SIZE));
        self.sealed += sealed.len();
        self.chunks.push(sealed);
    }
}

//! Per-block encoder state: the abbreviation scope of one open block.

use indexmap::IndexMap;

use crate::abbrev::Abbr;
use crate::byte_writer::Reservation;
use crate::error::{Error, Result};

/// Ids 0..=3 are the control codes; user abbreviations start here.
pub(crate) const FIRST_ABBREV_ID: u64 = 4;
pub(crate) const MIN_ABBREV_ID_WIDTH: u32 = 2;
pub(crate) const MAX_ABBREV_ID_WIDTH: u32 = 32;

/// One entry of the block stack.
///
/// A frame owns the abbreviation registry visible inside its block: the
/// BLOCKINFO abbreviations registered for the block id, in registration
/// order, followed by abbreviations defined locally. Ids are assigned by
/// insertion order starting at [`FIRST_ABBREV_ID`].
#[derive(Debug)]
pub(crate) struct Frame {
    block_id: u64,
    abbrev_id_width: u32,
    /// Byte offset of the first content dword, right after the length word.
    start: usize,
    length: Reservation,
    abbrevs: IndexMap<String, Abbr>,
}

impl Frame {
    pub(crate) fn new(
        block_id: u64,
        abbrev_id_width: u32,
        start: usize,
        length: Reservation,
        seed: Vec<Abbr>,
    ) -> Self {
        debug_assert!(abbrev_id_width >= MIN_ABBREV_ID_WIDTH);
        let mut abbrevs = IndexMap::with_capacity(seed.len());
        for abbr in seed {
            // BLOCKINFO registration already rejected duplicates.
            let prev = abbrevs.insert(abbr.name().to_owned(), abbr);
            debug_assert!(prev.is_none());
        }
        Self {
            block_id,
            abbrev_id_width,
            start,
            length,
            abbrevs,
        }
    }

    #[inline]
    pub(crate) fn block_id(&self) -> u64 {
        self.block_id
    }

    #[inline]
    pub(crate) fn abbrev_id_width(&self) -> u32 {
        self.abbrev_id_width
    }

    /// Register a locally defined abbreviation and return its wire id.
    pub(crate) fn define(&mut self, abbr: Abbr) -> Result<u64> {
        if self.abbrevs.contains_key(abbr.name()) {
            return Err(Error::DuplicateAbbrev(abbr.name().to_owned()));
        }
        let id = FIRST_ABBREV_ID + self.abbrevs.len() as u64;
        self.abbrevs.insert(abbr.name().to_owned(), abbr);
        Ok(id)
    }

    pub(crate) fn get(&self, name: &str) -> Option<(u64, &Abbr)> {
        self.abbrevs
            .get_full(name)
            .map(|(index, _, abbr)| (FIRST_ABBREV_ID + index as u64, abbr))
    }

    #[inline]
    pub(crate) fn has(&self, name: &str) -> bool {
        self.abbrevs.contains_key(name)
    }

    /// Tear the frame apart for the closing length patch.
    pub(crate) fn finish(self) -> (usize, Reservation) {
        (self.start, self.length)
    }
}

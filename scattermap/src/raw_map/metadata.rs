//! Control bytes and group matching.
//!
//! A table of `capacity` slots keeps `capacity + GROUP_WIDTH` control bytes:
//! one per slot, a sentinel at index `capacity`, then a copy of the first
//! `GROUP_WIDTH - 1` slot bytes so a group read starting near the end wraps
//! around without a bounds split.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};

/// Number of control bytes scanned at once.
pub(crate) const GROUP_WIDTH: usize = 8;

pub(crate) const EMPTY: u8 = 0b1000_0000;
pub(crate) const DELETED: u8 = 0b1111_1110;
pub(crate) const SENTINEL: u8 = 0b1111_1111;

const LSB: u64 = 0x0101_0101_0101_0101;
const MSB: u64 = 0x8080_8080_8080_8080;

/// Control bytes backing every zero-capacity table.
static EMPTY_GROUP: [u8; GROUP_WIDTH] = [EMPTY; GROUP_WIDTH];

/// Full slots store a 7 bit hash fragment, so their high bit is clear.
#[inline]
pub(crate) fn is_full(control: u8) -> bool {
    control & EMPTY == 0
}

/// Probe start derived from the low bits of the hash.
#[inline]
pub(crate) fn h1(hash: u64) -> usize {
    hash as usize
}

/// Fragment stored in the control byte, taken from the top 7 bits.
#[inline]
pub(crate) fn h2(hash: u64) -> u8 {
    (hash >> 57) as u8
}

#[derive(Clone)]
pub(crate) struct Metadata {
    bytes: Cow<'static, [u8]>,
}

impl Metadata {
    /// The shared, read-only control bytes of the empty table.
    pub(crate) fn shared_empty() -> Self {
        Self {
            bytes: Cow::Borrowed(&EMPTY_GROUP),
        }
    }

    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!((capacity + 1).is_power_of_two() && capacity >= GROUP_WIDTH - 1);
        let mut bytes = vec![EMPTY; capacity + GROUP_WIDTH];
        bytes[capacity] = SENTINEL;
        Self {
            bytes: Cow::Owned(bytes),
        }
    }

    pub(crate) fn is_shared(&self) -> bool {
        matches!(self.bytes, Cow::Borrowed(_))
    }

    /// Control bytes of the real slots, without sentinel and clones.
    pub(crate) fn slots(&self, capacity: usize) -> &[u8] {
        &self.bytes[..capacity]
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> u8 {
        self.bytes[index]
    }

    /// Writes the control byte of slot `index`, mirroring it into the cloned
    /// tail when the slot is one of the first `GROUP_WIDTH - 1`.
    #[inline]
    pub(crate) fn set(&mut self, index: usize, capacity: usize, control: u8) {
        let bytes = self.bytes_mut();
        bytes[index] = control;
        if index < GROUP_WIDTH - 1 {
            bytes[capacity + 1 + index] = control;
        }
    }

    /// Marks every slot empty again.
    pub(crate) fn reset(&mut self, capacity: usize) {
        if self.is_shared() {
            return;
        }
        let bytes = self.bytes_mut();
        bytes.fill(EMPTY);
        bytes[capacity] = SENTINEL;
    }

    #[inline]
    pub(crate) fn group(&self, offset: usize) -> Group {
        let Group(word) = bytemuck::pod_read_unaligned(&self.bytes[offset..offset + GROUP_WIDTH]);
        Group(u64::from_le(word))
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.bytes {
            Cow::Owned(bytes) => bytes,
            Cow::Borrowed(_) => panic!("the shared empty table is never written"),
        }
    }
}

/// Eight control bytes loaded as one little-endian word.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(transparent)]
pub(crate) struct Group(u64);

impl Group {
    /// Full slots whose fragment equals `h2`. May report a false positive
    /// right above a true match, never a non-full slot.
    #[inline]
    pub(crate) fn match_h2(self, h2: u8) -> BitMask {
        let x = self.0 ^ (LSB * u64::from(h2));
        BitMask(x.wrapping_sub(LSB) & !x & MSB)
    }

    #[inline]
    pub(crate) fn match_empty(self) -> BitMask {
        // EMPTY is the only control byte with bit 7 set and bit 1 clear
        BitMask(self.0 & !(self.0 << 6) & MSB)
    }

    #[inline]
    pub(crate) fn match_empty_or_deleted(self) -> BitMask {
        // bit 7 set and bit 0 clear: excludes full slots and the sentinel
        BitMask(self.0 & !(self.0 << 7) & MSB)
    }
}

/// Set of byte positions within a group, lowest first.
#[derive(Clone, Copy)]
pub(crate) struct BitMask(u64);

impl BitMask {
    #[inline]
    pub(crate) fn any(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub(crate) fn lowest(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize / 8)
        }
    }
}

impl Iterator for BitMask {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let bit = self.lowest()?;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_of(bytes: [u8; GROUP_WIDTH]) -> Group {
        Group(u64::from_le_bytes(bytes))
    }

    #[test]
    fn match_h2_reports_only_full_slots() {
        let g = group_of([0x12, EMPTY, 0x12, DELETED, SENTINEL, 0x05, 0x12, 0x7f]);
        let hits: Vec<_> = g.match_h2(0x12).collect();
        assert_eq!(hits, vec![0, 2, 6]);
        assert_eq!(g.match_h2(0x00).count(), 0);
    }

    #[test]
    fn match_empty_ignores_deleted_and_sentinel() {
        let g = group_of([EMPTY, DELETED, SENTINEL, 0x00, EMPTY, 0x7f, DELETED, EMPTY]);
        let hits: Vec<_> = g.match_empty().collect();
        assert_eq!(hits, vec![0, 4, 7]);
    }

    #[test]
    fn match_empty_or_deleted_skips_sentinel() {
        let g = group_of([EMPTY, DELETED, SENTINEL, 0x00, EMPTY, 0x7f, DELETED, 0x01]);
        let hits: Vec<_> = g.match_empty_or_deleted().collect();
        assert_eq!(hits, vec![0, 1, 4, 6]);
        assert_eq!(g.match_empty_or_deleted().lowest(), Some(0));
    }

    #[test]
    fn full_byte_classification() {
        assert!(is_full(0x00));
        assert!(is_full(0x7f));
        assert!(!is_full(EMPTY));
        assert!(!is_full(DELETED));
        assert!(!is_full(SENTINEL));
        assert!(h2(u64::MAX) <= 0x7f);
    }

    #[test]
    fn set_mirrors_leading_slots() {
        let mut m = Metadata::new(7);
        m.set(0, 7, 0x11);
        m.set(6, 7, 0x22);
        assert_eq!(m.get(0), 0x11);
        assert_eq!(m.get(8), 0x11);
        assert_eq!(m.get(6), 0x22);
        assert_eq!(m.get(14), 0x22);
        assert_eq!(m.get(7), SENTINEL);

        // a group read at the sentinel wraps around to slot 0
        let hits: Vec<_> = m.group(7).match_h2(0x11).collect();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn shared_empty_reads_as_empty() {
        let m = Metadata::shared_empty();
        assert!(m.is_shared());
        assert_eq!(m.group(0).match_empty().count(), GROUP_WIDTH);
        assert!(m.slots(0).is_empty());
    }

    #[test]
    fn reset_restores_sentinel() {
        let mut m = Metadata::new(15);
        m.set(3, 15, DELETED);
        m.set(10, 15, 0x01);
        m.reset(15);
        assert!(m.slots(15).iter().all(|&c| c == EMPTY));
        assert_eq!(m.get(15), SENTINEL);
    }
}

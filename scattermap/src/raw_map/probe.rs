use super::metadata::GROUP_WIDTH;

/// Triangular probe over groups of `GROUP_WIDTH` slots.
///
/// With `mask + 1` a power of two, the offsets visit every group start before
/// repeating, so every slot is examined eventually.
pub(crate) struct ProbeSeq {
    mask: usize,
    offset: usize,
    stride: usize,
}

impl ProbeSeq {
    #[inline]
    pub(crate) fn new(h1: usize, mask: usize) -> Self {
        Self {
            mask,
            offset: h1 & mask,
            stride: 0,
        }
    }

    /// Control byte index where the current group starts.
    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Slot addressed by byte `bit` of the current group.
    #[inline]
    pub(crate) fn slot(&self, bit: usize) -> usize {
        (self.offset + bit) & self.mask
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.stride += GROUP_WIDTH;
        self.offset = (self.offset + self.stride) & self.mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn visits_every_slot() {
        for capacity in [7usize, 15, 31, 1023] {
            for h1 in [0usize, 3, 7, 12345] {
                let mut probe = ProbeSeq::new(h1, capacity);
                let mut seen = BTreeSet::new();
                for _ in 0..=capacity / GROUP_WIDTH {
                    for bit in 0..GROUP_WIDTH {
                        seen.insert(probe.slot(bit));
                    }
                    probe.advance();
                }
                // positions 0..=capacity, the last one being the sentinel
                assert_eq!(seen.len(), capacity + 1, "capacity {capacity}, h1 {h1}");
            }
        }
    }

    #[test]
    fn wraps_with_the_mask() {
        let probe = ProbeSeq::new(6, 7);
        assert_eq!(probe.offset(), 6);
        assert_eq!(probe.slot(0), 6);
        assert_eq!(probe.slot(1), 7);
        assert_eq!(probe.slot(2), 0);
    }
}

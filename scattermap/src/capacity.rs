//! Capacity policy.
//!
//! A table holds `2^k - 1` slots so that the slot count doubles as the probe
//! mask, and it is never filled past 7/8 of its slots. Zero is reserved for
//! the shared empty table.

/// Smallest capacity of a table that owns storage.
pub const MIN_CAPACITY: usize = 7;

/// Entries requested by [`ScatterMap::new`](crate::ScatterMap::new).
pub const DEFAULT_CAPACITY: usize = 1;

/// Maximum number of used (full or deleted) slots in a table of
/// `capacity` slots: `floor(capacity * 7 / 8)`.
#[inline]
pub const fn max_load(capacity: usize) -> usize {
    // split to keep `capacity * 7` from overflowing
    (capacity / 8) * 7 + (capacity % 8) * 7 / 8
}

/// Smallest legal capacity able to hold `entries` live entries.
///
/// Returns `0` for `0` entries, otherwise the smallest `C = 2^k - 1` with
/// `C >= MIN_CAPACITY` and `max_load(C) >= entries`.
///
/// # Panics
///
/// Panics if the capacity does not fit in a `usize`.
pub fn capacity_for(entries: usize) -> usize {
    if entries == 0 {
        return 0;
    }
    // max_load(C) >= n  <=>  C >= ceil(8n / 7)
    let unloaded = entries
        .checked_add(entries / 7 + usize::from(entries % 7 != 0))
        .and_then(|n| n.checked_add(1))
        .and_then(usize::checked_next_power_of_two)
        .expect("capacity overflow");
    (unloaded - 1).max(MIN_CAPACITY)
}

/// Capacity a full table grows into when it runs out of empty slots.
#[inline]
pub(crate) fn next_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        MIN_CAPACITY
    } else {
        capacity
            .checked_mul(2)
            .and_then(|c| c.checked_add(1))
            .expect("capacity overflow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_entries_is_the_empty_table() {
        assert_eq!(capacity_for(0), 0);
    }

    #[test]
    fn small_requests_use_the_minimum_table() {
        for n in 1..=6 {
            assert_eq!(capacity_for(n), MIN_CAPACITY, "entries: {n}");
        }
        assert_eq!(capacity_for(DEFAULT_CAPACITY), 7);
        assert_eq!(capacity_for(7), 15);
    }

    #[test]
    fn unloading_crosses_into_the_next_bucket() {
        // floor(2047 * 7 / 8) = 1791 < 1800
        assert_eq!(max_load(2047), 1791);
        assert_eq!(capacity_for(1791), 2047);
        assert_eq!(capacity_for(1800), 4095);
        assert_eq!(capacity_for(1700), 2047);
        assert_eq!(capacity_for(850), 1023);
    }

    #[test]
    fn max_load_matches_seven_eighths() {
        assert_eq!(max_load(0), 0);
        assert_eq!(max_load(7), 6);
        assert_eq!(max_load(15), 13);
        assert_eq!(max_load(usize::MAX), usize::MAX / 8 * 7 + 6);
    }

    #[test]
    fn next_capacity_doubles() {
        assert_eq!(next_capacity(0), 7);
        assert_eq!(next_capacity(7), 15);
        assert_eq!(next_capacity(1023), 2047);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn huge_requests_overflow() {
        capacity_for(usize::MAX);
    }

    proptest! {
        #[test]
        fn capacity_is_smallest_legal(n in 1usize..1_000_000) {
            let c = capacity_for(n);
            prop_assert!((c + 1).is_power_of_two());
            prop_assert!(max_load(c) >= n);
            let smaller = c / 2;
            prop_assert!(smaller < MIN_CAPACITY || max_load(smaller) < n);
        }
    }
}

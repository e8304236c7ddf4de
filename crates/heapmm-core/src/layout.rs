//! Alignment arithmetic shared by the arena and the allocator.

/// Alignment granularity of every block size and payload offset, in bytes.
///
/// Fixed at compile time. Payload offsets are multiples of this value
/// relative to the arena base.
pub const ALIGNMENT: usize = 8;

/// Round `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. Returns `None` if the rounded value
/// does not fit in a `usize`.
pub fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stays_zero() {
        assert_eq!(align_up(0, ALIGNMENT), Some(0));
    }

    #[test]
    fn rounds_to_next_multiple() {
        assert_eq!(align_up(1, 8), Some(8));
        assert_eq!(align_up(8, 8), Some(8));
        assert_eq!(align_up(9, 8), Some(16));
        assert_eq!(align_up(100, 8), Some(104));
        assert_eq!(align_up(4097, 4096), Some(8192));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(align_up(usize::MAX, 8), None);
        assert_eq!(align_up(usize::MAX - 3, 8), None);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn aligned_value_is_smallest_multiple_at_or_above(value in 0usize..1 << 40) {
                let aligned = align_up(value, ALIGNMENT).unwrap();
                prop_assert_eq!(aligned % ALIGNMENT, 0);
                prop_assert!(aligned >= value);
                prop_assert!(aligned - value < ALIGNMENT);
            }
        }
    }
}

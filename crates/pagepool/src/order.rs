//! Size-to-order mapping. A chunk of order `k` spans `1 << k` pages.

use crate::util::{PAGE_SHIFT, PAGE_SIZE};

/// Largest supported chunk order; one chunk covers at most
/// `1 << MAX_ORDER` pages.
pub const MAX_ORDER: usize = 7;

/// Smallest order whose page span holds `size` bytes.
///
/// A monotone step function with strict boundaries: sizes below one page
/// map to order 0, below two pages to order 1, and so on, doubling at
/// each step. Saturates at [`MAX_ORDER`]; the pool rejects oversized
/// requests before asking for pages, so the saturated value is only ever
/// reached by the largest legitimate request.
#[inline]
pub const fn order_for(size: usize) -> usize {
    if size < PAGE_SIZE {
        return 0;
    }
    let order = (usize::BITS - (size >> PAGE_SHIFT).leading_zeros()) as usize;
    if order > MAX_ORDER {
        MAX_ORDER
    } else {
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_page_sizes_map_to_order_zero() {
        assert_eq!(order_for(0), 0);
        assert_eq!(order_for(1), 0);
        assert_eq!(order_for(24), 0);
        assert_eq!(order_for(PAGE_SIZE - 1), 0);
    }

    #[test]
    fn boundaries_are_strict() {
        // Exactly one page already needs the next order up: the step
        // function is "strictly less than", not "at most".
        assert_eq!(order_for(PAGE_SIZE), 1);
        assert_eq!(order_for(2 * PAGE_SIZE - 1), 1);
        assert_eq!(order_for(2 * PAGE_SIZE), 2);
        assert_eq!(order_for(4 * PAGE_SIZE - 1), 2);
        assert_eq!(order_for(4 * PAGE_SIZE), 3);
    }

    #[test]
    fn every_band_starts_and_ends_where_expected() {
        for order in 1..=MAX_ORDER {
            let low = PAGE_SIZE << (order - 1);
            let high = (PAGE_SIZE << order) - 1;
            assert_eq!(order_for(low), order, "low end of order {order}");
            assert_eq!(order_for(high), order, "high end of order {order}");
        }
    }

    #[test]
    fn two_pages_and_change_needs_order_two() {
        assert_eq!(order_for(2 * PAGE_SIZE + 113), 2);
    }

    #[test]
    fn order_never_decreases_with_size() {
        let mut prev = 0;
        for size in (0..PAGE_SIZE << MAX_ORDER).step_by(1037) {
            let order = order_for(size);
            assert!(order >= prev, "order regressed at size {size}");
            prev = order;
        }
    }
}

//! Alignment helpers and the page-geometry constants the pool is built on.

/// Minimum alignment of every stored offset and every returned address.
pub const MIN_ALIGN: usize = 8;

/// Fixed page size all pool arithmetic assumes. Blocks from the page
/// provider span `PAGE_SIZE << order` bytes and start on a `PAGE_SIZE`
/// boundary.
pub const PAGE_SIZE: usize = 4096;

/// log2 of [`PAGE_SIZE`], for shift-based page math.
pub const PAGE_SHIFT: usize = 12;

/// Mask that drops the in-page bits of an address.
pub const PAGE_MASK: usize = !(PAGE_SIZE - 1);

/// Align `value` up to the next multiple of `align`.
/// `align` must be a power of two.
#[inline(always)]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Align `value` down to the previous multiple of `align`.
/// `align` must be a power of two.
#[inline(always)]
pub const fn align_down(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    value & !(align - 1)
}

/// Check if `value` is aligned to `align`.
#[inline(always)]
pub const fn is_aligned(value: usize, align: usize) -> bool {
    value & (align - 1) == 0
}

//! Page provider seam: where the pool gets its blocks from.

use crate::platform;
use crate::util::{is_aligned, PAGE_SIZE};

/// Source of page-aligned memory blocks in power-of-two page counts.
///
/// The pool asks for whole blocks and returns whole blocks; it never
/// splits a provider block back into smaller provider requests.
///
/// # Safety
/// `acquire` must return either null or a block that starts on a
/// [`PAGE_SIZE`] boundary, spans exactly `PAGE_SIZE << order` bytes, is
/// writable, and is not handed out again until released.
pub unsafe trait PageProvider {
    /// Obtain `1 << order` contiguous pages. Returns null when no memory
    /// is available; the caller treats that as allocation failure, not a
    /// panic.
    fn acquire(&mut self, order: usize) -> *mut u8;

    /// Give back a block obtained from [`acquire`](Self::acquire).
    ///
    /// # Safety
    /// `block` must come from a successful `acquire` on this provider
    /// with the same `order`, and must not be released twice.
    unsafe fn release(&mut self, block: *mut u8, order: usize);
}

/// Default provider: anonymous read-write mappings from the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysPages;

unsafe impl PageProvider for SysPages {
    #[inline]
    fn acquire(&mut self, order: usize) -> *mut u8 {
        let block = unsafe { platform::map_pages(PAGE_SIZE << order) };
        debug_assert!(is_aligned(block as usize, PAGE_SIZE));
        block
    }

    #[inline]
    unsafe fn release(&mut self, block: *mut u8, order: usize) {
        platform::unmap_pages(block, PAGE_SIZE << order);
    }
}

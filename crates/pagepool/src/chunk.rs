//! Per-chunk descriptor, stored inside the memory it describes.

use core::mem;
use core::ptr;

use crate::util::{align_up, MIN_ALIGN, PAGE_MASK, PAGE_SIZE};

/// Chunk descriptor.
///
/// Lives at the page-aligned base of the block it heads, except for a
/// pool's first chunk, which sits right behind the pool record in the
/// same page. `off` is measured from the chunk base, so the descriptor's
/// own placement is folded into [`start_off`](Chunk::start_off).
#[repr(C)]
pub struct Chunk {
    /// Next chunk on whichever list this one is threaded on.
    pub(crate) next: *mut Chunk,
    /// Previous chunk; meaningful only on the current list.
    pub(crate) prev: *mut Chunk,
    pub(crate) order: u16,
    /// Set when this descriptor heads a block acquired from the provider.
    /// Pages split off a larger block share their owner's block and carry
    /// `false`; destruction releases owner blocks only.
    pub(crate) owner: bool,
    _pad: u8,
    /// Bump cursor, bytes from the chunk base. Always 8-aligned.
    pub(crate) off: u32,
}

impl Chunk {
    /// Descriptor size rounded up to the allocation alignment.
    pub(crate) const HDR: usize = align_up(mem::size_of::<Chunk>(), MIN_ALIGN);

    pub(crate) fn new(order: usize, owner: bool, off: u32) -> Chunk {
        Chunk {
            next: ptr::null_mut(),
            prev: ptr::null_mut(),
            order: order as u16,
            owner,
            _pad: 0,
            off,
        }
    }

    /// Page-aligned base of the memory this chunk bumps from.
    #[inline(always)]
    pub(crate) fn base(&self) -> *mut u8 {
        ((self as *const Chunk as usize) & PAGE_MASK) as *mut u8
    }

    /// Whole span of the chunk in bytes.
    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        PAGE_SIZE << self.order
    }

    /// Cursor position right behind this descriptor: the value `off`
    /// returns to once every allocation has been taken back.
    #[inline(always)]
    pub(crate) fn start_off(&self) -> u32 {
        let hdr_end = self as *const Chunk as usize + mem::size_of::<Chunk>();
        align_up(hdr_end - self.base() as usize, MIN_ALIGN) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform;

    #[test]
    fn descriptor_is_three_words() {
        assert_eq!(mem::size_of::<Chunk>(), 24);
        assert_eq!(Chunk::HDR, 24);
        assert_eq!(mem::align_of::<Chunk>(), 8);
    }

    #[test]
    fn capacity_follows_order() {
        assert_eq!(Chunk::new(0, true, 0).capacity(), PAGE_SIZE);
        assert_eq!(Chunk::new(3, true, 0).capacity(), PAGE_SIZE << 3);
        assert_eq!(Chunk::new(7, true, 0).capacity(), PAGE_SIZE << 7);
    }

    #[test]
    fn start_off_accounts_for_descriptor_placement() {
        unsafe {
            let page = platform::map_pages(PAGE_SIZE);
            assert!(!page.is_null());

            // Descriptor at the block base, the common case.
            let at_base = page as *mut Chunk;
            at_base.write(Chunk::new(0, true, 0));
            assert_eq!((*at_base).base(), page);
            assert_eq!((*at_base).start_off() as usize, Chunk::HDR);

            // Descriptor displaced by a 16-byte record in front of it,
            // the first-chunk case.
            let displaced = page.add(16) as *mut Chunk;
            displaced.write(Chunk::new(0, true, 0));
            assert_eq!((*displaced).base(), page);
            assert_eq!((*displaced).start_off() as usize, 16 + Chunk::HDR);

            platform::unmap_pages(page, PAGE_SIZE);
        }
    }
}

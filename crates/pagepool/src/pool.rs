//! The pool proper: a current-chunk list bump allocator over provider
//! blocks, with trailing-only reclaim and a free list of emptied chunks.

use core::mem;
use core::ptr::{self, NonNull};

use tracing::trace;

use crate::chunk::Chunk;
use crate::error::AllocError;
use crate::order::{order_for, MAX_ORDER};
use crate::provider::{PageProvider, SysPages};
use crate::util::{align_up, is_aligned, MIN_ALIGN, PAGE_MASK, PAGE_SIZE};

/// Pool record, self-hosted at the base of the first block.
#[repr(C)]
struct PoolHeader {
    /// Head of the current-chunk list; allocation always bumps the head.
    /// Never null for a live pool.
    curr: *mut Chunk,
    /// Head of the free list of emptied chunks, threaded through `next`.
    free: *mut Chunk,
}

/// Where the first chunk descriptor sits inside the first block.
const FIRST_CHUNK_AT: usize = align_up(mem::size_of::<PoolHeader>(), MIN_ALIGN);

/// Bump baseline of the first chunk: pool record plus its own descriptor.
const FIRST_CHUNK_OFF: usize = align_up(FIRST_CHUNK_AT + mem::size_of::<Chunk>(), MIN_ALIGN);

/// Largest single allocation the pool accepts: the biggest block the
/// provider can hand out, minus the chunk descriptor at its base.
pub const MAX_ALLOC: usize = (PAGE_SIZE << MAX_ORDER) - Chunk::HDR;

/// Largest initial capacity [`PagePool::with_capacity`] accepts; the
/// first block also hosts the pool record.
pub const MAX_CAPACITY: usize = (PAGE_SIZE << MAX_ORDER) - FIRST_CHUNK_OFF;

/// Point-in-time pool counters, gathered by walking both chunk lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Chunks on the current list, most recently grown first.
    pub current_chunks: usize,
    /// Emptied chunks parked on the free list.
    pub free_chunks: usize,
    /// Bytes currently held from the page provider.
    pub reserved_bytes: usize,
    /// Bytes handed out and not yet taken back, descriptors excluded.
    pub used_bytes: usize,
}

/// Chunked memory pool.
///
/// Carves aligned allocations out of page-order chunks with a bump
/// cursor. Only the most recent allocation of a chunk can be taken back;
/// freeing anything else is accepted and ignored. Chunks whose cursor
/// returns to its baseline are parked on a free list and reused before
/// the provider is asked for more pages. All blocks go back to the
/// provider when the pool is dropped.
///
/// ```
/// use pagepool::PagePool;
///
/// let mut pool = PagePool::with_capacity(0)?;
/// let p = pool.alloc(24)?;
/// unsafe { pool.free(p, 24) };
/// # Ok::<(), pagepool::AllocError>(())
/// ```
pub struct PagePool<P: PageProvider = SysPages> {
    raw: NonNull<PoolHeader>,
    pages: P,
}

// The pool owns every block it holds; moving it between threads is fine,
// sharing it is not.
unsafe impl<P: PageProvider + Send> Send for PagePool<P> {}

impl PagePool<SysPages> {
    /// Create a pool backed by OS pages, sized for `capacity` bytes in
    /// the first block.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, SysPages)
    }
}

impl<P: PageProvider> PagePool<P> {
    /// Create a pool over `pages`, sized for `capacity` bytes in the
    /// first block.
    ///
    /// The first block self-hosts the pool record and the first chunk
    /// descriptor, so a `capacity` of zero still reserves one page. Only
    /// a single-page first block bump-serves allocations; a larger one
    /// anchors the pool while requests grow their own chunks.
    pub fn with_capacity_in(capacity: usize, mut pages: P) -> Result<Self, AllocError> {
        if capacity > MAX_CAPACITY {
            return Err(AllocError::RequestTooLarge { size: capacity, max: MAX_CAPACITY });
        }
        let capacity = align_up(capacity, MIN_ALIGN);
        let order = order_for(FIRST_CHUNK_OFF + capacity);

        let base = pages.acquire(order);
        if base.is_null() {
            return Err(AllocError::OutOfPages { order });
        }

        unsafe {
            let first = base.add(FIRST_CHUNK_AT) as *mut Chunk;
            first.write(Chunk::new(order, true, FIRST_CHUNK_OFF as u32));
            let raw = base as *mut PoolHeader;
            raw.write(PoolHeader { curr: first, free: ptr::null_mut() });

            trace!(order, capacity, "pool created");
            Ok(PagePool { raw: NonNull::new_unchecked(raw), pages })
        }
    }

    /// Hand out `size` bytes, 8-aligned, never zeroed.
    ///
    /// Bumps the current chunk when it is a single page with room left;
    /// everything else goes through the refill path. A `size` of zero
    /// yields the current cursor position without advancing it.
    #[inline]
    pub fn alloc(&mut self, size: usize) -> Result<NonNull<u8>, AllocError> {
        let size = align_up(size, MIN_ALIGN);
        unsafe {
            let c = &mut *(*self.raw.as_ptr()).curr;
            // Multi-page chunks never bump-serve: free() finds a chunk by
            // masking an address down to its page, which only holds for
            // addresses in the first page of a block.
            if c.order == 0 && c.off as usize + size <= c.capacity() {
                let a = c.base().add(c.off as usize);
                c.off += size as u32;
                return Ok(NonNull::new_unchecked(a));
            }
        }
        self.grow(size)
    }

    /// Refill path: recycle the free-list head if the request fits in its
    /// first page, otherwise take a fresh block from the provider and
    /// hand trailing whole pages to the free list.
    #[cold]
    #[inline(never)]
    fn grow(&mut self, size: usize) -> Result<NonNull<u8>, AllocError> {
        if size > MAX_ALLOC {
            return Err(AllocError::RequestTooLarge { size, max: MAX_ALLOC });
        }
        let pool = unsafe { &mut *self.raw.as_ptr() };

        // Zero-size requests land here only when the current head is
        // multi-page. They name the cursor and take nothing.
        if size == 0 {
            let c = pool.curr;
            return Ok(unsafe { NonNull::new_unchecked((*c).base().add((*c).off as usize)) });
        }

        // A parked chunk keeps the cursor it retired with. Serve from it
        // only within its first page: pages past the first may have been
        // split off to other chunks when the block was fresh.
        let head = pool.free;
        if !head.is_null() {
            unsafe {
                let off = (*head).off as usize;
                if off + size <= PAGE_SIZE {
                    pool.free = (*head).next;
                    (*head).next = pool.curr;
                    (*head).prev = ptr::null_mut();
                    (*pool.curr).prev = head;
                    pool.curr = head;

                    let a = (*head).base().add(off);
                    (*head).off += size as u32;
                    return Ok(NonNull::new_unchecked(a));
                }
            }
        }

        let order = order_for(Chunk::HDR + size);
        let base = self.pages.acquire(order);
        if base.is_null() {
            return Err(AllocError::OutOfPages { order });
        }
        debug_assert!(is_aligned(base as usize, PAGE_SIZE));

        let used_pages = (Chunk::HDR + size + PAGE_SIZE - 1) / PAGE_SIZE;
        let spare = (1usize << order) - used_pages;

        unsafe {
            let c = base as *mut Chunk;
            c.write(Chunk::new(order, true, (Chunk::HDR + size) as u32));
            (*c).next = pool.curr;
            (*pool.curr).prev = c;
            pool.curr = c;

            // Whole pages past the request become single-page chunks for
            // later recycling. Pushed in address order, so the free-list
            // head ends up being the highest page.
            for page in used_pages..used_pages + spare {
                let split = base.add(page * PAGE_SIZE) as *mut Chunk;
                split.write(Chunk::new(0, false, Chunk::HDR as u32));
                (*split).next = pool.free;
                pool.free = split;
            }

            trace!(order, spare, "pool grew by a fresh block");
            Ok(NonNull::new_unchecked(base.add(Chunk::HDR)))
        }
    }

    /// Take back an allocation if it is the most recent one of its chunk;
    /// any other pointer is accepted and ignored. A chunk whose cursor
    /// returns to its baseline is unlinked and parked on the free list,
    /// unless it is the current head. Zero-size frees return immediately.
    ///
    /// # Safety
    /// `ptr` must have been returned by [`alloc`](PagePool::alloc) on
    /// this pool, `size` must be the size passed to that call, and the
    /// allocation must not have been freed before.
    #[inline]
    pub unsafe fn free(&mut self, ptr: NonNull<u8>, size: usize) {
        let size = align_up(size, MIN_ALIGN);
        if size == 0 {
            return;
        }
        let pool = &mut *self.raw.as_ptr();

        let mut c = (ptr.as_ptr() as usize & PAGE_MASK) as *mut Chunk;
        // An address in the pool's first page masks down to the pool
        // record, not to a chunk descriptor.
        if c as *mut PoolHeader == self.raw.as_ptr() {
            c = self.first_chunk();
        }

        if ptr.as_ptr() as usize + size != (*c).base() as usize + (*c).off as usize {
            return;
        }
        (*c).off -= size as u32;

        if (*c).off == (*c).start_off() && c != pool.curr {
            // Unlink from the current list. The head never migrates, so
            // `prev` is non-null here.
            let next = (*c).next;
            let prev = (*c).prev;
            debug_assert!(!prev.is_null());
            if !next.is_null() {
                (*next).prev = prev;
            }
            (*prev).next = next;

            (*c).next = pool.free;
            pool.free = c;
        }
    }

    /// Snapshot the pool's counters. Walks both lists.
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats::default();
        unsafe {
            let pool = &*self.raw.as_ptr();

            let mut c = pool.curr;
            while !c.is_null() {
                stats.current_chunks += 1;
                stats.used_bytes += ((*c).off - (*c).start_off()) as usize;
                if (*c).owner {
                    stats.reserved_bytes += (*c).capacity();
                }
                c = (*c).next;
            }

            let mut c = pool.free;
            while !c.is_null() {
                stats.free_chunks += 1;
                if (*c).owner {
                    stats.reserved_bytes += (*c).capacity();
                }
                c = (*c).next;
            }
        }
        stats
    }

    #[inline(always)]
    fn first_chunk(&self) -> *mut Chunk {
        unsafe { (self.raw.as_ptr() as *mut u8).add(FIRST_CHUNK_AT) as *mut Chunk }
    }
}

impl<P: PageProvider> Drop for PagePool<P> {
    fn drop(&mut self) {
        unsafe {
            let pool = &mut *self.raw.as_ptr();
            let first = self.first_chunk();
            let first_order = (*first).order as usize;

            // Collect owner descriptors from both lists before releasing
            // anything: split-page descriptors live inside owner blocks,
            // so a release mid-walk could take the next node with it.
            let mut kill: *mut Chunk = ptr::null_mut();
            for &list in &[pool.curr, pool.free] {
                let mut c = list;
                while !c.is_null() {
                    let next = (*c).next;
                    if (*c).owner && c != first {
                        (*c).next = kill;
                        kill = c;
                    }
                    c = next;
                }
            }

            let mut released = 1usize;
            while !kill.is_null() {
                let next = (*kill).next;
                self.pages.release((*kill).base(), (*kill).order as usize);
                released += 1;
                kill = next;
            }

            // The pool record and the first descriptor live in this
            // block; nothing may touch them past this point.
            self.pages.release(self.raw.as_ptr() as *mut u8, first_order);
            trace!(blocks = released, "pool destroyed");
        }
    }
}

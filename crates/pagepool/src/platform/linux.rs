//! Linux page mapping via `mmap`/`munmap`.

use core::ptr;

/// Map anonymous read-write memory.
///
/// # Safety
/// `size` must be non-zero and page-aligned.
pub unsafe fn map_pages(size: usize) -> *mut u8 {
    let result = libc::mmap(
        ptr::null_mut(),
        size,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
    );
    if result == libc::MAP_FAILED {
        ptr::null_mut()
    } else {
        result as *mut u8
    }
}

/// Unmap memory.
///
/// # Safety
/// `ptr` must have been returned by [`map_pages`] with the same `size`.
pub unsafe fn unmap_pages(ptr: *mut u8, size: usize) {
    libc::munmap(ptr as *mut libc::c_void, size);
}

//! Platform page mapping. Each OS backend exposes the same two calls and
//! is re-exported as `sys` for the current target.

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "linux")]
pub use linux as sys;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "macos")]
pub use macos as sys;

/// Map anonymous read-write pages. Returns null on failure.
///
/// # Safety
/// `size` must be non-zero and a multiple of the system page size.
#[inline]
pub unsafe fn map_pages(size: usize) -> *mut u8 {
    sys::map_pages(size)
}

/// Unmap pages previously obtained from [`map_pages`].
///
/// # Safety
/// `ptr` must have been returned by a successful [`map_pages`] call with
/// the same `size`, and must not be unmapped twice.
#[inline]
pub unsafe fn unmap_pages(ptr: *mut u8, size: usize) {
    sys::unmap_pages(ptr, size);
}

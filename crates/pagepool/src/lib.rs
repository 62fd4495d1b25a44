//! Chunked memory pool: page-order chunks from a pluggable provider,
//! bump allocation within single-page chunks, trailing-only reclaim.

extern crate libc;

pub mod chunk;
pub mod error;
pub mod order;
pub mod platform;
pub mod pool;
pub mod provider;
pub mod util;

pub use error::AllocError;
pub use pool::{PagePool, PoolStats, MAX_ALLOC, MAX_CAPACITY};
pub use provider::{PageProvider, SysPages};

//! Failure surface of the pool.

use thiserror::Error;

/// Errors returned by pool construction and allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The page provider could not supply a block of the requested order.
    #[error("page provider exhausted (order {order})")]
    OutOfPages { order: usize },

    /// The request exceeds the largest span a single chunk can cover.
    #[error("requested {size} bytes, at most {max} supported")]
    RequestTooLarge { size: usize, max: usize },
}

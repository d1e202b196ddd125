//! Pool error types.

use std::fmt;

/// Errors that can occur during pool construction or operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The pool has been shut down.
    Closed,

    /// No idle worker is available and the pool is at capacity
    /// (only returned in non-blocking mode).
    Overload,

    /// The pool was constructed with a capacity of zero.
    InvalidPoolSize,

    /// The pool was constructed with a zero expiry horizon.
    InvalidPoolExpiry,

    /// A function pool was constructed without a callable.
    InvalidPoolFunc,

    /// A timed operation exceeded its deadline.
    Timeout,
}

impl PoolError {
    /// Check if this is a closed-pool error.
    pub fn is_closed(&self) -> bool {
        matches!(self, PoolError::Closed)
    }

    /// Check if this is an overload error.
    pub fn is_overload(&self) -> bool {
        matches!(self, PoolError::Overload)
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PoolError::Timeout)
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Closed => {
                write!(f, "pool has been closed")
            }
            PoolError::Overload => {
                write!(f, "pool is overloaded")
            }
            PoolError::InvalidPoolSize => {
                write!(f, "invalid pool size")
            }
            PoolError::InvalidPoolExpiry => {
                write!(f, "invalid pool expiry")
            }
            PoolError::InvalidPoolFunc => {
                write!(f, "invalid pool function")
            }
            PoolError::Timeout => {
                write!(f, "operation timed out")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(PoolError::Closed.is_closed());
        assert!(!PoolError::Closed.is_overload());
        assert!(PoolError::Overload.is_overload());
        assert!(PoolError::Timeout.is_timeout());
        assert!(!PoolError::Timeout.is_closed());
    }

    #[test]
    fn test_display() {
        assert_eq!(PoolError::Closed.to_string(), "pool has been closed");
        assert_eq!(PoolError::Overload.to_string(), "pool is overloaded");
        assert_eq!(PoolError::InvalidPoolSize.to_string(), "invalid pool size");
        assert!(PoolError::Timeout.to_string().contains("timed out"));
    }
}

//! Client-side error type.

use thiserror::Error;

use punchcard_core::StoreError;

/// Errors surfaced by [`crate::LoyaltyClient`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying store operation failed. Forwarded unchanged; cached
    /// state is left as it was.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The caller's cancellation token fired before the operation completed.
    /// No cache mutation was applied.
    #[error("operation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use punchcard_core::CustomerId;

    #[test]
    fn test_store_errors_pass_through_unchanged() {
        let err = ClientError::from(StoreError::NotFound(CustomerId::new(5)));
        assert_eq!(err.to_string(), "customer not found: 5");
    }

    #[test]
    fn test_cancelled_display() {
        assert_eq!(ClientError::Cancelled.to_string(), "operation cancelled");
    }
}

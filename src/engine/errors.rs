// ============================================================================
// Allocation Errors
// Failures surfaced by the recalculation cascade
// ============================================================================

use crate::domain::{GroupId, OrderId};
use crate::numeric::NumericError;
use std::fmt;

/// Errors that abort a cascade run.
///
/// Broken invariants are not errors: the validator reports them as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The group vanished between the trigger and the cascade
    GroupNotFound(GroupId),
    /// The changed order is not part of the group (anymore)
    OrderNotFound { group_id: GroupId, order_id: OrderId },
    /// An item or order carries a value the engine refuses to compute with
    InvalidInput(String),
    /// Monetary arithmetic failed
    Numeric(NumericError),
    /// The storage collaborator failed; the surrounding unit of work must roll back
    Persistence(String),
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::GroupNotFound(group_id) => write!(f, "group {} not found", group_id),
            AllocationError::OrderNotFound { group_id, order_id } => {
                write!(f, "order {} not found in group {}", order_id, group_id)
            },
            AllocationError::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
            AllocationError::Numeric(err) => write!(f, "numeric error: {}", err),
            AllocationError::Persistence(reason) => write!(f, "persistence failure: {}", reason),
        }
    }
}

impl std::error::Error for AllocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AllocationError::Numeric(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NumericError> for AllocationError {
    fn from(err: NumericError) -> Self {
        AllocationError::Numeric(err)
    }
}

/// Result type alias for cascade operations
pub type AllocationResult<T> = Result<T, AllocationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = AllocationError::InvalidInput("quantity must be at least 1".to_string());
        assert_eq!(err.to_string(), "invalid input: quantity must be at least 1");

        let err = AllocationError::from(NumericError::DivisionByZero);
        assert_eq!(err.to_string(), "numeric error: division by zero");
        assert!(err.source().is_some());
    }
}

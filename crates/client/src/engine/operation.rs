//! Per-operation lifecycle flag owned by the invoking surface.

use crate::error::{CartError, CartOperation};

/// Where one operation is in its lifecycle.
///
/// ```text
/// Idle -> InFlight -> Committed
///                  \-> RolledBack
/// ```
///
/// A settled operation can start again from `Committed` or `RolledBack`.
/// The engine does not consult this flag; surfaces use it to disable the
/// control that triggered an operation until it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    InFlight,
    Committed,
    RolledBack,
}

impl OperationState {
    /// Whether the operation is waiting on the backend.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// Mark the operation in flight.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Busy`] if it is already in flight.
    pub const fn begin(&mut self, operation: CartOperation) -> Result<(), CartError> {
        if self.is_in_flight() {
            return Err(CartError::Busy(operation));
        }
        *self = Self::InFlight;
        Ok(())
    }

    /// Record how the operation ended.
    pub const fn settle<T>(&mut self, result: &Result<T, CartError>) {
        *self = match result {
            Ok(_) => Self::Committed,
            Err(_) => Self::RolledBack,
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::remote::RemoteError;

    #[test]
    fn test_lifecycle_commit() {
        let mut state = OperationState::default();
        assert_eq!(state, OperationState::Idle);
        state.begin(CartOperation::AddItem).unwrap();
        assert!(state.is_in_flight());
        state.settle(&Ok::<(), CartError>(()));
        assert_eq!(state, OperationState::Committed);
    }

    #[test]
    fn test_lifecycle_rollback_then_retry() {
        let mut state = OperationState::default();
        state.begin(CartOperation::RemoveItem).unwrap();
        state.settle(&Err::<(), _>(CartError::remote(
            CartOperation::RemoveItem,
            RemoteError::status(500, ""),
        )));
        assert_eq!(state, OperationState::RolledBack);
        assert!(state.begin(CartOperation::RemoveItem).is_ok());
    }

    #[test]
    fn test_begin_while_in_flight_is_busy() {
        let mut state = OperationState::default();
        state.begin(CartOperation::EmptyCart).unwrap();
        let err = state.begin(CartOperation::EmptyCart).unwrap_err();
        assert!(matches!(err, CartError::Busy(CartOperation::EmptyCart)));
        assert!(state.is_in_flight());
    }
}

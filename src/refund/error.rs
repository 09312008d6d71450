// Error types for refund policy evaluation
// Selection failures here indicate configuration faults, not user mistakes

use thiserror::Error;

/// Result alias for refund policy operations
pub type RefundResult<T> = Result<T, RefundError>;

/// Errors raised by the refund schedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefundError {
    /// No window contains the elapsed time since ordering
    ///
    /// The production windows cover every moment from the order time
    /// on, so this only happens when the clock runs backwards or the
    /// schedule was built wrong. Callers surface it as a fault.
    #[error("No refund policy applies to the order at the given time")]
    NoApplicablePolicy,

    /// The window set has a gap, an overlap or a bounded tail
    #[error("Invalid refund schedule: {0}")]
    InvalidSchedule(String),
}

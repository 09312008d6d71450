// Error types for coupon application
// Covers lookup, usability and definition validation failures

use thiserror::Error;

/// Result alias for coupon operations
pub type CouponResult<T> = Result<T, CouponError>;

/// Errors raised while validating or consuming a member coupon
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// The member holds no issuance of the requested coupon
    #[error("Coupon not found")]
    NotFound,

    /// The usability window of the issuance has passed
    #[error("The coupon has expired")]
    Expired,

    /// The issuance was already consumed by another order
    #[error("The coupon has already been used")]
    AlreadyUsed,

    /// Discount rates are integer percentages between 0 and 100
    #[error("Invalid discount rate: {0}")]
    InvalidDiscountRate(u8),
}

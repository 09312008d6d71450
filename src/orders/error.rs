use validator::ValidationErrors;

use crate::coupons::CouponError;
use crate::money::QuantityError;
use crate::orders::repository::StoreError;
use crate::refund::RefundError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cannot order products that are missing from the cart")]
    InvalidProducts,

    #[error("Product is no longer available: {0}")]
    ProductUnavailable(String),

    #[error("Orders are limited to 100,000 units in total, got {0}")]
    QuantityExceeded(u64),

    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("You do not have permission to access this order")]
    Forbidden,

    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("The cancellation period for this order has passed")]
    CancellationExpired,

    #[error(transparent)]
    Refund(#[from] RefundError),

    #[error("Order not found")]
    NotFound,

    #[error("Order price calculation overflowed")]
    PriceOverflow,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        OrderError::Storage(err.to_string())
    }
}

impl OrderError {
    /// Whether this error is an engine or storage fault rather than a
    /// rejected request
    ///
    /// Embedders normally map faults to 5xx-class responses and
    /// everything else to 4xx-class responses.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            OrderError::Refund(_) | OrderError::PriceOverflow | OrderError::Storage(_)
        )
    }
}

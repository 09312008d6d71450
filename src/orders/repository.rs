use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::coupons::MemberCoupon;
use crate::models::{CartItem, Product};
use crate::orders::models::Order;

/// Opaque storage failure reported by a repository implementation
///
/// Backends wrap their own driver errors into the message; the service
/// layer surfaces it as a fault without inspecting the cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// Create a new StoreError from any displayable cause
    pub fn new(cause: impl std::fmt::Display) -> Self {
        StoreError(cause.to_string())
    }
}

/// Repository for cart read operations
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find all cart items belonging to a member
    async fn items_for_member(&self, member_id: i64) -> Result<Vec<CartItem>, StoreError>;
}

/// Repository for product catalog reads
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Find multiple products by IDs
    ///
    /// Missing ids are simply absent from the result; the caller
    /// decides whether absence is an error.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, StoreError>;
}

/// Repository for member coupon issuance records
#[async_trait]
pub trait MemberCouponRepository: Send + Sync {
    /// Find the issuance record of a coupon for a member
    async fn find(
        &self,
        member_id: i64,
        coupon_id: i64,
    ) -> Result<Option<MemberCoupon>, StoreError>;

    /// Persist the state of an issuance record
    ///
    /// Implementations must write the used flag atomically against the
    /// stored record so two concurrent orders cannot both consume the
    /// same coupon.
    async fn update(&self, coupon: &MemberCoupon) -> Result<(), StoreError>;

    /// Issue the first-order thank-you coupon to a member
    ///
    /// The implementation assigns the coupon definition id and builds
    /// the issuance record effective at `now`.
    async fn issue_first_order_coupon(
        &self,
        member_id: i64,
        now: DateTime<Utc>,
    ) -> Result<MemberCoupon, StoreError>;
}

/// Repository for order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a newly placed order
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// Find an order by ID
    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Find all orders of a member, most recent first
    async fn list_by_member(&self, member_id: i64) -> Result<Vec<Order>, StoreError>;

    /// Flip an order to cancelled
    ///
    /// Implementations must apply the status change atomically against
    /// the stored active record.
    async fn mark_cancelled(&self, order_id: Uuid) -> Result<(), StoreError>;

    /// Count how many orders a member has ever placed
    async fn count_by_member(&self, member_id: i64) -> Result<u64, StoreError>;
}

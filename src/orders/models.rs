use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::coupons::Coupon;
use crate::models::Product;
use crate::money::{Money, Quantity};
use crate::orders::error::OrderError;
use crate::orders::price_calculator::PriceCalculator;
use crate::refund::RefundSchedule;

/// Flat delivery fee charged on every order, in minor currency units
pub const DELIVERY_PRICE: Money = Money::from_minor_units(3_000);

/// Hard cap on the total unit count of a single order
pub const MAX_ORDER_QUANTITY: u64 = 100_000;

/// Order status enum representing the lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Cancelled,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(OrderStatus::Active),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Active
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered line, snapshotted from the catalog at order time
///
/// Owns its copy of the product data so later catalog changes never
/// alter a historical order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: i64,
    pub name: String,
    /// Unit price at order time, in minor currency units
    pub price: Money,
    pub image_url: String,
    pub quantity: Quantity,
}

impl OrderLineItem {
    /// Snapshot a catalog product at the requested quantity
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        OrderLineItem {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity,
        }
    }
}

/// The coupon consumed by an order, snapshotted at application time
///
/// Holds the definition id for the ledger restore on cancellation; the
/// issuance record itself stays with the coupon ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub coupon_id: i64,
    pub name: String,
    pub discount_rate: u8,
}

impl From<&Coupon> for AppliedCoupon {
    fn from(coupon: &Coupon) -> Self {
        AppliedCoupon {
            coupon_id: coupon.id,
            name: coupon.name.clone(),
            discount_rate: coupon.discount_rate,
        }
    }
}

/// A priced, immutable snapshot of purchased line items
///
/// Created once at placement and mutated only by cancellation, which
/// flips the status to `Cancelled`. Orders are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub member_id: i64,
    pub items: Vec<OrderLineItem>,
    pub coupon: Option<AppliedCoupon>,
    pub total_price: Money,
    pub discounted_total_price: Money,
    pub delivery_price: Money,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
}

impl Order {
    /// Place a new order over snapshotted line items
    ///
    /// # Arguments
    /// * `member_id` - The owning member
    /// * `items` - Line items snapshotted from the catalog
    /// * `ordered_at` - Placement time
    ///
    /// # Returns
    /// The active order with its totals computed, or an error when the
    /// quantity cap is exceeded or the totals overflow.
    pub fn place(
        member_id: i64,
        items: Vec<OrderLineItem>,
        ordered_at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        let requested: u64 = items.iter().map(|item| u64::from(item.quantity.get())).sum();
        if requested > MAX_ORDER_QUANTITY {
            return Err(OrderError::QuantityExceeded(requested));
        }

        let total_price =
            PriceCalculator::order_total(&items).ok_or(OrderError::PriceOverflow)?;

        Ok(Order {
            id: Uuid::new_v4(),
            member_id,
            items,
            coupon: None,
            total_price,
            discounted_total_price: total_price,
            delivery_price: DELIVERY_PRICE,
            status: OrderStatus::Active,
            ordered_at,
        })
    }

    /// Fold a coupon discount into the totals and snapshot the definition
    ///
    /// The caller is responsible for the usability checks on the
    /// issuance record; rates arrive already validated to `0..=100`.
    pub fn apply_coupon(&mut self, coupon: &Coupon) {
        self.discounted_total_price =
            PriceCalculator::discounted_total(self.total_price, coupon.discount_rate);
        self.coupon = Some(AppliedCoupon::from(coupon));
    }

    /// Derived discount amount; zero when no coupon was applied
    pub fn coupon_discount_price(&self) -> Money {
        self.total_price.saturating_sub(self.discounted_total_price)
    }

    /// Whether the order is still active
    pub fn is_valid(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Check that the given member owns this order
    pub fn check_owner(&self, member_id: i64) -> Result<(), OrderError> {
        if self.member_id != member_id {
            return Err(OrderError::Forbidden);
        }
        Ok(())
    }

    /// Cancel the order and compute the refund
    ///
    /// # Arguments
    /// * `schedule` - The refund windows in force
    /// * `now` - Cancellation time
    ///
    /// # Returns
    /// The refund, computed from the discounted total under the policy
    /// selected for the elapsed time. Fails without mutating anything
    /// when the order is already cancelled, the cancellation window has
    /// passed, or no window contains `now`.
    pub fn cancel(
        &mut self,
        schedule: &RefundSchedule,
        now: DateTime<Utc>,
    ) -> Result<Money, OrderError> {
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::AlreadyCancelled);
        }

        let policy = schedule.select(self.ordered_at, now)?;
        if !policy.allows_cancellation() {
            return Err(OrderError::CancellationExpired);
        }

        let refund = policy.refund_amount(self.discounted_total_price);
        self.status = OrderStatus::Cancelled;
        Ok(refund)
    }
}

/// Request DTO for one ordered product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderProductRequest {
    pub product_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

/// Request DTO for creating a new order
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub coupon_id: Option<i64>,
    #[validate(length(min = 1, message = "Order must contain at least one product"))]
    pub items: Vec<OrderProductRequest>,
}

/// Response DTO for a created or fetched order
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub total_price: Money,
    pub discounted_total_price: Money,
    pub coupon_discount_price: Money,
    pub delivery_price: Money,
    pub coupon: Option<CouponSummary>,
    pub items: Vec<OrderItemResponse>,
    pub is_valid: bool,
}

/// Applied coupon summary embedded in order responses
#[derive(Debug, Serialize)]
pub struct CouponSummary {
    pub id: i64,
    pub name: String,
    pub discount_rate: u8,
}

/// Response DTO for an ordered line item
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub name: String,
    pub price: Money,
    pub image_url: String,
    pub quantity: u32,
}

/// Response DTO for a cancelled order
#[derive(Debug, Serialize)]
pub struct CancelOrderResponse {
    pub refund_price: Money,
}

impl From<&AppliedCoupon> for CouponSummary {
    fn from(coupon: &AppliedCoupon) -> Self {
        CouponSummary {
            id: coupon.coupon_id,
            name: coupon.name.clone(),
            discount_rate: coupon.discount_rate,
        }
    }
}

impl From<&OrderLineItem> for OrderItemResponse {
    fn from(item: &OrderLineItem) -> Self {
        OrderItemResponse {
            product_id: item.product_id,
            name: item.name.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
            quantity: item.quantity.get(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        OrderResponse {
            order_id: order.id,
            total_price: order.total_price,
            discounted_total_price: order.discounted_total_price,
            coupon_discount_price: order.coupon_discount_price(),
            delivery_price: order.delivery_price,
            coupon: order.coupon.as_ref().map(CouponSummary::from),
            items: order.items.iter().map(OrderItemResponse::from).collect(),
            is_valid: order.is_valid(),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn ordered_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn items_strategy() -> impl Strategy<Value = Vec<OrderLineItem>> {
        prop::collection::vec((1u64..=100_000u64, 1u32..=50u32), 1..=8).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(index, (price, quantity))| OrderLineItem {
                    product_id: index as i64 + 1,
                    name: format!("Product {}", index + 1),
                    price: Money::from_minor_units(price),
                    image_url: String::new(),
                    quantity: Quantity::new(quantity).unwrap(),
                })
                .collect()
        })
    }

    /// Without a coupon the discounted total equals the total and the
    /// discount is zero
    #[test]
    fn prop_no_coupon_means_no_discount() {
        proptest!(|(items in items_strategy())| {
            let order = Order::place(1, items, ordered_at()).unwrap();
            prop_assert_eq!(order.discounted_total_price, order.total_price);
            prop_assert_eq!(order.coupon_discount_price(), Money::ZERO);
        });
    }

    /// With a coupon of rate r the discounted total follows the floor
    /// formula exactly
    #[test]
    fn prop_coupon_discount_follows_the_formula() {
        proptest!(|(items in items_strategy(), rate in 0u8..=100u8)| {
            let coupon = Coupon::new(
                9,
                "Property coupon",
                rate,
                30,
                ordered_at() + chrono::Duration::days(30),
            )
            .unwrap();

            let mut order = Order::place(1, items, ordered_at()).unwrap();
            order.apply_coupon(&coupon);

            let total = order.total_price.minor_units();
            let expected_discount = (u128::from(total) * u128::from(rate) / 100) as u64;
            prop_assert_eq!(
                order.discounted_total_price.minor_units(),
                total - expected_discount
            );
            prop_assert_eq!(order.coupon_discount_price().minor_units(), expected_discount);
        });
    }

    /// The total is the sum of the line subtotals
    #[test]
    fn prop_total_is_sum_of_subtotals() {
        proptest!(|(items in items_strategy())| {
            let expected: u64 = items
                .iter()
                .map(|item| item.price.minor_units() * u64::from(item.quantity.get()))
                .sum();
            let order = Order::place(1, items, ordered_at()).unwrap();
            prop_assert_eq!(order.total_price.minor_units(), expected);
        });
    }
}

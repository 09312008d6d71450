//! Order pricing and refund engine for a shopping backend.
//!
//! Prices carts in integer minor units, applies member coupons, and
//! settles cancellations against a time-windowed refund schedule.
//! Storage is abstracted behind async repository traits so embedders
//! bring their own persistence.

pub mod coupons;
pub mod models;
pub mod money;
pub mod orders;
pub mod refund;

pub use coupons::{
    Coupon, CouponError, CouponResult, MemberCoupon, FIRST_ORDER_COUPON_NAME,
    FIRST_ORDER_COUPON_PERIOD_DAYS, FIRST_ORDER_COUPON_RATE,
};
pub use models::{CartItem, Product};
pub use money::{Money, Quantity, QuantityError};
pub use orders::{
    AppliedCoupon, CancelOrderResponse, CartRepository, CouponSummary, CreateOrderRequest,
    MemberCouponRepository, Order, OrderError, OrderItemResponse, OrderLineItem,
    OrderProductRequest, OrderRepository, OrderResponse, OrderService, OrderStatus,
    PriceCalculator, ProductCatalog, StoreError, DELIVERY_PRICE, MAX_ORDER_QUANTITY,
};
pub use refund::{RefundError, RefundPolicy, RefundResult, RefundSchedule};

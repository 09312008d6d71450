use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::coupons::{CouponError, MemberCoupon};
use crate::models::{CartItem, Product};
use crate::money::Quantity;
use crate::orders::{
    CancelOrderResponse, CartRepository, CreateOrderRequest, MemberCouponRepository, Order,
    OrderError, OrderLineItem, OrderRepository, OrderResponse, ProductCatalog,
};
use crate::refund::RefundSchedule;

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderRepository>,
    member_coupons: Arc<dyn MemberCouponRepository>,
    refund_schedule: RefundSchedule,
}

impl OrderService {
    /// Create a new OrderService with the standard refund schedule
    pub fn new(
        carts: Arc<dyn CartRepository>,
        products: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderRepository>,
        member_coupons: Arc<dyn MemberCouponRepository>,
    ) -> Self {
        Self {
            carts,
            products,
            orders,
            member_coupons,
            refund_schedule: RefundSchedule::standard(),
        }
    }

    /// Create a new OrderService with an explicit refund schedule
    pub fn with_refund_schedule(
        carts: Arc<dyn CartRepository>,
        products: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderRepository>,
        member_coupons: Arc<dyn MemberCouponRepository>,
        refund_schedule: RefundSchedule,
    ) -> Self {
        Self {
            carts,
            products,
            orders,
            member_coupons,
            refund_schedule,
        }
    }

    /// Create a new order from the member's cart
    ///
    /// # Arguments
    /// * `member_id` - ID of the authenticated member placing the order
    /// * `request` - Order creation request with items and optional coupon
    /// * `now` - Placement time
    ///
    /// # Returns
    /// The created order or an error
    ///
    /// # Validation
    /// - All requested products must be in the member's cart
    /// - All products must still exist in the catalog and not be deleted
    /// - All quantities must be positive, with at most 100,000 units in total
    /// - Product prices are snapshotted from the catalog at order time
    /// - An applied coupon must be issued to the member, unused and unexpired
    /// - A member's first order earns them the first order thank-you coupon
    pub async fn create_order(
        &self,
        member_id: i64,
        request: CreateOrderRequest,
        now: DateTime<Utc>,
    ) -> Result<OrderResponse, OrderError> {
        request.validate()?;

        // Fetch the cart and index it by product
        let cart_items = self.carts.items_for_member(member_id).await?;
        let cart: HashMap<i64, &CartItem> = cart_items
            .iter()
            .map(|item| (item.product.id, item))
            .collect();

        // Every requested product must come from the member's own cart
        for item_request in &request.items {
            if !cart.contains_key(&item_request.product_id) {
                return Err(OrderError::InvalidProducts);
            }
        }

        // Fetch current catalog state for price snapshots
        let product_ids: Vec<i64> = request.items.iter().map(|item| item.product_id).collect();
        let products = self.products.find_by_ids(&product_ids).await?;
        let catalog: HashMap<i64, Product> = products
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        // Snapshot each line, rejecting products that left the catalog
        let mut line_items = Vec::with_capacity(request.items.len());
        for item_request in &request.items {
            let product = catalog.get(&item_request.product_id).ok_or_else(|| {
                let name = cart
                    .get(&item_request.product_id)
                    .map(|item| item.product.name.clone())
                    .unwrap_or_else(|| item_request.product_id.to_string());
                OrderError::ProductUnavailable(name)
            })?;

            if product.deleted {
                return Err(OrderError::ProductUnavailable(product.name.clone()));
            }

            let quantity = Quantity::new(item_request.quantity)?;
            line_items.push(OrderLineItem::from_product(product, quantity));
        }

        let mut order = Order::place(member_id, line_items, now)?;

        // Consume the coupon before persisting anything
        let mut used_coupon: Option<MemberCoupon> = None;
        if let Some(coupon_id) = request.coupon_id {
            let member_coupon = self
                .member_coupons
                .find(member_id, coupon_id)
                .await?
                .ok_or(CouponError::NotFound)?;

            let used = member_coupon.mark_used(now)?;
            order.apply_coupon(&used.coupon);
            used_coupon = Some(used);
        }

        // Decide first-order eligibility before the insert makes it false
        let is_first_order = self.orders.count_by_member(member_id).await? == 0;

        self.orders.insert(&order).await?;

        if let Some(used) = &used_coupon {
            self.member_coupons.update(used).await?;
        }

        if is_first_order {
            let issued = self
                .member_coupons
                .issue_first_order_coupon(member_id, now)
                .await?;
            tracing::info!(
                "Issued first order coupon {} to member {}",
                issued.coupon.id,
                member_id
            );
        }

        tracing::info!("Created order {} for member {}", order.id, member_id);

        Ok(OrderResponse::from(&order))
    }

    /// Cancel an order and compute its refund
    ///
    /// # Arguments
    /// * `member_id` - ID of the authenticated member (for authorization)
    /// * `order_id` - UUID of the order to cancel
    /// * `now` - Cancellation time
    ///
    /// # Returns
    /// The refund amount, or an error when the order does not exist,
    /// belongs to someone else, is already cancelled, or the
    /// cancellation window has passed
    ///
    /// # Validation
    /// - The refund is a fraction of the discounted total; delivery fees
    ///   are not refunded
    /// - A coupon consumed by the order becomes available again
    pub async fn cancel_order(
        &self,
        member_id: i64,
        order_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CancelOrderResponse, OrderError> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        order.check_owner(member_id)?;

        let refund_price = match order.cancel(&self.refund_schedule, now) {
            Ok(refund) => refund,
            Err(err) => {
                if err.is_fault() {
                    tracing::error!("Refund selection failed for order {}: {}", order_id, err);
                }
                return Err(err);
            }
        };

        self.orders.mark_cancelled(order_id).await?;

        // Release the coupon the order consumed
        if let Some(applied) = &order.coupon {
            self.restore_coupon(member_id, applied.coupon_id, order_id)
                .await?;
        }

        tracing::info!(
            "Cancelled order {} for member {}, refunding {}",
            order_id,
            member_id,
            refund_price
        );

        Ok(CancelOrderResponse { refund_price })
    }

    /// Get a specific order
    ///
    /// # Arguments
    /// * `member_id` - ID of the authenticated member (for authorization)
    /// * `order_id` - UUID of the order
    ///
    /// # Returns
    /// The order, or an error if it does not exist or belongs to
    /// someone else
    pub async fn get_order(
        &self,
        member_id: i64,
        order_id: Uuid,
    ) -> Result<OrderResponse, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        order.check_owner(member_id)?;

        Ok(OrderResponse::from(&order))
    }

    /// Get all orders of a member, most recent first
    ///
    /// # Arguments
    /// * `member_id` - ID of the authenticated member
    ///
    /// # Returns
    /// The member's orders, cancelled ones included
    pub async fn list_orders(&self, member_id: i64) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self.orders.list_by_member(member_id).await?;

        Ok(orders.iter().map(OrderResponse::from).collect())
    }

    /// Mark a consumed coupon unused again after a cancellation
    ///
    /// A missing ledger record is logged and skipped so the
    /// cancellation itself still completes.
    async fn restore_coupon(
        &self,
        member_id: i64,
        coupon_id: i64,
        order_id: Uuid,
    ) -> Result<(), OrderError> {
        match self.member_coupons.find(member_id, coupon_id).await? {
            Some(member_coupon) => {
                let restored = member_coupon.mark_unused();
                self.member_coupons.update(&restored).await?;
            }
            None => {
                tracing::warn!(
                    "Coupon {} from order {} is missing from the ledger, skipping restore",
                    coupon_id,
                    order_id
                );
            }
        }

        Ok(())
    }
}

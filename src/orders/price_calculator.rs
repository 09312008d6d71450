use crate::money::{Money, Quantity};
use crate::orders::models::OrderLineItem;

/// Service for calculating order prices and discounts
///
/// All arithmetic happens on integer minor units. Percentage discounts
/// floor toward zero, so a rounding remainder always stays with the
/// total rather than the discount.
pub struct PriceCalculator;

impl PriceCalculator {
    /// Calculate the subtotal for one line item
    ///
    /// # Arguments
    /// * `price` - Unit price at time of order
    /// * `quantity` - Number of units ordered
    ///
    /// # Returns
    /// Subtotal (price * quantity), or `None` on overflow
    pub fn subtotal(price: Money, quantity: Quantity) -> Option<Money> {
        price.checked_mul(quantity.get())
    }

    /// Calculate the total price for an order
    ///
    /// # Arguments
    /// * `items` - Slice of all line items of the order
    ///
    /// # Returns
    /// Total price (sum of all subtotals), or `None` if any step overflows
    pub fn order_total(items: &[OrderLineItem]) -> Option<Money> {
        items.iter().try_fold(Money::ZERO, |total, item| {
            let subtotal = Self::subtotal(item.price, item.quantity)?;
            total.checked_add(subtotal)
        })
    }

    /// Calculate the amount a coupon takes off a total
    ///
    /// # Arguments
    /// * `total` - The pre-discount total
    /// * `discount_rate` - Percentage rate in `0..=100`
    ///
    /// # Returns
    /// The floored discount amount
    pub fn coupon_discount(total: Money, discount_rate: u8) -> Money {
        total.percentage(discount_rate)
    }

    /// Calculate the total after a coupon discount
    ///
    /// # Arguments
    /// * `total` - The pre-discount total
    /// * `discount_rate` - Percentage rate in `0..=100`
    ///
    /// # Returns
    /// The discounted total, never below zero
    pub fn discounted_total(total: Money, discount_rate: u8) -> Money {
        total.saturating_sub(Self::coupon_discount(total, discount_rate))
    }
}

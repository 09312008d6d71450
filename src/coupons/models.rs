use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::coupons::error::{CouponError, CouponResult};

/// Name of the thank-you coupon granted on a member's first order
pub const FIRST_ORDER_COUPON_NAME: &str = "First order thank-you coupon";

/// Discount rate of the first-order coupon, in percent
pub const FIRST_ORDER_COUPON_RATE: u8 = 10;

/// Usability period of the first-order coupon, in days from issuance
pub const FIRST_ORDER_COUPON_PERIOD_DAYS: i64 = 10;

/// An immutable discount definition
///
/// Definitions are created by the coupon admin collaborator; the engine
/// only reads them when applying a discount or issuing the first-order
/// coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    pub name: String,
    /// Integer percentage between 0 and 100
    pub discount_rate: u8,
    /// Issuances stay usable for this many days
    pub period_days: i64,
    /// Hard expiry of the definition itself
    pub expires_at: DateTime<Utc>,
}

impl Coupon {
    /// Create a definition, rejecting discount rates above 100
    pub fn new(
        id: i64,
        name: impl Into<String>,
        discount_rate: u8,
        period_days: i64,
        expires_at: DateTime<Utc>,
    ) -> CouponResult<Self> {
        if discount_rate > 100 {
            return Err(CouponError::InvalidDiscountRate(discount_rate));
        }
        Ok(Coupon {
            id,
            name: name.into(),
            discount_rate,
            period_days,
            expires_at,
        })
    }

    /// The definition of the coupon granted on a member's first order
    ///
    /// Storage assigns the id; the rate and period are fixed domain
    /// facts, so construction cannot fail.
    pub fn first_order(id: i64, created_at: DateTime<Utc>) -> Coupon {
        Coupon {
            id,
            name: FIRST_ORDER_COUPON_NAME.to_string(),
            discount_rate: FIRST_ORDER_COUPON_RATE,
            period_days: FIRST_ORDER_COUPON_PERIOD_DAYS,
            expires_at: created_at + Duration::days(FIRST_ORDER_COUPON_PERIOD_DAYS),
        }
    }

    /// How long an issuance of this coupon stays usable
    pub fn validity_period(&self) -> Duration {
        Duration::days(self.period_days)
    }
}

/// A per-member issuance of a coupon
///
/// Carries its own usability window and a `used` flag. Transitions
/// return new values instead of mutating in place, so a service holding
/// one cannot observe a half-applied state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCoupon {
    pub member_id: i64,
    pub coupon: Coupon,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
    pub used: bool,
}

impl MemberCoupon {
    /// Issue a coupon to a member
    ///
    /// The usability window always spans the definition's validity
    /// period from the issue time.
    pub fn issue(member_id: i64, coupon: Coupon, issued_at: DateTime<Utc>) -> Self {
        let expired_at = issued_at + coupon.validity_period();
        MemberCoupon {
            member_id,
            coupon,
            issued_at,
            expired_at,
            used: false,
        }
    }

    /// Whether the usability window has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expired_at
    }

    /// Consume the coupon for an order
    ///
    /// Fails if the issuance was already consumed or its window has
    /// passed; otherwise returns the record with `used` set.
    pub fn mark_used(self, now: DateTime<Utc>) -> CouponResult<MemberCoupon> {
        if self.used {
            return Err(CouponError::AlreadyUsed);
        }
        if self.is_expired(now) {
            return Err(CouponError::Expired);
        }
        Ok(MemberCoupon { used: true, ..self })
    }

    /// Release the coupon after the consuming order is cancelled
    ///
    /// Idempotent. Expiry is independent of `used`, so releasing an
    /// expired coupon does not make it usable again.
    pub fn mark_unused(self) -> MemberCoupon {
        MemberCoupon {
            used: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn welcome_coupon() -> Coupon {
        Coupon::new(
            1,
            "Welcome coupon",
            20,
            365,
            base_time() + Duration::days(365),
        )
        .unwrap()
    }

    #[test]
    fn test_coupon_rejects_rate_above_hundred() {
        let result = Coupon::new(1, "Broken", 101, 30, base_time());
        assert_eq!(result, Err(CouponError::InvalidDiscountRate(101)));
    }

    #[test]
    fn test_coupon_accepts_full_rate() {
        let result = Coupon::new(1, "Everything free", 100, 30, base_time());
        assert!(result.is_ok());
    }

    #[test]
    fn test_first_order_coupon_definition() {
        let coupon = Coupon::first_order(42, base_time());

        assert_eq!(coupon.id, 42);
        assert_eq!(coupon.name, FIRST_ORDER_COUPON_NAME);
        assert_eq!(coupon.discount_rate, 10);
        assert_eq!(coupon.period_days, 10);
        assert_eq!(coupon.expires_at, base_time() + Duration::days(10));
    }

    #[test]
    fn test_issue_spans_validity_period() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());

        assert_eq!(issued.member_id, 7);
        assert_eq!(issued.issued_at, base_time());
        assert_eq!(issued.expired_at, base_time() + Duration::days(365));
        assert!(!issued.used);
    }

    #[test]
    fn test_not_expired_at_window_end() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());
        let window_end = base_time() + Duration::days(365);

        assert!(!issued.is_expired(window_end));
        assert!(issued.is_expired(window_end + Duration::seconds(1)));
    }

    #[test]
    fn test_mark_used_sets_flag() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());
        let used = issued.mark_used(base_time() + Duration::days(1)).unwrap();

        assert!(used.used);
    }

    #[test]
    fn test_mark_used_twice_fails() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());
        let used = issued.mark_used(base_time()).unwrap();

        assert_eq!(used.mark_used(base_time()), Err(CouponError::AlreadyUsed));
    }

    #[test]
    fn test_mark_used_after_expiry_fails() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());
        let late = base_time() + Duration::days(366);

        assert_eq!(issued.mark_used(late), Err(CouponError::Expired));
    }

    #[test]
    fn test_mark_unused_releases_the_coupon() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());
        let used = issued.mark_used(base_time()).unwrap();
        let released = used.mark_unused();

        assert!(!released.used);
        // The released coupon can be consumed again by a fresh order
        assert!(released.mark_used(base_time() + Duration::days(2)).is_ok());
    }

    #[test]
    fn test_mark_unused_is_idempotent() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());
        let released = issued.mark_unused().mark_unused();

        assert!(!released.used);
    }

    /// Cancelling an order does not resurrect an expired coupon
    #[test]
    fn test_release_does_not_extend_expiry() {
        let issued = MemberCoupon::issue(7, welcome_coupon(), base_time());
        let used = issued.mark_used(base_time()).unwrap();
        let released = used.mark_unused();
        let late = base_time() + Duration::days(400);

        assert!(released.is_expired(late));
        assert_eq!(released.mark_used(late), Err(CouponError::Expired));
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A time-windowed refund rule, measured in whole days since ordering
///
/// Each variant covers a half-open day window from `ordered_at` and
/// refunds a fixed percentage of the discounted order total. The
/// variants are closed on purpose: the windows below are the whole
/// rule set, evaluated first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundPolicy {
    /// Days [0, 3): the discounted total is refunded in full
    Full,
    /// Days [3, 7): half the discounted total, rounded down
    Half,
    /// Day 7 onwards: cancellation is no longer permitted
    None,
}

impl RefundPolicy {
    /// Evaluation order; together the windows cover every moment from
    /// the order time on
    pub const ALL: [RefundPolicy; 3] = [RefundPolicy::Full, RefundPolicy::Half, RefundPolicy::None];

    /// Day window as (start, exclusive end); an open end means unbounded
    pub const fn window_days(self) -> (i64, Option<i64>) {
        match self {
            RefundPolicy::Full => (0, Some(3)),
            RefundPolicy::Half => (3, Some(7)),
            RefundPolicy::None => (7, None),
        }
    }

    /// Refunded percentage of the discounted order total
    pub const fn refund_rate(self) -> u8 {
        match self {
            RefundPolicy::Full => 100,
            RefundPolicy::Half => 50,
            RefundPolicy::None => 0,
        }
    }

    /// Whether an order placed at `ordered_at` falls in this window at `now`
    ///
    /// Compares timestamps directly instead of a truncated day count,
    /// so an order placed in the future matches no window at all.
    pub fn is_available(self, ordered_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let (start, end) = self.window_days();
        if now < ordered_at + Duration::days(start) {
            return false;
        }
        match end {
            Some(end) => now < ordered_at + Duration::days(end),
            None => true,
        }
    }

    /// Amount refunded for a cancellation under this policy
    ///
    /// `floor(amount * rate / 100)`: the full window refunds exactly,
    /// the half window rounds down to the whole minor unit.
    pub fn refund_amount(self, amount: Money) -> Money {
        amount.percentage(self.refund_rate())
    }

    /// The unbounded window rejects cancellation outright instead of
    /// refunding zero
    pub const fn allows_cancellation(self) -> bool {
        !matches!(self, RefundPolicy::None)
    }

    /// Convert policy to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundPolicy::Full => "full",
            RefundPolicy::Half => "half",
            RefundPolicy::None => "none",
        }
    }

    /// Parse policy from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "full" => Ok(RefundPolicy::Full),
            "half" => Ok(RefundPolicy::Half),
            "none" => Ok(RefundPolicy::None),
            _ => Err(format!("Invalid refund policy: {}", s)),
        }
    }
}

impl std::fmt::Display for RefundPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

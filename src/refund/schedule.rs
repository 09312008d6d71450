use chrono::{DateTime, Utc};

use crate::refund::error::{RefundError, RefundResult};
use crate::refund::policy::RefundPolicy;

/// An ordered set of refund policies covering all time since ordering
///
/// `select` walks the policies in order and returns the first whose
/// window contains the elapsed time. The constructor rejects any window
/// set with a gap, an overlap or a bounded tail, so selection can only
/// fail when `now` precedes the order itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundSchedule {
    policies: Vec<RefundPolicy>,
}

impl RefundSchedule {
    /// Build a schedule, rejecting window sets with a gap, an overlap
    /// or a bounded tail
    pub fn new(policies: Vec<RefundPolicy>) -> RefundResult<Self> {
        let mut expected_start = 0i64;
        let mut unbounded_at: Option<usize> = None;
        for (position, policy) in policies.iter().enumerate() {
            if let Some(unbounded) = unbounded_at {
                return Err(RefundError::InvalidSchedule(format!(
                    "unbounded window {} must be the last",
                    unbounded
                )));
            }
            let (start, end) = policy.window_days();
            if start != expected_start {
                return Err(RefundError::InvalidSchedule(format!(
                    "window {} starts at day {}, expected day {}",
                    position, start, expected_start
                )));
            }
            match end {
                Some(end) if end <= start => {
                    return Err(RefundError::InvalidSchedule(format!(
                        "window {} is empty ({}..{})",
                        position, start, end
                    )));
                }
                Some(end) => expected_start = end,
                None => unbounded_at = Some(position),
            }
        }
        if unbounded_at.is_none() {
            return Err(RefundError::InvalidSchedule(
                "the last window must be unbounded".to_string(),
            ));
        }
        Ok(RefundSchedule { policies })
    }

    /// The production schedule: full refund inside three days, half
    /// refund until day seven, no cancellation afterwards
    pub fn standard() -> Self {
        RefundSchedule {
            policies: RefundPolicy::ALL.to_vec(),
        }
    }

    /// Pick the single policy whose window contains `now`
    ///
    /// Failing here means the schedule or the clock is broken; callers
    /// treat it as a fault, not as a user error.
    pub fn select(
        &self,
        ordered_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RefundResult<RefundPolicy> {
        self.policies
            .iter()
            .copied()
            .find(|policy| policy.is_available(ordered_at, now))
            .ok_or(RefundError::NoApplicablePolicy)
    }

    pub fn policies(&self) -> &[RefundPolicy] {
        &self.policies
    }
}

impl Default for RefundSchedule {
    fn default() -> Self {
        RefundSchedule::standard()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn ordered_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    /// Selection succeeds for every elapsed time at or after the order
    /// and agrees with direct window evaluation
    #[test]
    fn prop_select_matches_window_evaluation() {
        proptest!(|(elapsed_minutes in 0i64..=40 * 24 * 60)| {
            let now = ordered_at() + Duration::minutes(elapsed_minutes);
            let schedule = RefundSchedule::standard();
            let selected = schedule.select(ordered_at(), now).unwrap();

            prop_assert!(selected.is_available(ordered_at(), now));
            for policy in RefundPolicy::ALL {
                if policy != selected {
                    prop_assert!(!policy.is_available(ordered_at(), now));
                }
            }
        });
    }

    /// The day count alone determines the selected policy
    #[test]
    fn prop_selection_by_day_count() {
        proptest!(|(elapsed_days in 0i64..=40)| {
            let now = ordered_at() + Duration::days(elapsed_days);
            let selected = RefundSchedule::standard().select(ordered_at(), now).unwrap();
            let expected = match elapsed_days {
                0..=2 => RefundPolicy::Full,
                3..=6 => RefundPolicy::Half,
                _ => RefundPolicy::None,
            };
            prop_assert_eq!(selected, expected);
        });
    }
}

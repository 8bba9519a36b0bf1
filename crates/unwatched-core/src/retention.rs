use std::fmt;

use crate::tautulli::models::MediaSummaryRecord;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Direction of the age comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Added within the window and not yet watched (`<=`).
    #[default]
    AtMost,
    /// Added before the window and still not watched (`>=`).
    AtLeast,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::AtMost => "<=",
            Operator::AtLeast => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "<=" => Some(Operator::AtMost),
            ">=" => Some(Operator::AtLeast),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Age threshold plus comparison direction. `days` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    days: u32,
    operator: Operator,
}

impl RetentionWindow {
    /// Returns `None` for a zero-day window.
    pub fn new(days: u32, operator: Operator) -> Option<Self> {
        (days > 0).then_some(Self { days, operator })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn threshold_secs(&self) -> i64 {
        i64::from(self.days) * SECONDS_PER_DAY
    }

    /// Age-side of the predicate for an item added at `added_at`.
    pub fn age_matches(&self, added_at: i64, now: i64) -> bool {
        let elapsed = now.saturating_sub(added_at);
        match self.operator {
            Operator::AtMost => elapsed <= self.threshold_secs(),
            Operator::AtLeast => elapsed >= self.threshold_secs(),
        }
    }

    /// Candidate iff never played and the age comparison holds.
    pub fn admits(&self, record: &MediaSummaryRecord, now: i64) -> bool {
        is_unwatched(record.play_count) && self.age_matches(record.added_at, now)
    }
}

pub fn is_unwatched(play_count: Option<i64>) -> bool {
    matches!(play_count, None | Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tautulli::models::{MediaType, RatingKey};

    const NOW: i64 = 1_760_000_000;

    fn summary(added_at: i64, play_count: Option<i64>) -> MediaSummaryRecord {
        MediaSummaryRecord {
            rating_key: RatingKey(1),
            parent_rating_key: None,
            added_at,
            play_count,
            title: "Item".to_string(),
            media_type: MediaType::Movie,
        }
    }

    #[test]
    fn test_zero_days_rejected() {
        assert!(RetentionWindow::new(0, Operator::AtMost).is_none());
        assert!(RetentionWindow::new(1, Operator::AtLeast).is_some());
    }

    #[test]
    fn test_at_most_boundary_inclusive() {
        let window = RetentionWindow::new(30, Operator::AtMost).unwrap();
        let edge = NOW - 30 * SECONDS_PER_DAY;
        assert!(window.admits(&summary(edge, None), NOW));
        assert!(!window.admits(&summary(edge - 1, None), NOW));
    }

    #[test]
    fn test_at_least_boundary_inclusive() {
        let window = RetentionWindow::new(30, Operator::AtLeast).unwrap();
        let edge = NOW - 30 * SECONDS_PER_DAY;
        assert!(window.admits(&summary(edge, Some(0)), NOW));
        assert!(!window.admits(&summary(edge + 1, Some(0)), NOW));
    }

    #[test]
    fn test_played_items_never_admitted() {
        for operator in [Operator::AtMost, Operator::AtLeast] {
            let window = RetentionWindow::new(30, operator).unwrap();
            for days_ago in [0, 10, 30, 40, 400] {
                let added = NOW - days_ago * SECONDS_PER_DAY;
                assert!(!window.admits(&summary(added, Some(1)), NOW));
            }
        }
    }

    #[test]
    fn test_scenario_ten_forty_hundred_days() {
        let items: Vec<_> = [10, 40, 100]
            .iter()
            .map(|d| summary(NOW - d * SECONDS_PER_DAY, Some(0)))
            .collect();

        let recent = RetentionWindow::new(30, Operator::AtMost).unwrap();
        let kept: Vec<_> = items.iter().filter(|i| recent.admits(i, NOW)).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].added_at, NOW - 10 * SECONDS_PER_DAY);

        let stale = RetentionWindow::new(30, Operator::AtLeast).unwrap();
        let kept: Vec<_> = items.iter().filter(|i| stale.admits(i, NOW)).collect();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let stale = RetentionWindow::new(30, Operator::AtLeast).unwrap();
        let recent = RetentionWindow::new(30, Operator::AtMost).unwrap();

        assert!(stale.admits(&summary(i64::MIN, None), NOW));
        assert!(!recent.admits(&summary(i64::MIN, None), NOW));
        assert!(recent.admits(&summary(i64::MAX, None), NOW));
        assert!(!stale.age_matches(i64::MAX, i64::MIN));
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::from_symbol(" >= "), Some(Operator::AtLeast));
        assert_eq!(Operator::from_symbol("<"), None);
        assert_eq!(Operator::AtMost.to_string(), "<=");
    }
}

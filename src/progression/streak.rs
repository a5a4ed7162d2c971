//! Consecutive-day streak tracking.

use chrono::NaiveDate;
use serde::Serialize;

use crate::storage::config::StreakSettings;

/// Streak counters after a play on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakUpdate {
    pub current: u32,
    pub longest: u32,
    /// No earlier play recorded on the same calendar day
    pub first_play_today: bool,
}

/// Advance the streak for a play on `today`.
///
/// Same day leaves the streak unchanged, the next day (plus any grace days)
/// extends it, and a longer gap starts over at 1. A `today` earlier than
/// the last play is treated as the same day.
pub fn advance_streak(
    last_played: Option<NaiveDate>,
    today: NaiveDate,
    current: u32,
    longest: u32,
    settings: &StreakSettings,
) -> StreakUpdate {
    let (current, first_play_today) = match last_played {
        None => (1, true),
        Some(last) => {
            let gap = (today - last).num_days();
            if gap <= 0 {
                (current.max(1), false)
            } else if gap <= 1 + settings.grace_days as i64 {
                (current.saturating_add(1), true)
            } else {
                (1, true)
            }
        }
    };

    StreakUpdate {
        current,
        longest: longest.max(current),
        first_play_today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_first_play_starts_streak() {
        let update = advance_streak(None, day(1), 0, 0, &StreakSettings::default());
        assert_eq!(update.current, 1);
        assert_eq!(update.longest, 1);
        assert!(update.first_play_today);
    }

    #[test]
    fn test_same_day_unchanged() {
        let update = advance_streak(Some(day(3)), day(3), 4, 6, &StreakSettings::default());
        assert_eq!(update.current, 4);
        assert_eq!(update.longest, 6);
        assert!(!update.first_play_today);
    }

    #[test]
    fn test_next_day_increments() {
        let update = advance_streak(Some(day(3)), day(4), 4, 4, &StreakSettings::default());
        assert_eq!(update.current, 5);
        assert_eq!(update.longest, 5);
    }

    #[test]
    fn test_gap_resets() {
        let update = advance_streak(Some(day(3)), day(5), 4, 4, &StreakSettings::default());
        assert_eq!(update.current, 1);
        assert_eq!(update.longest, 4);
    }

    #[test]
    fn test_grace_day_keeps_streak() {
        let settings = StreakSettings { grace_days: 1 };
        assert_eq!(advance_streak(Some(day(3)), day(5), 4, 4, &settings).current, 5);
        assert_eq!(advance_streak(Some(day(3)), day(6), 4, 4, &settings).current, 1);
    }

    #[test]
    fn test_clock_going_backwards_is_same_day() {
        let update = advance_streak(Some(day(5)), day(4), 2, 3, &StreakSettings::default());
        assert_eq!(update.current, 2);
        assert!(!update.first_play_today);
    }
}

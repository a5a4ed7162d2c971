//! Unit tests for the level curve, division ladder and XP formula.

use bomber::catalog::Rarity;
use bomber::progression::curve::total_xp_for_level;
use bomber::progression::divisions::{xp_to_next_division, DIVISIONS};
use bomber::progression::{division_from_xp, level_from_xp, next_division, xp_for_drive, XpInput};
use bomber::storage::config::{ProgressionSettings, XpSettings};

#[test]
fn test_level_thresholds() {
    let settings = ProgressionSettings::default();
    let thresholds: Vec<u64> = (2..=7).map(|l| total_xp_for_level(l, &settings)).collect();
    assert_eq!(thresholds, vec![100, 230, 400, 620, 900, 1250]);

    assert_eq!(level_from_xp(99, &settings).level, 1);
    assert_eq!(level_from_xp(100, &settings).level, 2);
    assert_eq!(level_from_xp(229, &settings).level, 2);
    assert_eq!(level_from_xp(230, &settings).level, 3);
}

#[test]
fn test_level_is_monotonic_and_deterministic() {
    let settings = ProgressionSettings::default();
    let mut previous = level_from_xp(0, &settings);
    assert_eq!(previous.level, 1);

    for xp in (0..50_000u64).step_by(7) {
        let progress = level_from_xp(xp, &settings);
        assert_eq!(progress, level_from_xp(xp, &settings));
        assert!(progress.level >= previous.level, "xp {}", xp);
        assert!(progress.current_xp_in_level < progress.xp_required_for_next_level);
        assert_eq!(
            total_xp_for_level(progress.level, &settings) + progress.current_xp_in_level,
            xp
        );
        previous = progress;
    }
}

#[test]
fn test_later_levels_cost_more() {
    let settings = ProgressionSettings::default();
    let spans: Vec<u64> = (1..30)
        .map(|l| level_from_xp(total_xp_for_level(l, &settings), &settings).xp_required_for_next_level)
        .collect();
    assert!(spans.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_division_is_highest_reached() {
    for xp in (0..40_000u64).step_by(13) {
        let division = division_from_xp(xp);
        assert!(division.min_xp <= xp);
        assert!(!DIVISIONS
            .iter()
            .any(|d| d.min_xp <= xp && d.min_xp > division.min_xp));
    }
    assert_eq!(division_from_xp(0).id, "bronze");
}

#[test]
fn test_next_division_at_the_top() {
    assert_eq!(next_division(0).map(|d| d.id), Some("silver"));
    assert_eq!(xp_to_next_division(400), Some(600));
    assert!(next_division(1_000_000).is_none());
    assert!(xp_to_next_division(1_000_000).is_none());
}

#[test]
fn test_xp_for_drive_bonuses_stack() {
    let settings = XpSettings::default();
    let plain = xp_for_drive(
        &XpInput {
            distance: 200,
            night_mode: false,
            streak: 1,
            driver_rarity: Rarity::Common,
        },
        &settings,
    );
    assert_eq!(plain.total, 40);

    let boosted = xp_for_drive(
        &XpInput {
            distance: 200,
            night_mode: true,
            streak: 30,
            driver_rarity: Rarity::Legendary,
        },
        &settings,
    );
    // 40 * (100 + 20 + 20 + 15) / 100
    assert_eq!(boosted.total, 62);
}

#[test]
fn test_short_drive_earns_floor() {
    let settings = XpSettings::default();
    let xp = xp_for_drive(
        &XpInput {
            distance: 3,
            night_mode: false,
            streak: 1,
            driver_rarity: Rarity::Common,
        },
        &settings,
    );
    assert_eq!(xp.total, settings.min_xp);
}

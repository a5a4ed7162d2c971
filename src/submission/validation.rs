//! Drive event validation.
//!
//! Implausible values are rejected, never clamped: the event feeds both the
//! economy and the leaderboard.

use serde::{Deserialize, Serialize};

use crate::catalog::venues::DEFAULT_VENUE_ID;
use crate::error::{BomberError, BomberResult};
use crate::storage::config::DriveLimits;

/// Clubs the shot was hit with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentUsed {
    pub driver_id: String,
    pub ball_id: String,
}

/// A drive as reported by the game client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDriveEvent {
    /// Carry in yards
    pub distance: f64,
    /// mph
    pub ball_speed: f64,
    /// Degrees
    pub launch_angle: f64,
    /// mph; positive is a tailwind, negative a headwind
    #[serde(default)]
    pub wind: f64,
    #[serde(default)]
    pub night_mode: bool,
    #[serde(default = "default_venue")]
    pub venue_id: String,
    /// Defaults to the equipped driver and ball
    #[serde(default)]
    pub equipment_used: Option<EquipmentUsed>,
}

fn default_venue() -> String {
    DEFAULT_VENUE_ID.to_string()
}

/// A drive whose metrics passed the plausibility checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDrive {
    pub distance: u32,
    pub ball_speed: f64,
    pub launch_angle: f64,
    pub wind: f64,
    pub night_mode: bool,
    pub venue_id: String,
    pub equipment_used: Option<EquipmentUsed>,
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> BomberResult<()> {
    if !value.is_finite() {
        return Err(BomberError::Validation(format!("{} must be a number", name)));
    }
    if value < min || value > max {
        return Err(BomberError::Validation(format!(
            "{} {} outside {}..={}",
            name, value, min, max
        )));
    }
    Ok(())
}

/// Check a raw event against the configured limits.
///
/// Distance is rounded to the nearest yard before the bounds check.
pub fn validate_drive(raw: &RawDriveEvent, limits: &DriveLimits) -> BomberResult<ValidatedDrive> {
    if !raw.distance.is_finite() {
        return Err(BomberError::Validation("distance must be a number".to_string()));
    }
    let distance = raw.distance.round();
    check_range(
        "distance",
        distance,
        limits.min_distance as f64,
        limits.max_distance as f64,
    )?;
    check_range("ball_speed", raw.ball_speed, 0.0, limits.max_ball_speed)?;
    check_range(
        "launch_angle",
        raw.launch_angle,
        limits.min_launch_angle,
        limits.max_launch_angle,
    )?;
    check_range("wind", raw.wind, -limits.max_wind, limits.max_wind)?;

    let venue_id = raw.venue_id.trim();
    if venue_id.is_empty() {
        return Err(BomberError::Validation("venue_id is empty".to_string()));
    }

    Ok(ValidatedDrive {
        distance: distance as u32,
        ball_speed: raw.ball_speed,
        launch_angle: raw.launch_angle,
        wind: raw.wind,
        night_mode: raw.night_mode,
        venue_id: venue_id.to_string(),
        equipment_used: raw.equipment_used.clone(),
    })
}

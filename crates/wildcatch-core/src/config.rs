//! Tunables for encounters, turn pacing and capture devices.
//!
//! Defaults reproduce the shipped game feel. Hosts may override any subset
//! from JSON; missing fields fall back to their defaults.
//!
//! # Example
//!
//! ```
//! use wildcatch_core::config::WildcatchConfig;
//!
//! let json = r#"{ "encounter": { "ring_radius": 12.0 } }"#;
//! let config = WildcatchConfig::from_json_str(json).unwrap();
//! assert_eq!(config.encounter.ring_radius, 12.0);
//! assert_eq!(config.encounter.combatant_offset, 2.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Standard gravity used by the ballistic solver (m/s²).
pub const DEFAULT_GRAVITY: f32 = 9.81;

/// Arena geometry, repositioning and eviction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Outer boundary: how far the trainer may roam and where intruders are evicted from.
    pub ring_radius: f32,
    /// Horizontal distance from the arena centre to each combatant.
    pub combatant_offset: f32,
    /// Speed used to pull a displaced combatant back onto the ring.
    pub reposition_speed: f32,
    /// Drift below this distance is ignored.
    pub snap_tolerance: f32,
    /// Pause before each turn starts.
    pub turn_intro_delay: f32,
    /// Duration of the initial glide into position.
    pub positioning_duration: f32,
    /// Extra distance intruders must clear beyond the ring radius.
    pub eviction_clearance: f32,
    /// Speed intruders are pushed outward at.
    pub eviction_speed: f32,
    /// Seconds between intruder scans.
    pub eviction_scan_interval: f32,
    /// Fixed part of each eviction's timeout; travel time is added on top.
    pub eviction_base_timeout: f32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            ring_radius: 10.0,
            combatant_offset: 2.5,
            reposition_speed: 12.0,
            snap_tolerance: 0.05,
            turn_intro_delay: 0.25,
            positioning_duration: 0.25,
            eviction_clearance: 1.5,
            eviction_speed: 6.0,
            eviction_scan_interval: 0.75,
            eviction_base_timeout: 2.5,
        }
    }
}

/// Presentation delays applied after each kind of turn action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnPacing {
    /// After a move that connected.
    pub move_hit: f32,
    /// After a move that missed.
    pub move_miss: f32,
    /// After an empty slot, exhausted move, or skipped turn.
    pub wasted: f32,
    /// After capture, switch, or externally consumed turns.
    pub non_move: f32,
}

impl Default for TurnPacing {
    fn default() -> Self {
        Self {
            move_hit: 0.45,
            move_miss: 0.35,
            wasted: 0.2,
            non_move: 0.3,
        }
    }
}

/// Capture device flight and shake settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Gravity magnitude for ballistic flight.
    pub gravity: f32,
    /// Multiplier on the solved time of flight (>1 = loftier, slower throw).
    pub flight_time_scale: f32,
    /// Throw speed used by the fallback solve.
    pub throw_speed_hint: f32,
    /// Radius of the capture device's collider.
    pub device_radius: f32,
    /// Hard cap on a session's lifetime, whatever state it is in.
    pub safety_lifetime: f32,
    /// Duration of one shake.
    pub shake_duration: f32,
    /// Peak lateral offset during a shake.
    pub shake_amplitude: f32,
    /// Angular frequency of the shake oscillation (rad/s).
    pub shake_frequency: f32,
    /// Pause after each shake.
    pub shake_gap: f32,
    /// How long the device lingers after the result before it is discarded.
    pub result_linger: f32,
    /// How long a device that hit terrain rolls around before expiring.
    pub terrain_settle: f32,
    /// Flat chance that a capture succeeds regardless of the computed odds.
    pub critical_capture_chance: f32,
    /// Height above the creature the downward ground probe starts from.
    pub ground_probe_height: f32,
    /// Maximum distance the ground probe travels.
    pub ground_probe_distance: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            flight_time_scale: 1.0,
            throw_speed_hint: 12.0,
            device_radius: 0.15,
            safety_lifetime: 10.0,
            shake_duration: 0.3,
            shake_amplitude: 0.15,
            shake_frequency: 40.0,
            shake_gap: 0.25,
            result_linger: 0.5,
            terrain_settle: 2.0,
            critical_capture_chance: 0.0,
            ground_probe_height: 2.0,
            ground_probe_distance: 10.0,
        }
    }
}

/// Aggregate configuration for an [`EncounterService`](crate::service::EncounterService).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WildcatchConfig {
    /// Arena and eviction settings.
    pub encounter: EncounterConfig,
    /// Turn pacing delays.
    pub pacing: TurnPacing,
    /// Capture device settings.
    pub capture: CaptureConfig,
}

impl WildcatchConfig {
    /// Parses a config from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.encounter;
        at_least("encounter.ring_radius", e.ring_radius, 1.0)?;
        at_least("encounter.combatant_offset", e.combatant_offset, 0.1)?;
        if e.combatant_offset >= e.ring_radius {
            return Err(ConfigError::Invalid {
                field: "encounter.combatant_offset",
                reason: format!(
                    "must be smaller than ring_radius ({})",
                    e.ring_radius
                ),
            });
        }
        positive("encounter.reposition_speed", e.reposition_speed)?;
        at_least("encounter.snap_tolerance", e.snap_tolerance, 0.0)?;
        at_least("encounter.turn_intro_delay", e.turn_intro_delay, 0.0)?;
        at_least("encounter.positioning_duration", e.positioning_duration, 0.0)?;
        at_least("encounter.eviction_clearance", e.eviction_clearance, 0.1)?;
        positive("encounter.eviction_speed", e.eviction_speed)?;
        at_least("encounter.eviction_scan_interval", e.eviction_scan_interval, 0.1)?;
        at_least("encounter.eviction_base_timeout", e.eviction_base_timeout, 0.0)?;

        let p = &self.pacing;
        at_least("pacing.move_hit", p.move_hit, 0.0)?;
        at_least("pacing.move_miss", p.move_miss, 0.0)?;
        at_least("pacing.wasted", p.wasted, 0.0)?;
        at_least("pacing.non_move", p.non_move, 0.0)?;

        let c = &self.capture;
        positive("capture.gravity", c.gravity)?;
        at_least("capture.flight_time_scale", c.flight_time_scale, 0.25)?;
        positive("capture.throw_speed_hint", c.throw_speed_hint)?;
        positive("capture.device_radius", c.device_radius)?;
        positive("capture.safety_lifetime", c.safety_lifetime)?;
        positive("capture.shake_duration", c.shake_duration)?;
        at_least("capture.shake_gap", c.shake_gap, 0.0)?;
        at_least("capture.result_linger", c.result_linger, 0.0)?;
        at_least("capture.terrain_settle", c.terrain_settle, 0.0)?;
        probability("capture.critical_capture_chance", c.critical_capture_chance)?;
        positive("capture.ground_probe_distance", c.ground_probe_distance)?;
        Ok(())
    }
}

fn at_least(field: &'static str, value: f32, min: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite value >= {min}, got {value}"),
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite value > 0, got {value}"),
        })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be within [0, 1], got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(WildcatchConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            WildcatchConfig::from_json_str(r#"{ "pacing": { "move_hit": 1.0 } }"#).unwrap();
        assert!((config.pacing.move_hit - 1.0).abs() < f32::EPSILON);
        assert!((config.pacing.move_miss - 0.35).abs() < f32::EPSILON);
        assert_eq!(config.capture, CaptureConfig::default());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = WildcatchConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn offset_must_fit_inside_ring() {
        let err = WildcatchConfig::from_json_str(
            r#"{ "encounter": { "ring_radius": 2.0, "combatant_offset": 3.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "encounter.combatant_offset",
                ..
            }
        ));
    }

    #[test]
    fn critical_chance_is_a_probability() {
        let mut config = WildcatchConfig::default();
        config.capture.critical_capture_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_is_rejected() {
        let mut config = WildcatchConfig::default();
        config.encounter.reposition_speed = f32::NAN;
        assert!(config.validate().is_err());
    }
}

//! Numeric configuration for a simulation session.
//!
//! All values are in inches and radians unless noted. Every field has a
//! default so a partial (or empty) config file is valid.

use crate::{arm::ARM_COUNT, geometry::Vec2, player::OnComplete};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_FPS: f64 = 1.0;
pub const MAX_FPS: f64 = 240.0;
pub const MAX_ARM_SPEED: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("arm travel range is empty: lower bound {lower} >= upper bound {upper}")]
    EmptyTravel { lower: f64, upper: f64 },

    #[error("starting position {value} must lie strictly between {lower} and {upper}")]
    StartOutsideTravel { value: f64, lower: f64, upper: f64 },

    #[error("controlled arm {index} does not exist")]
    NoSuchArm { index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub machine: MachineConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub recorder: RecorderConfig,
}

/// Physical dimensions of the frame, canvas and arms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub frame_size: f64,
    pub hub_diameter: f64,
    pub canvas_width: f64,
    pub arm_max_length: f64,
    pub arm_offset_limit: f64,
    pub arm_starting_position: f64,
    /// Canvas spin in radians per display frame
    pub rotation_speed: f64,
    pub max_rotation_speed: f64,
    /// Half-width, in degrees, of the sector each arm may sweep.
    ///
    /// `None` leaves arms free to rotate the full circle.
    pub angle_window_deg: Option<f64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            frame_size: 29.0,
            hub_diameter: 4.75,
            canvas_width: 20.0,
            arm_max_length: 18.0,
            arm_offset_limit: 2.0,
            arm_starting_position: 5.0,
            rotation_speed: 0.01,
            max_rotation_speed: 0.1,
            angle_window_deg: None,
        }
    }
}

impl MachineConfig {
    pub fn hub_radius(&self) -> f64 {
        self.hub_diameter / 2.0
    }

    /// Exclusive lower bound on an arm's front length
    pub fn lower_bound(&self) -> f64 {
        self.arm_offset_limit + self.hub_radius()
    }

    /// Exclusive upper bound on an arm's front length
    pub fn upper_bound(&self) -> f64 {
        self.arm_max_length - self.arm_offset_limit - self.hub_radius()
    }

    /// Hub centres, one per frame corner, counter-clockwise from the top right
    pub fn hub_positions(&self) -> [Vec2; ARM_COUNT] {
        let offset = self.frame_size / 2.0 - self.hub_radius();
        [
            Vec2::new(offset, offset),
            Vec2::new(-offset, offset),
            Vec2::new(-offset, -offset),
            Vec2::new(offset, -offset),
        ]
    }

    pub fn clamp_rotation_speed(&self, speed: f64) -> f64 {
        speed.min(self.max_rotation_speed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub fps: f64,
    /// Waypoint travel cap in inches per tick
    pub max_speed: f64,
    pub controlled_arm: usize,
    /// Overrides the per-format end-of-data behavior when set
    pub on_complete: Option<OnComplete>,
    pub display_fps: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            max_speed: 1.0,
            controlled_arm: 0,
            on_complete: None,
            display_fps: 60.0,
        }
    }
}

fn clamp_rate(rate: f64, fallback: f64) -> f64 {
    if rate.is_nan() {
        fallback
    } else {
        rate.clamp(MIN_FPS, MAX_FPS)
    }
}

impl PlaybackConfig {
    /// `fps` limited to `MIN_FPS..=MAX_FPS`; NaN falls back to the default
    pub fn tick_rate(&self) -> f64 {
        clamp_rate(self.fps, Self::default().fps)
    }

    /// `display_fps` limited the same way as [`PlaybackConfig::tick_rate`]
    pub fn display_rate(&self) -> f64 {
        clamp_rate(self.display_fps, Self::default().display_fps)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Samples closer than this to the open segment's last point are dropped
    pub min_spacing: f64,
    pub max_points_per_arm: Option<usize>,
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.machine;
        positive("machine.frame_size", m.frame_size)?;
        positive("machine.hub_diameter", m.hub_diameter)?;
        positive("machine.canvas_width", m.canvas_width)?;
        positive("machine.arm_max_length", m.arm_max_length)?;
        within(
            "machine.arm_offset_limit",
            m.arm_offset_limit,
            0.0,
            m.arm_max_length,
        )?;
        within(
            "machine.max_rotation_speed",
            m.max_rotation_speed,
            0.0,
            f64::MAX,
        )?;
        within(
            "machine.rotation_speed",
            m.rotation_speed,
            0.0,
            m.max_rotation_speed,
        )?;
        if let Some(window) = m.angle_window_deg {
            within("machine.angle_window_deg", window, 0.0, 180.0)?;
        }

        let (lower, upper) = (m.lower_bound(), m.upper_bound());
        if lower >= upper {
            return Err(ConfigError::EmptyTravel { lower, upper });
        }
        let start = m.arm_starting_position;
        if !(start > lower && start < upper) {
            return Err(ConfigError::StartOutsideTravel {
                value: start,
                lower,
                upper,
            });
        }

        let p = &self.playback;
        within("playback.fps", p.fps, MIN_FPS, MAX_FPS)?;
        within("playback.display_fps", p.display_fps, MIN_FPS, MAX_FPS)?;
        positive("playback.max_speed", p.max_speed)?;
        within("playback.max_speed", p.max_speed, 0.0, MAX_ARM_SPEED)?;
        if p.controlled_arm >= ARM_COUNT {
            return Err(ConfigError::NoSuchArm {
                index: p.controlled_arm,
            });
        }

        within(
            "recorder.min_spacing",
            self.recorder.min_spacing,
            0.0,
            f64::MAX,
        )?;

        Ok(())
    }
}

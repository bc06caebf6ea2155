//! Pose model for a single pivot-mounted, telescoping arm.
//!
//! An arm slides through its hub: the part in front of the hub carries the
//! pen and the part behind it is whatever is left of the fixed total length.
//! Interactive drags go through [`Arm::resolve_target`], which rejects any
//! target whose extension leaves the open travel interval. Trajectory
//! playback is trusted and uses [`Arm::set_pose`] / [`Arm::reach_toward`].

use crate::{
    config::MachineConfig,
    geometry::{Vec2, angle_to, clamp, project_onward, shortest_angle_delta},
};
use serde::Serialize;

pub const ARM_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Pose {
    pub angle: f64,
    pub front_length: f64,
    pub back_length: f64,
}

/// Travel range of the pen along the arm's axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmLimits {
    pub max_length: f64,
    /// Exclusive
    pub lower: f64,
    /// Exclusive
    pub upper: f64,
}

impl ArmLimits {
    pub fn from_machine(machine: &MachineConfig) -> Self {
        Self {
            max_length: machine.arm_max_length,
            lower: machine.lower_bound(),
            upper: machine.upper_bound(),
        }
    }

    pub fn admits(&self, front_length: f64) -> bool {
        front_length > self.lower && front_length < self.upper
    }
}

/// Sector an angle-limited arm may sweep, in unwrapped radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleLimits {
    pub min: f64,
    pub max: f64,
}

impl AngleLimits {
    pub fn around(center: f64, half_width: f64) -> Self {
        Self {
            min: center - half_width,
            max: center + half_width,
        }
    }

    /// Bring `raw` onto the branch nearest `current`, then clamp into the sector.
    ///
    /// Unwrapping first keeps a target just across the ±PI cut from being
    /// clamped to the far edge of the sector.
    pub fn constrain(&self, current: f64, raw: f64) -> f64 {
        clamp(current + shortest_angle_delta(current, raw), self.min, self.max)
    }
}

#[derive(Clone, Debug)]
pub struct Arm {
    hub: Vec2,
    angle: f64,
    front_length: f64,
    limits: ArmLimits,
    angle_limits: Option<AngleLimits>,
    pen_down: bool,
}

impl Arm {
    /// Create an arm at `hub` pointing at the canvas centre.
    pub fn new(
        hub: Vec2,
        starting_length: f64,
        limits: ArmLimits,
        angle_window: Option<f64>,
    ) -> Self {
        let angle = angle_to(hub, Vec2::ZERO);
        Self {
            hub,
            angle,
            front_length: starting_length,
            limits,
            angle_limits: angle_window.map(|w| AngleLimits::around(angle, w)),
            pen_down: false,
        }
    }

    pub fn hub(&self) -> Vec2 {
        self.hub
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn front_length(&self) -> f64 {
        self.front_length
    }

    pub fn back_length(&self) -> f64 {
        self.limits.max_length - self.front_length
    }

    pub fn pose(&self) -> Pose {
        Pose {
            angle: self.angle,
            front_length: self.front_length,
            back_length: self.back_length(),
        }
    }

    pub fn limits(&self) -> ArmLimits {
        self.limits
    }

    pub fn angle_limits(&self) -> Option<AngleLimits> {
        self.angle_limits
    }

    pub fn pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn set_pen_down(&mut self, down: bool) {
        self.pen_down = down;
    }

    /// World position of the pen tip
    pub fn tip(&self) -> Vec2 {
        self.hub + Vec2::from_angle(self.angle) * self.front_length
    }

    /// Express a world point relative to this arm's hub
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        world - self.hub
    }

    /// Difference between the current extension and where the grab point
    /// projects onto the arm; keeps the tip from jumping to the cursor.
    pub fn grab_offset(&self, local: Vec2) -> f64 {
        self.front_length - project_onward(local, self.angle)
    }

    /// Point the arm at `local` and extend it by the projected length plus
    /// `grab_offset`.
    ///
    /// Returns `None`, leaving the pose untouched, when the resulting
    /// extension falls outside the open travel interval.
    pub fn resolve_target(&mut self, local: Vec2, grab_offset: f64) -> Option<Pose> {
        let raw = angle_to(Vec2::ZERO, local);
        let angle = match self.angle_limits {
            Some(limits) => limits.constrain(self.angle, raw),
            None => self.angle + shortest_angle_delta(self.angle, raw),
        };
        let length = project_onward(local, angle) + grab_offset;
        if !angle.is_finite() || !self.limits.admits(length) {
            return None;
        }
        self.angle = angle;
        self.front_length = length;
        Some(self.pose())
    }

    /// Apply a pose from trusted trajectory data without range checks.
    pub fn set_pose(&mut self, angle: f64, front_length: f64) -> Pose {
        self.angle = angle;
        self.front_length = front_length;
        self.pose()
    }

    /// Aim the tip at a world point, extending as far as the arm allows.
    ///
    /// Non-finite targets leave the arm where it is.
    pub fn reach_toward(&mut self, world: Vec2) -> Option<Pose> {
        if !world.is_finite() {
            return None;
        }
        let local = self.to_local(world);
        let length = clamp(local.length(), 0.0, self.limits.max_length);
        Some(self.set_pose(angle_to(Vec2::ZERO, local), length))
    }
}

// In-memory trajectory formats produced by the parser and consumed by the player

use crate::{geometry::Vec2, player::OnComplete};
use serde::Serialize;

/// One arm's absolute pose and pen state at one frame.
///
/// Fields may be NaN when the source token was malformed; the player skips
/// such samples instead of applying them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArmSample {
    pub angle: f64,
    pub offset: f64,
    pub pen_down: bool,
}

impl ArmSample {
    pub fn is_valid(&self) -> bool {
        self.angle.is_finite() && self.offset.is_finite()
    }
}

/// Per-arm samples for one time step; `None` where an arm has no data
pub type Frame = Vec<Option<ArmSample>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AbsoluteTrajectory {
    /// Raw canvas speed from the header, before clamping
    pub rotation_speed: Option<f64>,
    pub frames: Vec<Frame>,
}

impl AbsoluteTrajectory {
    /// Transpose per-arm sample lists into frames.
    ///
    /// The frame count is that of the longest arm; shorter arms contribute
    /// `None` past their end.
    pub fn from_arms(rotation_speed: Option<f64>, arms: &[Vec<ArmSample>]) -> Self {
        let len = arms.iter().map(Vec::len).max().unwrap_or(0);
        let frames = (0..len)
            .map(|i| arms.iter().map(|arm| arm.get(i).copied()).collect())
            .collect();
        Self {
            rotation_speed,
            frames,
        }
    }

    /// Transpose back into one sample list per arm, stopping at the first gap.
    pub fn arms(&self) -> Vec<Vec<ArmSample>> {
        let mut arms = vec![Vec::new(); self.arm_count()];
        for (index, samples) in arms.iter_mut().enumerate() {
            samples.extend(
                self.frames
                    .iter()
                    .map_while(|frame| frame.get(index).copied().flatten()),
            );
        }
        arms
    }

    pub fn arm_count(&self) -> usize {
        self.frames.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WaypointTrajectory {
    /// Raw canvas speed from the first line, before clamping
    pub rotation_speed: Option<f64>,
    pub waypoints: Vec<Vec2>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "dialect", rename_all = "snake_case")]
pub enum Trajectory {
    Absolute(AbsoluteTrajectory),
    Waypoints(WaypointTrajectory),
}

impl Trajectory {
    pub fn len(&self) -> usize {
        match self {
            Trajectory::Absolute(t) => t.frames.len(),
            Trajectory::Waypoints(t) => t.waypoints.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rotation_speed(&self) -> Option<f64> {
        match self {
            Trajectory::Absolute(t) => t.rotation_speed,
            Trajectory::Waypoints(t) => t.rotation_speed,
        }
    }

    /// Absolute frames loop; waypoint runs stop at the last target.
    pub fn default_on_complete(&self) -> OnComplete {
        match self {
            Trajectory::Absolute(_) => OnComplete::Loop,
            Trajectory::Waypoints(_) => OnComplete::Stop,
        }
    }
}

//! Presentation seam.
//!
//! A front end hands the simulation one [`ArmView`] per mounted arm through
//! a [`SceneView`]. The simulation only ever talks to these named setters,
//! never to the scene graph behind them.

use crate::arm::Pose;

pub trait ArmView {
    fn set_angle(&mut self, angle: f64);
    fn set_front_length(&mut self, length: f64);
    fn set_back_length(&mut self, length: f64);
    fn set_pen_down(&mut self, down: bool);

    fn show_pose(&mut self, pose: Pose, pen_down: bool) {
        self.set_angle(pose.angle);
        self.set_front_length(pose.front_length);
        self.set_back_length(pose.back_length);
        self.set_pen_down(pen_down);
    }
}

pub trait SceneView {
    /// `None` while the arm's visual is not mounted
    fn arm_view(&mut self, arm: usize) -> Option<&mut dyn ArmView>;
}

/// Last values pushed to one arm
#[cfg(test)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedArm {
    pub angle: f64,
    pub front_length: f64,
    pub back_length: f64,
    pub pen_down: bool,
    pub updates: usize,
}

#[cfg(test)]
impl ArmView for RecordedArm {
    fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.updates += 1;
    }

    fn set_front_length(&mut self, length: f64) {
        self.front_length = length;
    }

    fn set_back_length(&mut self, length: f64) {
        self.back_length = length;
    }

    fn set_pen_down(&mut self, down: bool) {
        self.pen_down = down;
    }
}

/// Scene made of [`RecordedArm`]s; unmounted arms are `None`
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct RecordingScene {
    pub arms: Vec<Option<RecordedArm>>,
}

#[cfg(test)]
impl RecordingScene {
    pub fn with_mounted(mounted: &[bool]) -> Self {
        Self {
            arms: mounted
                .iter()
                .map(|&m| m.then(RecordedArm::default))
                .collect(),
        }
    }
}

#[cfg(test)]
impl SceneView for RecordingScene {
    fn arm_view(&mut self, arm: usize) -> Option<&mut dyn ArmView> {
        self.arms
            .get_mut(arm)?
            .as_mut()
            .map(|view| view as &mut dyn ArmView)
    }
}

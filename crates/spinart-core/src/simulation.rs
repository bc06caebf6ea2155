//! The rig: four arms around a spinning canvas, plus their pen paths.
//!
//! World coordinates are the frame plane with the canvas axis at the origin.
//! Pen paths are stored in canvas-local coordinates, i.e. world points
//! rotated back by the canvas's current rotation.

use crate::{
    arm::{ARM_COUNT, Arm, ArmLimits, Pose},
    config::{MachineConfig, SimulationConfig},
    geometry::Vec2,
    pen_path::PenPaths,
    player::PlaybackTarget,
    trajectory::ArmSample,
    view::SceneView,
};
use serde::Serialize;
use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEvent {
    Started { arm: usize },
    Ended { arm: usize },
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    arm: usize,
    grab_offset: f64,
}

/// Per-arm state as exposed to a front end
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArmState {
    pub hub: Vec2,
    #[serde(flatten)]
    pub pose: Pose,
    pub pen_down: bool,
    pub tip: Vec2,
}

#[derive(Clone, Debug)]
pub struct Simulation {
    machine: MachineConfig,
    arms: [Arm; ARM_COUNT],
    canvas_rotation: f64,
    rotation_speed: f64,
    paths: PenPaths,
    drag: Option<Drag>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Self {
        let machine = config.machine.clone();
        let hubs = machine.hub_positions();
        let limits = ArmLimits::from_machine(&machine);
        let window = machine.angle_window_deg.map(f64::to_radians);
        let arms = std::array::from_fn(|i| {
            Arm::new(hubs[i], machine.arm_starting_position, limits, window)
        });

        Self {
            rotation_speed: machine.clamp_rotation_speed(machine.rotation_speed),
            machine,
            arms,
            canvas_rotation: 0.0,
            paths: PenPaths::new(&config.recorder),
            drag: None,
        }
    }

    pub fn machine(&self) -> &MachineConfig {
        &self.machine
    }

    pub fn arms(&self) -> &[Arm; ARM_COUNT] {
        &self.arms
    }

    pub fn arm(&self, arm: usize) -> Option<&Arm> {
        self.arms.get(arm)
    }

    pub fn poses(&self) -> [Pose; ARM_COUNT] {
        self.arms.each_ref().map(Arm::pose)
    }

    pub fn arm_states(&self) -> [ArmState; ARM_COUNT] {
        self.arms.each_ref().map(|arm| ArmState {
            hub: arm.hub(),
            pose: arm.pose(),
            pen_down: arm.pen_down(),
            tip: arm.tip(),
        })
    }

    pub fn paths(&self) -> &PenPaths {
        &self.paths
    }

    pub fn canvas_rotation(&self) -> f64 {
        self.canvas_rotation
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// Clamped to `[0, max_rotation_speed]`; NaN is ignored.
    pub fn set_rotation_speed(&mut self, speed: f64) -> bool {
        if speed.is_nan() {
            return false;
        }
        self.rotation_speed = self.machine.clamp_rotation_speed(speed.max(0.0));
        true
    }

    /// Spin the canvas by one display frame
    pub fn advance_canvas(&mut self) {
        self.canvas_rotation = (self.canvas_rotation + self.rotation_speed).rem_euclid(TAU);
    }

    /// One display frame: spin the canvas, then sample every pen.
    pub fn display_frame(&mut self) {
        self.advance_canvas();
        self.sample_pens();
    }

    pub fn world_to_canvas(&self, world: Vec2) -> Vec2 {
        world.rotate(-self.canvas_rotation)
    }

    pub fn tip_canvas(&self, arm: usize) -> Option<Vec2> {
        self.arms.get(arm).map(|a| self.world_to_canvas(a.tip()))
    }

    fn record_tip(&mut self, arm: usize) {
        let Some(state) = self.arms.get(arm) else {
            return;
        };
        let (point, pen_down) = (self.world_to_canvas(state.tip()), state.pen_down());
        self.paths.record(arm, point, pen_down);
    }

    pub fn begin_drag(&mut self, arm: usize, world: Vec2) -> Option<DragEvent> {
        let target = self.arms.get(arm)?;
        if !world.is_finite() {
            return None;
        }
        if let Some(previous) = self.drag {
            tracing::debug!(arm = previous.arm, "replacing unfinished drag");
        }
        let grab_offset = target.grab_offset(target.to_local(world));
        self.drag = Some(Drag { arm, grab_offset });
        tracing::debug!(arm, grab_offset, "drag started");
        Some(DragEvent::Started { arm })
    }

    /// Move the dragged arm toward `world`. `None` when nothing is being
    /// dragged or the target was rejected.
    pub fn drag_to(&mut self, world: Vec2) -> Option<Pose> {
        let drag = self.drag?;
        let arm = &mut self.arms[drag.arm];
        let local = arm.to_local(world);
        let pose = arm.resolve_target(local, drag.grab_offset);
        if pose.is_none() {
            tracing::trace!(arm = drag.arm, "drag target rejected");
        }
        pose
    }

    /// Finish the current drag, if any. Safe to call at any time.
    pub fn end_drag(&mut self) -> Option<DragEvent> {
        let drag = self.drag.take()?;
        tracing::debug!(arm = drag.arm, "drag ended");
        Some(DragEvent::Ended { arm: drag.arm })
    }

    /// Arm currently held by a drag
    pub fn active_arm(&self) -> Option<usize> {
        self.drag.map(|d| d.arm)
    }

    /// Returns the new pen state
    pub fn toggle_pen(&mut self, arm: usize) -> Option<bool> {
        let down = !self.arms.get(arm)?.pen_down();
        self.set_pen(arm, down);
        Some(down)
    }

    pub fn set_pen(&mut self, arm: usize, down: bool) -> bool {
        let Some(state) = self.arms.get_mut(arm) else {
            return false;
        };
        state.set_pen_down(down);
        if !down {
            self.record_tip(arm);
        }
        tracing::debug!(arm, down, "pen set");
        true
    }

    /// Leave a dot at the arm's current tip
    pub fn mark(&mut self, arm: usize) -> bool {
        self.tip_canvas(arm)
            .is_some_and(|point| self.paths.mark(arm, point))
    }

    /// Record every arm's tip with its live pen state
    pub fn sample_pens(&mut self) {
        for arm in 0..ARM_COUNT {
            self.record_tip(arm);
        }
    }

    pub fn clear_paths(&mut self) {
        self.paths.clear();
        tracing::info!("pen paths cleared");
    }

    /// Push every arm's pose to the scene, returning how many arms were drawn.
    pub fn render(&self, scene: &mut impl SceneView) -> usize {
        let mut drawn = 0;
        for (index, arm) in self.arms.iter().enumerate() {
            match scene.arm_view(index) {
                Some(view) => {
                    view.show_pose(arm.pose(), arm.pen_down());
                    drawn += 1;
                }
                None => tracing::trace!(arm = index, "no view mounted, skipping"),
            }
        }
        drawn
    }
}

impl PlaybackTarget for Simulation {
    fn reset_canvas(&mut self, rotation_speed: Option<f64>) {
        self.canvas_rotation = 0.0;
        match rotation_speed {
            Some(speed) if speed.is_finite() && speed >= 0.0 => {
                self.rotation_speed = self.machine.clamp_rotation_speed(speed);
            }
            Some(speed) => tracing::debug!(speed, "ignoring unusable rotation speed"),
            None => {}
        }
    }

    fn apply_sample(&mut self, arm: usize, sample: ArmSample) {
        let Some(state) = self.arms.get_mut(arm) else {
            tracing::debug!(arm, "trajectory names an arm the rig does not have");
            return;
        };
        state.set_pose(sample.angle, sample.offset);
        state.set_pen_down(sample.pen_down);
        self.record_tip(arm);
    }

    fn reach(&mut self, arm: usize, point: Vec2) {
        let Some(state) = self.arms.get_mut(arm) else {
            return;
        };
        if state.reach_toward(point).is_none() {
            return;
        }
        state.set_pen_down(true);
        self.record_tip(arm);
    }
}

use serde::Serialize;
use spinart_core::{
    arm::ARM_COUNT,
    pen_path::PenPaths,
    player::{PlaybackStatus, Player},
    simulation::{ArmState, Simulation},
};
use std::sync::Arc;

/// Everything a front end needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub arms: [ArmState; ARM_COUNT],
    pub active_arm: Option<usize>,
    pub canvas_rotation: f64,
    pub rotation_speed: f64,
    pub playback: PlaybackStatus,
    /// Shared between snapshots until a point is stored or the paths are cleared
    pub paths: Arc<PenPaths>,
}

impl Snapshot {
    pub fn capture(simulation: &Simulation, player: &Player) -> Self {
        Self::with_paths(simulation, player, Arc::new(simulation.paths().clone()))
    }

    /// Capture again, reusing `previous`'s paths when nothing was drawn since.
    pub fn refresh(previous: &Snapshot, simulation: &Simulation, player: &Player) -> Self {
        let paths = if previous.paths.revision() == simulation.paths().revision() {
            Arc::clone(&previous.paths)
        } else {
            Arc::new(simulation.paths().clone())
        };
        Self::with_paths(simulation, player, paths)
    }

    fn with_paths(simulation: &Simulation, player: &Player, paths: Arc<PenPaths>) -> Self {
        Self {
            arms: simulation.arm_states(),
            active_arm: simulation.active_arm(),
            canvas_rotation: simulation.canvas_rotation(),
            rotation_speed: simulation.rotation_speed(),
            playback: player.status(),
            paths,
        }
    }
}

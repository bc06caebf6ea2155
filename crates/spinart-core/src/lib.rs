//! Kinematics and trajectory core of the spin-art plotter.
//!
//! Four telescoping arms sit at the corners of a square frame around a
//! spinning canvas. This crate owns their poses, the pen paths they leave
//! on the canvas and the playback of scripted trajectories. It has no
//! notion of time or rendering; hosts drive it and read from it.

pub mod arm;
pub mod config;
pub mod geometry;
pub mod pen_path;
pub mod player;
pub mod simulation;
pub mod trajectory;
pub mod view;

pub use arm::{ARM_COUNT, Arm, Pose};
pub use config::{ConfigError, SimulationConfig};
pub use geometry::Vec2;
pub use pen_path::PenPaths;
pub use player::{OnComplete, PlaybackState, PlaybackTarget, Player};
pub use simulation::{DragEvent, Simulation};
pub use trajectory::{AbsoluteTrajectory, ArmSample, Trajectory, WaypointTrajectory};

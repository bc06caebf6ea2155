//! Deterministic playback without wall-clock timers.
//!
//! Each playback tick is followed by however many display frames would
//! elapse in real time between two ticks, so the canvas spins by the same
//! amount it would in an interactive session.

use crate::snapshot::Snapshot;
use spinart_core::{
    config::SimulationConfig,
    player::{PlaybackState, Player},
    simulation::Simulation,
    trajectory::Trajectory,
};

/// Upper bound on ticks when running until playback stops on its own
pub const MAX_UNBOUNDED_TICKS: usize = 1_000_000;

pub struct Headless {
    simulation: Simulation,
    player: Player,
    frames_per_tick: f64,
    pending_frames: f64,
}

impl Headless {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            simulation: Simulation::new(config),
            player: Player::new(&config.playback),
            frames_per_tick: config.playback.display_rate() / config.playback.tick_rate(),
            pending_frames: 0.0,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn load(&mut self, trajectory: Trajectory) -> bool {
        self.pending_frames = 0.0;
        self.player.load(trajectory, &mut self.simulation)
    }

    pub fn play(&mut self) -> bool {
        self.player.play()
    }

    /// One playback tick followed by the display frames it spans
    pub fn tick(&mut self) {
        self.player.tick(&mut self.simulation);
        self.pending_frames += self.frames_per_tick;
        while self.pending_frames >= 1.0 {
            self.simulation.display_frame();
            self.pending_frames -= 1.0;
        }
    }

    /// Run up to `ticks` ticks, stopping early once playback pauses.
    /// Returns the number of ticks run.
    pub fn run(&mut self, ticks: usize) -> usize {
        for done in 0..ticks {
            if self.player.state() != PlaybackState::Playing {
                return done;
            }
            self.tick();
        }
        ticks
    }

    /// Ticks needed for one pass: every frame once, or until a waypoint run
    /// stops by itself.
    pub fn default_ticks(&self) -> usize {
        match self.player.status().max_speed {
            Some(_) => MAX_UNBOUNDED_TICKS,
            None => self.player.status().len,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.simulation, &self.player)
    }
}

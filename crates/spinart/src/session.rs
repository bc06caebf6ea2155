//! Real-time session.
//!
//! One task owns the simulation and the player. Every mutation arrives as a
//! [`Command`] over an mpsc queue, so pointer input, playback ticks and
//! display frames are applied strictly one after another. Readers get
//! [`Snapshot`]s from a watch channel and never touch live state.

use crate::{command::Command, snapshot::Snapshot};
use spinart_core::{
    config::SimulationConfig,
    player::Player,
    simulation::{DragEvent, Simulation},
};
use std::{future, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, Instant, Interval, MissedTickBehavior},
};

const COMMAND_QUEUE: usize = 64;

pub struct SessionHandle {
    pub commands: mpsc::Sender<Command>,
    pub snapshots: watch::Receiver<Snapshot>,
    pub task: JoinHandle<()>,
}

struct Session {
    simulation: Simulation,
    player: Player,
    display_period: Duration,
}

/// Start a session on the current tokio runtime.
pub fn spawn(config: &SimulationConfig) -> SessionHandle {
    let session = Session {
        simulation: Simulation::new(config),
        player: Player::new(&config.playback),
        display_period: Duration::from_secs_f64(1.0 / config.playback.display_rate()),
    };
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
    let task = tokio::spawn(session.run(command_rx, snapshot_tx));
    SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        task,
    }
}

fn interval_starting_after(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

impl Session {
    fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.simulation, &self.player)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<Snapshot>,
    ) {
        let mut display = interval_starting_after(self.display_period);
        let mut playback: Option<Interval> = None;
        let mut generation = None;

        loop {
            // a new generation invalidates the old timer; only one is ever live
            if generation != Some(self.player.generation()) {
                generation = Some(self.player.generation());
                playback = self.player.tick_period().map(interval_starting_after);
            }

            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(command) => self.apply(command).await,
                },
                _ = display.tick() => self.simulation.display_frame(),
                _ = next_tick(&mut playback) => self.player.tick(&mut self.simulation),
            }

            let snapshot = Snapshot::refresh(&snapshots.borrow(), &self.simulation, &self.player);
            snapshots.send_replace(snapshot);
        }

        tracing::info!("session stopped");
    }

    async fn apply(&mut self, command: Command) {
        tracing::debug!(?command, "applying command");
        match command {
            Command::Load(path) => match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    let trajectory = spinart_trajectory::parse(&text);
                    if !self.player.load(trajectory, &mut self.simulation) {
                        tracing::warn!(path = %path.display(), "no trajectory data");
                    }
                }
                Err(err) => tracing::warn!(path = %path.display(), %err, "failed to read trajectory"),
            },
            Command::Toggle => {
                self.player.toggle();
            }
            Command::Play => {
                self.player.play();
            }
            Command::Pause => {
                self.player.pause();
            }
            Command::Step => {
                self.player.step(&mut self.simulation);
            }
            Command::Pen { arm, down } => {
                let applied = match down {
                    Some(down) => self.simulation.set_pen(arm, down),
                    None => self.simulation.toggle_pen(arm).is_some(),
                };
                if !applied {
                    tracing::warn!(arm, "no such arm");
                }
            }
            Command::Mark(arm) => {
                self.simulation.mark(arm);
            }
            Command::Grab { arm, point } => {
                if let Some(DragEvent::Started { arm }) = self.simulation.begin_drag(arm, point) {
                    tracing::info!(arm, "drag started");
                }
            }
            Command::Drag(point) => {
                self.simulation.drag_to(point);
            }
            Command::Release => {
                if let Some(DragEvent::Ended { arm }) = self.simulation.end_drag() {
                    tracing::info!(arm, "drag ended");
                }
            }
            Command::Fps(fps) => {
                self.player.set_fps(fps);
            }
            Command::Speed(speed) => {
                if !self.player.set_max_speed(speed) {
                    tracing::warn!(speed, "ignoring non-positive speed");
                }
            }
            Command::Rotation(speed) => {
                self.simulation.set_rotation_speed(speed);
            }
            Command::ControlArm(arm) => {
                if !self.player.set_controlled_arm(arm) {
                    tracing::warn!(arm, "no such arm");
                }
            }
            Command::Clear => self.simulation.clear_paths(),
            Command::Status | Command::Quit => {}
        }
    }
}

//! Trajectory playback state machine.
//!
//! The player never sleeps or spawns timers itself. A driver calls
//! [`Player::tick`] every [`Player::tick_period`] while the player is
//! [`PlaybackState::Playing`], and recreates its timer whenever
//! [`Player::generation`] changes so that at most one timer is ever live.
//!
//! Poses and pen samples flow out through [`PlaybackTarget`].

use crate::{
    config::{MAX_ARM_SPEED, MAX_FPS, MIN_FPS, PlaybackConfig},
    geometry::Vec2,
    trajectory::{ArmSample, Frame, Trajectory},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens when playback runs past the last frame or waypoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnComplete {
    /// Wrap to the start and keep going
    Loop,
    /// Keep playing but leave the arm at the final pose
    HoldLast,
    /// Pause at the final pose
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Paused,
    Playing,
}

/// Receiver of the poses computed during playback.
///
/// Implementations must update pose before recording the pen sample so the
/// recorded point reflects the new pose.
pub trait PlaybackTarget {
    /// Called once per load with the header speed, if any
    fn reset_canvas(&mut self, rotation_speed: Option<f64>);

    /// Set an arm's pose and pen directly from trusted frame data
    fn apply_sample(&mut self, arm: usize, sample: ArmSample);

    /// Swing `arm` toward a world point with its pen down
    fn reach(&mut self, arm: usize, point: Vec2);
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackCommand {
    ResetCanvas(Option<f64>),
    ApplySample(usize, ArmSample),
    Reach(usize, Vec2),
}

/// Target that just remembers what it was asked to do
#[derive(Default, Debug)]
pub struct RecordingTarget {
    pub commands: Vec<PlaybackCommand>,
}

impl PlaybackTarget for RecordingTarget {
    fn reset_canvas(&mut self, rotation_speed: Option<f64>) {
        self.commands
            .push(PlaybackCommand::ResetCanvas(rotation_speed));
    }

    fn apply_sample(&mut self, arm: usize, sample: ArmSample) {
        self.commands.push(PlaybackCommand::ApplySample(arm, sample));
    }

    fn reach(&mut self, arm: usize, point: Vec2) {
        self.commands.push(PlaybackCommand::Reach(arm, point));
    }
}

#[derive(Clone, Debug)]
enum Cursor {
    Frames {
        frames: Vec<Frame>,
        index: usize,
    },
    Waypoints {
        points: Vec<Vec2>,
        /// Last waypoint reached
        index: usize,
        position: Vec2,
    },
}

impl Cursor {
    fn index(&self) -> usize {
        match self {
            Cursor::Frames { index, .. } | Cursor::Waypoints { index, .. } => *index,
        }
    }

    fn len(&self) -> usize {
        match self {
            Cursor::Frames { frames, .. } => frames.len(),
            Cursor::Waypoints { points, .. } => points.len(),
        }
    }
}

fn next_index(len: usize, index: usize, on_complete: OnComplete) -> Option<usize> {
    if index + 1 < len {
        Some(index + 1)
    } else if on_complete == OnComplete::Loop && len > 1 {
        Some(0)
    } else {
        None
    }
}

/// Frames advance modulo their length under `Loop`, so a single frame is
/// re-applied on every step.
fn next_frame(len: usize, index: usize, on_complete: OnComplete) -> Option<usize> {
    match on_complete {
        OnComplete::Loop if len > 0 => Some((index + 1) % len),
        _ => next_index(len, index, on_complete),
    }
}

fn apply_frame<T: PlaybackTarget>(frame: &Frame, target: &mut T) {
    for (arm, slot) in frame.iter().enumerate() {
        match slot {
            Some(sample) if sample.is_valid() => target.apply_sample(arm, *sample),
            _ => tracing::trace!(arm, "no usable sample, leaving arm as is"),
        }
    }
}

/// Snapshot of playback for presentation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub index: usize,
    pub len: usize,
    pub fps: f64,
    /// Only meaningful while a waypoint trajectory is loaded
    pub max_speed: Option<f64>,
    pub on_complete: Option<OnComplete>,
}

#[derive(Clone, Debug)]
pub struct Player {
    cursor: Option<Cursor>,
    playing: bool,
    fps: f64,
    max_speed: f64,
    controlled_arm: usize,
    on_complete: OnComplete,
    on_complete_override: Option<OnComplete>,
    generation: u64,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

impl Player {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            cursor: None,
            playing: false,
            fps: config.tick_rate(),
            max_speed: config.max_speed,
            controlled_arm: config.controlled_arm,
            on_complete: config.on_complete.unwrap_or(OnComplete::Loop),
            on_complete_override: config.on_complete,
            generation: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        match (&self.cursor, self.playing) {
            (None, _) => PlaybackState::Idle,
            (Some(_), false) => PlaybackState::Paused,
            (Some(_), true) => PlaybackState::Playing,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    pub fn index(&self) -> Option<usize> {
        self.cursor.as_ref().map(Cursor::index)
    }

    /// Current waypoint-mode pen target, if a waypoint trajectory is loaded
    pub fn position(&self) -> Option<Vec2> {
        match &self.cursor {
            Some(Cursor::Waypoints { position, .. }) => Some(*position),
            _ => None,
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn controlled_arm(&self) -> usize {
        self.controlled_arm
    }

    pub fn on_complete(&self) -> OnComplete {
        self.on_complete
    }

    /// Bumped whenever the tick timer must be torn down and recreated
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Interval between ticks while playing
    pub fn tick_period(&self) -> Option<Duration> {
        self.is_playing()
            .then(|| Duration::from_secs_f64(1.0 / self.fps))
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.state(),
            index: self.cursor.as_ref().map_or(0, Cursor::index),
            len: self.cursor.as_ref().map_or(0, Cursor::len),
            fps: self.fps,
            max_speed: matches!(self.cursor, Some(Cursor::Waypoints { .. }))
                .then_some(self.max_speed),
            on_complete: self.cursor.is_some().then_some(self.on_complete),
        }
    }

    pub fn set_fps(&mut self, fps: f64) -> bool {
        if fps.is_nan() {
            return false;
        }
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
        self.generation += 1;
        true
    }

    pub fn set_max_speed(&mut self, max_speed: f64) -> bool {
        if max_speed.is_nan() || max_speed <= 0.0 {
            return false;
        }
        self.max_speed = max_speed.min(MAX_ARM_SPEED);
        true
    }

    /// Select which arm waypoint playback drives. Takes effect on the next tick.
    pub fn set_controlled_arm(&mut self, arm: usize) -> bool {
        if arm >= crate::arm::ARM_COUNT {
            return false;
        }
        self.controlled_arm = arm;
        true
    }

    /// Replace whatever is loaded and pause at the start.
    ///
    /// Empty trajectories are refused and leave the player untouched.
    pub fn load<T: PlaybackTarget>(&mut self, trajectory: Trajectory, target: &mut T) -> bool {
        if trajectory.is_empty() {
            tracing::warn!("ignoring empty trajectory");
            return false;
        }

        self.on_complete = self
            .on_complete_override
            .unwrap_or_else(|| trajectory.default_on_complete());
        target.reset_canvas(trajectory.rotation_speed());

        let len = trajectory.len();
        self.cursor = Some(match trajectory {
            Trajectory::Absolute(t) => Cursor::Frames {
                frames: t.frames,
                index: 0,
            },
            Trajectory::Waypoints(t) => {
                let position = t.waypoints[0];
                Cursor::Waypoints {
                    points: t.waypoints,
                    index: 0,
                    position,
                }
            }
        });
        self.playing = false;
        self.generation += 1;
        tracing::info!(len, on_complete = ?self.on_complete, "trajectory loaded");
        true
    }

    /// Drop the loaded trajectory and return to idle
    pub fn unload(&mut self) {
        self.cursor = None;
        self.playing = false;
        self.generation += 1;
    }

    pub fn toggle(&mut self) -> bool {
        if self.cursor.is_none() {
            return false;
        }
        self.playing = !self.playing;
        self.generation += 1;
        tracing::info!(playing = self.playing, "playback toggled");
        true
    }

    pub fn play(&mut self) -> bool {
        !self.playing && self.toggle()
    }

    pub fn pause(&mut self) -> bool {
        self.playing && self.toggle()
    }

    /// Advance exactly one frame or waypoint, jumping straight to it.
    pub fn step<T: PlaybackTarget>(&mut self, target: &mut T) -> bool {
        let arm = self.controlled_arm;
        match &mut self.cursor {
            None => false,
            Some(Cursor::Frames { frames, index }) => {
                let Some(next) = next_frame(frames.len(), *index, self.on_complete) else {
                    return false;
                };
                *index = next;
                apply_frame(&frames[next], target);
                true
            }
            Some(Cursor::Waypoints {
                points,
                index,
                position,
            }) => {
                let next = *index + 1;
                if next >= points.len() {
                    return false;
                }
                *index = next;
                *position = points[next];
                target.reach(arm, *position);
                true
            }
        }
    }

    /// Advance playback by one timer period. Does nothing unless playing.
    pub fn tick<T: PlaybackTarget>(&mut self, target: &mut T) {
        if !self.is_playing() {
            return;
        }
        let arm = self.controlled_arm;
        let on_complete = self.on_complete;
        let finished = match &mut self.cursor {
            None => return,
            Some(Cursor::Frames { frames, index }) => {
                match next_frame(frames.len(), *index, on_complete) {
                    Some(next) => {
                        *index = next;
                        apply_frame(&frames[next], target);
                        false
                    }
                    None => true,
                }
            }
            Some(Cursor::Waypoints {
                points,
                index,
                position,
            }) => match next_index(points.len(), *index, on_complete) {
                None => true,
                Some(next) => {
                    let goal = points[next];
                    let delta = goal - *position;
                    let distance = delta.length();
                    if distance <= self.max_speed {
                        *position = goal;
                        *index = next;
                        target.reach(arm, goal);
                        next_index(points.len(), next, on_complete).is_none()
                    } else {
                        *position = *position + delta * (self.max_speed / distance);
                        target.reach(arm, *position);
                        false
                    }
                }
            },
        };

        if finished {
            self.finish();
        }
    }

    fn finish(&mut self) {
        match self.on_complete {
            OnComplete::Stop => {
                self.playing = false;
                self.generation += 1;
                tracing::info!("playback reached the end");
            }
            OnComplete::HoldLast | OnComplete::Loop => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::{AbsoluteTrajectory, WaypointTrajectory};

    fn sample(angle: f64, pen_down: bool) -> ArmSample {
        ArmSample {
            angle,
            offset: 6.0,
            pen_down,
        }
    }

    fn frames(len: usize) -> Trajectory {
        let arm: Vec<ArmSample> = (0..len).map(|i| sample(i as f64, true)).collect();
        Trajectory::Absolute(AbsoluteTrajectory::from_arms(Some(0.02), &[arm]))
    }

    fn waypoints(points: &[(f64, f64)]) -> Trajectory {
        Trajectory::Waypoints(WaypointTrajectory {
            rotation_speed: None,
            waypoints: points.iter().copied().map(Vec2::from).collect(),
        })
    }

    fn player(max_speed: f64) -> Player {
        Player::new(&PlaybackConfig {
            max_speed,
            ..PlaybackConfig::default()
        })
    }

    fn reaches(target: &RecordingTarget) -> Vec<Vec2> {
        target
            .commands
            .iter()
            .filter_map(|c| match c {
                PlaybackCommand::Reach(_, p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_idle_and_ignores_controls() {
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(!player.toggle());
        assert!(!player.step(&mut target));
        player.tick(&mut target);
        assert!(target.commands.is_empty());
        assert_eq!(player.tick_period(), None);
    }

    #[test]
    fn empty_load_keeps_idle() {
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        assert!(!player.load(frames(0), &mut target));
        assert!(!player.load(waypoints(&[]), &mut target));
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(target.commands.is_empty());
    }

    #[test]
    fn load_pauses_at_start_and_resets_canvas() {
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        player.load(frames(3), &mut target);
        player.toggle();
        assert!(player.is_playing());

        let generation = player.generation();
        player.load(frames(2), &mut target);
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.index(), Some(0));
        assert!(player.generation() > generation);
        assert_eq!(
            target.commands,
            vec![
                PlaybackCommand::ResetCanvas(Some(0.02)),
                PlaybackCommand::ResetCanvas(Some(0.02)),
            ]
        );
    }

    #[test]
    fn absolute_step_wraps() {
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        player.load(frames(3), &mut target);
        for _ in 0..4 {
            assert!(player.step(&mut target));
        }
        assert_eq!(player.index(), Some(1));
        assert_eq!(
            target.commands.last(),
            Some(&PlaybackCommand::ApplySample(0, sample(1.0, true)))
        );
    }

    #[test]
    fn single_frame_is_reapplied_on_every_advance() {
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        player.load(frames(1), &mut target);
        target.commands.clear();

        assert!(player.step(&mut target));
        player.toggle();
        for _ in 0..3 {
            player.tick(&mut target);
        }
        assert_eq!(player.index(), Some(0));
        assert!(player.is_playing());
        assert_eq!(
            target.commands,
            vec![PlaybackCommand::ApplySample(0, sample(0.0, true)); 4]
        );
    }

    #[test]
    fn absolute_ticks_wrap_while_playing() {
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        player.load(frames(3), &mut target);
        player.tick(&mut target);
        assert_eq!(player.index(), Some(0), "paused players ignore ticks");

        player.toggle();
        for _ in 0..7 {
            player.tick(&mut target);
        }
        assert_eq!(player.index(), Some(1));
        assert!(player.is_playing());
    }

    #[test]
    fn absolute_frames_skip_missing_and_malformed_samples() {
        let arms = vec![
            vec![sample(0.0, true), sample(f64::NAN, true)],
            vec![sample(5.0, false)],
        ];
        let trajectory = Trajectory::Absolute(AbsoluteTrajectory::from_arms(None, &arms));
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        player.load(trajectory, &mut target);
        target.commands.clear();

        player.step(&mut target);
        assert!(target.commands.is_empty());
        player.step(&mut target);
        assert_eq!(
            target.commands,
            vec![
                PlaybackCommand::ApplySample(0, sample(0.0, true)),
                PlaybackCommand::ApplySample(1, sample(5.0, false)),
            ]
        );
    }

    #[test]
    fn absolute_stop_policy_pauses_at_end() {
        let mut player = Player::new(&PlaybackConfig {
            on_complete: Some(OnComplete::Stop),
            ..PlaybackConfig::default()
        });
        let mut target = RecordingTarget::default();
        player.load(frames(2), &mut target);
        player.toggle();
        player.tick(&mut target);
        assert_eq!(player.index(), Some(1));
        assert!(player.is_playing());
        player.tick(&mut target);
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.index(), Some(1));
        assert!(!player.step(&mut target));
    }

    #[test]
    fn waypoint_playback_stops_without_wrapping() {
        let mut player = player(10.0);
        let mut target = RecordingTarget::default();
        player.load(waypoints(&[(0.0, 0.0), (5.0, 0.0)]), &mut target);
        player.toggle();
        player.tick(&mut target);

        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.index(), Some(1));
        assert_eq!(reaches(&target), vec![Vec2::new(5.0, 0.0)]);

        player.toggle();
        player.tick(&mut target);
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.index(), Some(1));
        assert_eq!(reaches(&target).len(), 1);
    }

    #[test]
    fn waypoint_tick_is_rate_limited() {
        let mut player = player(3.0);
        let mut target = RecordingTarget::default();
        player.load(waypoints(&[(0.0, 0.0), (10.0, 0.0)]), &mut target);
        player.toggle();
        player.tick(&mut target);

        assert_eq!(player.index(), Some(0));
        assert_eq!(player.position(), Some(Vec2::new(3.0, 0.0)));
        assert_eq!(reaches(&target), vec![Vec2::new(3.0, 0.0)]);
        assert!(player.is_playing());

        for _ in 0..3 {
            player.tick(&mut target);
        }
        assert_eq!(player.position(), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(player.state(), PlaybackState::Paused);
    }

    #[test]
    fn waypoint_step_jumps_directly() {
        let mut player = player(0.5);
        let mut target = RecordingTarget::default();
        player.load(waypoints(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]), &mut target);
        assert!(player.step(&mut target));
        assert_eq!(player.position(), Some(Vec2::new(10.0, 0.0)));
        assert!(player.step(&mut target));
        assert!(!player.step(&mut target));
        assert_eq!(player.index(), Some(2));
        assert_eq!(
            reaches(&target),
            vec![Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]
        );
    }

    #[test]
    fn waypoints_follow_controlled_arm() {
        let mut player = Player::new(&PlaybackConfig {
            controlled_arm: 2,
            ..PlaybackConfig::default()
        });
        let mut target = RecordingTarget::default();
        player.load(waypoints(&[(0.0, 0.0), (1.0, 0.0)]), &mut target);
        player.step(&mut target);
        assert_eq!(
            target.commands.last(),
            Some(&PlaybackCommand::Reach(2, Vec2::new(1.0, 0.0)))
        );
        assert!(!player.set_controlled_arm(4));
    }

    #[test]
    fn waypoint_loop_policy_returns_to_start() {
        let mut player = Player::new(&PlaybackConfig {
            max_speed: 100.0,
            on_complete: Some(OnComplete::Loop),
            ..PlaybackConfig::default()
        });
        let mut target = RecordingTarget::default();
        player.load(waypoints(&[(0.0, 0.0), (5.0, 0.0)]), &mut target);
        player.toggle();
        player.tick(&mut target);
        player.tick(&mut target);
        assert_eq!(player.index(), Some(0));
        assert!(player.is_playing());
    }

    #[test]
    fn hold_last_keeps_playing_without_moving() {
        let mut player = Player::new(&PlaybackConfig {
            max_speed: 100.0,
            on_complete: Some(OnComplete::HoldLast),
            ..PlaybackConfig::default()
        });
        let mut target = RecordingTarget::default();
        player.load(waypoints(&[(0.0, 0.0), (5.0, 0.0)]), &mut target);
        player.toggle();
        let generation = player.generation();
        for _ in 0..3 {
            player.tick(&mut target);
        }
        assert!(player.is_playing());
        assert_eq!(player.generation(), generation);
        assert_eq!(reaches(&target).len(), 1);
    }

    #[test]
    fn timer_settings() {
        let mut player = Player::default();
        let mut target = RecordingTarget::default();
        player.load(frames(2), &mut target);
        assert_eq!(player.tick_period(), None);
        player.toggle();
        assert_eq!(player.tick_period(), Some(Duration::from_secs_f64(1.0 / 30.0)));

        let generation = player.generation();
        assert!(player.set_fps(1000.0));
        assert_eq!(player.fps(), MAX_FPS);
        assert!(player.generation() > generation);
        assert!(!player.set_fps(f64::NAN));

        assert!(!player.set_max_speed(0.0));
        assert!(!player.set_max_speed(f64::NAN));
        assert!(player.set_max_speed(2.5));
        assert_eq!(player.max_speed(), 2.5);
    }

    #[test]
    fn status_reports_mode() {
        let mut player = player(2.0);
        let mut target = RecordingTarget::default();
        assert_eq!(player.status().state, PlaybackState::Idle);
        player.load(frames(3), &mut target);
        let status = player.status();
        assert_eq!(status.len, 3);
        assert_eq!(status.max_speed, None);
        assert_eq!(status.on_complete, Some(OnComplete::Loop));

        player.load(waypoints(&[(0.0, 0.0)]), &mut target);
        let status = player.status();
        assert_eq!(status.max_speed, Some(2.0));
        assert_eq!(status.on_complete, Some(OnComplete::Stop));

        player.unload();
        assert_eq!(player.state(), PlaybackState::Idle);
    }
}

//! End-to-end playback through the headless driver and the session task
use anyhow::Result;
use spinart::{command::Command, driver::Headless, session, snapshot::Snapshot};
use spinart_core::{config::SimulationConfig, player::PlaybackState};
use std::{io::Write, time::Duration};
use tokio::time::timeout;

const ABSOLUTE: &str = "# Canvas
0.05

# Arm 0
0 6 true
0.5 6 true
1 6 true

# Arm 1
2 8 false
2.5 8 true
";

fn write_trajectory(text: &str) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".traj").tempfile()?;
    file.write_all(text.as_bytes())?;
    Ok(file)
}

#[test]
fn headless_pass_over_absolute_frames() {
    let mut config = SimulationConfig::default();
    config.playback.display_fps = config.playback.fps;
    let mut headless = Headless::new(&config);
    assert!(headless.load(spinart_trajectory::parse(ABSOLUTE)));
    headless.play();

    let ticks = headless.default_ticks();
    assert_eq!(ticks, 3);
    assert_eq!(headless.run(ticks), 3);

    let snapshot = headless.snapshot();
    assert_eq!(snapshot.playback.state, PlaybackState::Playing);
    assert_eq!(snapshot.playback.index, 0);
    assert_eq!(snapshot.rotation_speed, 0.05);
    assert_eq!(snapshot.arms[0].pose.angle, 0.0);
    assert_eq!(snapshot.arms[0].pose.front_length, 6.0);
    assert!((snapshot.arms[0].pose.back_length - 12.0).abs() < 1e-12);

    // arm 0 drew on every tick and display frame; arm 1 only after its pen
    // came down on frame 1
    assert_eq!(snapshot.paths.segment_count(0), 1);
    assert!(snapshot.paths.point_count(0) >= 3);
    assert_eq!(snapshot.paths.segment_count(1), 1);
    assert_eq!(snapshot.paths.segment_count(2), 0);
}

#[test]
fn headless_waypoints_end_paused() {
    let mut headless = Headless::new(&SimulationConfig::default());
    assert!(headless.load(spinart_trajectory::parse("0.0\n0 0\n3 0\n3 3\n")));
    headless.play();
    let ran = headless.run(headless.default_ticks());
    assert_eq!(ran, 6);

    let snapshot = headless.snapshot();
    assert_eq!(snapshot.playback.state, PlaybackState::Paused);
    assert_eq!(snapshot.playback.index, 2);
    assert!(snapshot.arms[0].pen_down);
    let tip = snapshot.arms[0].tip;
    assert!((tip.x - 3.0).abs() < 1e-9 && (tip.y - 3.0).abs() < 1e-9);
}

#[test]
fn snapshot_serializes_to_json() -> Result<()> {
    let headless = Headless::new(&SimulationConfig::default());
    let json: serde_json::Value = serde_json::to_value(headless.snapshot())?;
    assert_eq!(json["playback"]["state"], "idle");
    assert_eq!(json["arms"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["arms"][0]["front_length"], 5.0);
    assert_eq!(json["paths"], serde_json::json!([[], [], [], []]));
    Ok(())
}

async fn wait_for(
    snapshots: &mut tokio::sync::watch::Receiver<Snapshot>,
    done: impl Fn(&Snapshot) -> bool,
) -> Result<Snapshot> {
    let snapshot = timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|snapshot| done(snapshot)),
    )
    .await??
    .clone();
    Ok(snapshot)
}

#[tokio::test]
async fn session_applies_commands_in_order() -> Result<()> {
    let file = write_trajectory(ABSOLUTE)?;
    let mut handle = session::spawn(&SimulationConfig::default());

    handle
        .commands
        .send(Command::Load(file.path().to_path_buf()))
        .await?;
    handle.commands.send(Command::Step).await?;
    let snapshot = wait_for(&mut handle.snapshots, |s| s.playback.index == 1).await?;
    assert_eq!(snapshot.playback.state, PlaybackState::Paused);
    assert_eq!(snapshot.arms[0].pose.angle, 0.5);

    handle.commands.send(Command::Toggle).await?;
    wait_for(&mut handle.snapshots, |s| {
        s.playback.state == PlaybackState::Playing && s.playback.index == 0
    })
    .await?;

    let hub = snapshot.arms[3].hub;
    handle
        .commands
        .send(Command::Grab {
            arm: 3,
            point: snapshot.arms[3].tip,
        })
        .await?;
    wait_for(&mut handle.snapshots, |s| s.active_arm == Some(3)).await?;
    handle
        .commands
        .send(Command::Drag(hub + spinart_core::geometry::Vec2::new(-5.0, 5.0)))
        .await?;
    handle.commands.send(Command::Release).await?;
    let snapshot = wait_for(&mut handle.snapshots, |s| s.active_arm.is_none()).await?;
    assert!((snapshot.arms[3].pose.front_length - 50f64.sqrt()).abs() < 1e-9);

    handle.commands.send(Command::Quit).await?;
    timeout(Duration::from_secs(5), handle.task).await??;
    Ok(())
}

#[tokio::test]
async fn session_stops_when_commands_close() -> Result<()> {
    let handle = session::spawn(&SimulationConfig::default());
    drop(handle.commands);
    timeout(Duration::from_secs(5), handle.task).await??;
    Ok(())
}

#[tokio::test]
async fn session_survives_unvalidated_rates() -> Result<()> {
    let mut config = SimulationConfig::default();
    config.playback.display_fps = 0.0;
    config.playback.fps = f64::NAN;
    let mut handle = session::spawn(&config);

    handle.commands.send(Command::Status).await?;
    wait_for(&mut handle.snapshots, |s| s.playback.fps == 30.0).await?;
    handle.commands.send(Command::Quit).await?;
    timeout(Duration::from_secs(5), handle.task).await??;
    Ok(())
}

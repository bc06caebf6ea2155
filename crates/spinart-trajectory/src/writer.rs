use spinart_core::trajectory::{AbsoluteTrajectory, WaypointTrajectory};
use std::fmt::{self, Write};

/// Write frames in the absolute dialect.
///
/// Numbers use Rust's shortest round-trip formatting, so parsing the output
/// gives back bit-identical values. Each arm is written up to its first
/// missing frame.
pub fn write_absolute<W: Write>(out: &mut W, trajectory: &AbsoluteTrajectory) -> fmt::Result {
    let mut first = true;
    if let Some(speed) = trajectory.rotation_speed {
        writeln!(out, "# Canvas\n{speed}")?;
        first = false;
    }
    for (index, samples) in trajectory.arms().iter().enumerate() {
        if !first {
            out.write_char('\n')?;
        }
        first = false;
        writeln!(out, "# Arm {index}")?;
        for sample in samples {
            writeln!(
                out,
                "{} {} {}",
                sample.angle, sample.offset, sample.pen_down
            )?;
        }
    }
    Ok(())
}

pub fn write_waypoints<W: Write>(out: &mut W, trajectory: &WaypointTrajectory) -> fmt::Result {
    writeln!(out, "{}", trajectory.rotation_speed.unwrap_or(0.0))?;
    for point in &trajectory.waypoints {
        writeln!(out, "{} {}", point.x, point.y)?;
    }
    Ok(())
}

pub fn to_absolute_text(trajectory: &AbsoluteTrajectory) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_absolute(&mut out, trajectory)?;
    Ok(out)
}

pub fn to_waypoint_text(trajectory: &WaypointTrajectory) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_waypoints(&mut out, trajectory)?;
    Ok(out)
}

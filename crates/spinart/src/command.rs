//! Line-oriented commands for an interactive session.

use anyhow::{Context, Result, bail};
use spinart_core::geometry::Vec2;
use std::{path::PathBuf, str::FromStr};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Toggle,
    Play,
    Pause,
    Step,
    /// Toggle when `down` is `None`
    Pen { arm: usize, down: Option<bool> },
    Mark(usize),
    Grab { arm: usize, point: Vec2 },
    Drag(Vec2),
    Release,
    Fps(f64),
    Speed(f64),
    Rotation(f64),
    ControlArm(usize),
    Clear,
    Status,
    Quit,
}

pub const HELP: &str = "\
load <file>          load a trajectory
toggle | play | pause
step                 advance one frame or waypoint
pen <arm> [up|down]  toggle or set a pen
mark <arm>           drop a dot at the arm's tip
grab <arm> <x> <y>   start dragging an arm
drag <x> <y>         move the dragged arm
release              end the drag
fps <n>              playback rate
speed <n>            waypoint speed cap per tick
rotation <n>         canvas spin per display frame
arm <n>              arm driven by waypoint playback
clear                erase all pen paths
status               print the current snapshot
quit";

fn arg<'a>(words: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    words
        .get(index)
        .copied()
        .with_context(|| format!("missing {what}"))
}

fn number(words: &[&str], index: usize, what: &str) -> Result<f64> {
    let raw = arg(words, index, what)?;
    raw.parse()
        .with_context(|| format!("invalid {what} '{raw}'"))
}

fn arm_index(words: &[&str], index: usize) -> Result<usize> {
    let raw = arg(words, index, "arm")?;
    raw.parse()
        .with_context(|| format!("invalid arm '{raw}'"))
}

fn point(words: &[&str], index: usize) -> Result<Vec2> {
    Ok(Vec2::new(
        number(words, index, "x")?,
        number(words, index + 1, "y")?,
    ))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = words.first() else {
            bail!("empty command");
        };

        let command = match name {
            "load" => {
                let rest = line.trim_start()[name.len()..].trim();
                if rest.is_empty() {
                    bail!("missing file");
                }
                Command::Load(PathBuf::from(rest))
            }
            "toggle" => Command::Toggle,
            "play" => Command::Play,
            "pause" => Command::Pause,
            "step" => Command::Step,
            "pen" => {
                let down = match words.get(2).copied() {
                    None => None,
                    Some("down") => Some(true),
                    Some("up") => Some(false),
                    Some(other) => bail!("pen state must be 'up' or 'down', got '{other}'"),
                };
                Command::Pen {
                    arm: arm_index(&words, 1)?,
                    down,
                }
            }
            "mark" => Command::Mark(arm_index(&words, 1)?),
            "grab" => Command::Grab {
                arm: arm_index(&words, 1)?,
                point: point(&words, 2)?,
            },
            "drag" => Command::Drag(point(&words, 1)?),
            "release" => Command::Release,
            "fps" => Command::Fps(number(&words, 1, "fps")?),
            "speed" => Command::Speed(number(&words, 1, "speed")?),
            "rotation" => Command::Rotation(number(&words, 1, "rotation speed")?),
            "arm" => Command::ControlArm(arm_index(&words, 1)?),
            "clear" => Command::Clear,
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{other}'"),
        };
        Ok(command)
    }
}

use anyhow::{Context, Result};
use clap::Args;
use spinart::{config::Config, driver::Headless, init_logging};
use std::{fs, path::PathBuf};

#[derive(Args)]
pub struct PlayArgs {
    /// Trajectory file in either dialect.
    pub trajectory: PathBuf,

    /// Path to the configuration file (TOML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of playback ticks; defaults to one pass over the trajectory.
    #[arg(long)]
    pub ticks: Option<usize>,

    /// Write the snapshot here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl PlayArgs {
    pub fn run(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        init_logging(&config.log.filter);

        let text = fs::read_to_string(&self.trajectory).with_context(|| {
            format!("failed to read trajectory {}", self.trajectory.display())
        })?;
        let trajectory = spinart_trajectory::parse(&text);

        let mut headless = Headless::new(&config.simulation);
        if !headless.load(trajectory) {
            anyhow::bail!("no trajectory data in {}", self.trajectory.display());
        }
        headless.play();

        let ticks = self.ticks.unwrap_or_else(|| headless.default_ticks());
        let ran = headless.run(ticks);
        tracing::info!(ran, requested = ticks, "playback finished");

        let json = serde_json::to_string_pretty(&headless.snapshot())
            .context("failed to serialize snapshot")?;
        match &self.output {
            Some(path) => fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{json}"),
        }
        Ok(())
    }
}

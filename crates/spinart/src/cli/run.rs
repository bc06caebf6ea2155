use anyhow::{Context, Result};
use clap::Args;
use spinart::{
    command::{Command, HELP},
    config::Config,
    init_logging, session,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args)]
pub struct RunArgs {
    /// Path to the configuration file (TOML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    pub fn run(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        init_logging(&config.log.filter);
        run_session(config)
    }
}

#[tokio::main]
async fn run_session(config: Config) -> Result<()> {
    let handle = session::spawn(&config.simulation);
    tracing::info!("session started, type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "help" {
            println!("{HELP}");
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("error: {err:#}");
                continue;
            }
        };
        match command {
            Command::Status => {
                let snapshot = handle.snapshots.borrow().clone();
                println!("{}", serde_json::to_string(&snapshot)?);
            }
            Command::Quit => break,
            command => {
                if handle.commands.send(command).await.is_err() {
                    anyhow::bail!("session ended unexpectedly");
                }
            }
        }
    }

    drop(handle.commands);
    handle.task.await.context("session task failed")?;
    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Play(args) => args.run(),
        Command::Run(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "spinart", about = "Spin-art plotter simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a trajectory headlessly and print the final snapshot as JSON.
    Play(cli::play::PlayArgs),
    /// Run an interactive session driven by commands on stdin.
    Run(cli::run::RunArgs),
}

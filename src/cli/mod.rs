use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::ai::conversation::{Mode, PRESETS};

pub mod chat;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start a guided session in the terminal
    Chat {
        #[arg(long, value_enum)]
        mode: Mode,
    },
    /// List the available modes
    Modes {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Chat { mode }) => {
            chat::run(mode).await?;
        }
        Some(Command::Modes {}) => {
            for preset in PRESETS.iter() {
                println!("{:<16} {}", preset.id, preset.name);
            }
        }
        None => {}
    }

    Ok(())
}

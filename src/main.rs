use anyhow::Result;
use clap::Parser;

use babelfish::cli::commands::{load_config, messages, relay, rooms};
use babelfish::cli::{Args, Command};
use babelfish::logging;
use babelfish::translation::print_languages;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    match args.command {
        Command::Languages => {
            print_languages();
        }
        Command::Rooms { action } => {
            let config = load_config(args.config.as_deref())?;
            rooms::run_rooms(&config, action).await?;
        }
        Command::Messages(target) => {
            let config = load_config(args.config.as_deref())?;
            messages::run_messages(&config, &target).await?;
        }
        Command::Relay(relay_args) => {
            let config = load_config(args.config.as_deref())?;
            relay::run_relay(&config, relay_args).await?;
        }
    }

    Ok(())
}

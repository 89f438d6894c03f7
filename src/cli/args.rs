use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "babelfish")]
#[command(about = "Chat-room translation relay bot")]
#[command(version)]
pub struct Args {
    /// Config file (defaults to ~/.config/babelfish/config.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the rooms the bot belongs to
    Rooms {
        #[command(subcommand)]
        action: RoomsCommand,
    },
    /// Print a room's messages, oldest first, as JSON
    Messages(RoomTarget),
    /// Relay translations for one or more source rooms
    Relay(RelayArgs),
    /// List supported language codes
    Languages,
}

#[derive(Subcommand, Debug)]
pub enum RoomsCommand {
    /// List rooms, or print the id of the room with the given title
    List {
        #[arg(short = 't', long)]
        title: Option<String>,
    },
    /// Create a room and print its id
    Create {
        #[arg(short = 't', long)]
        title: String,
    },
    /// Delete a room
    Delete(RoomTarget),
}

/// A room named by id or by title. The id wins when both are given.
#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = true)]
pub struct RoomTarget {
    /// Room id
    #[arg(short = 'i', long)]
    pub id: Option<String>,

    /// Room title
    #[arg(short = 't', long)]
    pub title: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RelayArgs {
    /// Source room title (repeat for several rooms)
    #[arg(short = 't', long = "title", required = true)]
    pub titles: Vec<String>,

    /// Seconds between polls
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many polls per room
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Subscribers served concurrently per message
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Translation provider name
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Disable the translation cache
    #[arg(short = 'n', long)]
    pub no_cache: bool,

    /// Post a scripted conversation into the source rooms
    #[arg(long)]
    pub demo: bool,
}

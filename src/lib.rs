//! # babelfish - Chat-Room Translation Relay
//!
//! `babelfish` is a bot that watches chat rooms and relays every message,
//! translated, to the participants who asked for it.
//!
//! A participant types `/translate <lang>` in a watched room. From then on
//! each new message in that room is translated into `<lang>` and posted to
//! a private room named `<room title>-<email>`. `/stop` ends the
//! subscription.
//!
//! ## Quick Start
//!
//! ```bash
//! export SPARK_BOT_TOKEN="..."
//!
//! # Relay two rooms
//! babelfish relay --title "Team Sync" --title "Support"
//!
//! # Inspect a room
//! babelfish messages --title "Team Sync"
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/babelfish/config.toml`:
//!
//! ```toml
//! [babelfish]
//! provider = "ollama"
//! model = "gemma3:12b"
//! interval_secs = 10
//!
//! [spark]
//! token_env = "SPARK_BOT_TOKEN"
//!
//! [providers.ollama]
//! endpoint = "http://localhost:11434"
//! models = ["gemma3:12b"]
//! ```

/// Translation cache management using `SQLite`.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and provider settings.
pub mod config;

/// Tracing subscriber setup.
pub mod logging;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// The relay core: cursor, commands, registry, router and polling loop.
pub mod relay;

/// Spark (Webex) REST adapter.
pub mod spark;

/// Translation client for OpenAI-compatible APIs.
pub mod translation;

/// Terminal styling.
pub mod ui;

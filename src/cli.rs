//! Command-line interface built on clap.
//!
//! The transport that normally delivers USSD turns is external, so the
//! binary offers a local simulator and a graph check.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Health-worker registration over USSD.
#[derive(Debug, Parser)]
#[command(name = "ussd-registration", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file. Defaults to `ussd.toml` in the working directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Walk the dialogue interactively. An empty line starts a new session,
    /// `:close` closes it and `:quit` exits.
    Simulate {
        /// Sender address used for every turn.
        #[arg(long, default_value = "255743000001")]
        from: String,
    },

    /// Validate the dialogue graph and check every node fits one reply.
    Check,
}

//! # CLI Module
//!
//! Three subcommands over the `spec.md` §6 configuration document:
//!
//! ```bash
//! eventmd load --config run.xml
//! eventmd run --config run.xml --events 100000 --output final.xml
//! eventmd write --template run.xml
//! ```
//!
//! `load` parses and validates a configuration without running anything,
//! useful for checking a hand-written document before committing a long run
//! to it. `run` drives the event loop for a fixed event budget and writes
//! the resulting state back out. `write` emits a minimal template document
//! to start editing from.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and validate a configuration document without running it
    Load {
        /// Path to the configuration XML document
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Run the event loop for a fixed number of events
    Run {
        /// Path to the configuration XML document
        #[arg(short, long)]
        config: PathBuf,

        /// Number of events to execute before stopping
        #[arg(short, long, default_value_t = 10_000)]
        events: u64,

        /// Where to write the resulting configuration document
        #[arg(short, long)]
        output: PathBuf,

        /// Compress the particle data blob with bzip2
        #[arg(long, default_value_t = false)]
        compress: bool,
    },

    /// Write a minimal template configuration document
    Write {
        /// Path to write the template document to
        #[arg(short, long)]
        template: PathBuf,
    },
}

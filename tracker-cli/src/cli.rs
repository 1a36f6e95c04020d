//! CLI definition for trackerctl.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// trackerctl - inspect work item type schemas and validate field payloads.
///
/// Reads a YAML schema store (one file per work item type) and resolves
/// inheritance the same way the tracker does.
#[derive(Parser, Debug)]
#[command(name = "trackerctl")]
#[command(version)]
#[command(about = "Inspect work item type schemas and validate field payloads")]
#[command(
    long_about = "trackerctl reads a directory of work item type definitions, resolves \
    their inheritance chains and validates field payloads against the result.\n\n\
    Environment variables:\n  \
    TRACKER_STORE_ROOT             Schema store directory\n  \
    TRACKER_MAX_INHERITANCE_DEPTH  Longest allowed base type chain\n  \
    TRACKER_FILL_DEFAULTS          Fill absent enum and list fields with defaults"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file (.toml, .yaml or .json)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Schema store directory, overriding the configuration
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List work item types
    List,

    /// Print a work item type with its resolved schema as YAML
    Show {
        /// Work item type id
        id: String,
    },

    /// Validate a JSON object of field values against a work item type
    Validate {
        /// Work item type id
        id: String,
        /// File holding a JSON object of field values
        payload: PathBuf,
    },

    /// Resolve every work item type and report broken definitions
    Check,
}

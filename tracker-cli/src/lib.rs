//! Library side of `trackerctl`: the clap definition and the command bodies.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};

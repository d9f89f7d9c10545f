//! CLI layer: argument parsing, command dispatch and the interactive menu

pub mod args;
pub mod commands;
pub mod error;
pub mod menu;
pub mod output;

pub use args::{Cli, Commands, ConfigCommands};
pub use error::{CliError, CliResult};
pub use menu::{Menu, MenuChoice};

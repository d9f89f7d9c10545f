//! Command dispatch

use std::fs;
use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::GenealogyService;
use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::menu::Menu;
use crate::cli::output;
use crate::config::{global_config_dir, global_config_path, Settings, CONFIG_TEMPLATE};

pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    match &cli.command {
        None | Some(Commands::Menu) => run_menu(settings),
        Some(Commands::Config { command }) => run_config(command, settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

#[instrument(skip(settings))]
fn run_menu(settings: &Settings) -> CliResult<()> {
    let service = GenealogyService::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(&service, settings, stdin.lock(), stdout.lock());
    menu.run()?;
    menu.into_output()
        .flush()
        .map_err(|e| CliError::io("flush stdout", e))
}

#[instrument(skip(settings))]
fn run_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let path = global_config_path().ok_or_else(no_config_dir)?;
            output::info(&path.display());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let dir = global_config_dir().ok_or_else(no_config_dir)?;
            let path = dir.join("famtree.toml");
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            debug!("writing config template to {}", path.display());
            fs::create_dir_all(&dir).with_path_context("create config dir", &dir)?;
            fs::write(&path, CONFIG_TEMPLATE).with_path_context("write config", &path)?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn no_config_dir() -> ApplicationError {
    ApplicationError::Config {
        message: "cannot determine config directory".into(),
    }
}

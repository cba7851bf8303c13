// rosrel: ROS Release Pipeline
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Release | ImportUpstream | Generate | Patch | Options | Inis | Version
//! ```

use std::process::ExitCode;

use rosrel::cli::global::GlobalOptions;
use rosrel::cli::{self, Command};
use rosrel::cmd::config::{run_inis_command, run_options_command};
use rosrel::cmd::patch::run_patch_command;
use rosrel::cmd::release::{
    run_generate_command, run_import_upstream_command, run_release_command,
};
use rosrel::config::Config;
use rosrel::config::loader::ConfigLoader;
use rosrel::logging::init_logging;
use rosrel::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    if matches!(cli.command, Some(Command::Version)) {
        handle_version_command();
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config, quiet(&cli));
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config)
}

fn quiet(cli: &cli::Cli) -> bool {
    match &cli.command {
        Some(Command::Release(args) | Command::ImportUpstream(args)) => args.quiet,
        Some(Command::Generate(args)) => args.target.quiet,
        _ => false,
    }
}

fn build_log_config(config: &Config, quiet: bool) -> LogConfig {
    let console_level = if quiet {
        config.global.output_log_level.capped(LogLevel::WARN)
    } else {
        config.global.output_log_level
    };

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .build()
}

fn dispatch_command(cli: &cli::Cli, config: &Config) -> ExitCode {
    let repo = cli.global.repo.as_path();
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::Inis) => build_config_loader(&cli.global)
            .map(|loader| run_inis_command(&loader.format_loaded_files())),
        Some(Command::Release(args)) => run_release_command(args, config, repo),
        Some(Command::ImportUpstream(args)) => run_import_upstream_command(args, config, repo),
        Some(Command::Generate(args)) => run_generate_command(args, config, repo),
        Some(Command::Patch(args)) => run_patch_command(args, repo),
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> rosrel::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional("rosrel.toml");
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader = loader.with_env_prefix("ROSREL");
    for option in global.to_config_overrides() {
        loader = loader.set_option(&option)?;
    }
    Ok(loader)
}

fn load_config(global: &GlobalOptions) -> rosrel::error::Result<Config> {
    build_config_loader(global)?.build()
}

// CLI module - command-line argument parsing and handlers
//
// Running without a subcommand starts the dashboard. The config subcommand
// manages the config file:
// - config --path: Show the config file path
// - config --show: Display effective configuration
// - config --init: Write the commented template

use crate::config::{Config, VERSION};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Terminal dashboard of command-driven panes
#[derive(Parser, Debug)]
#[command(name = "paneboard")]
#[command(version = VERSION)]
#[command(about = "Terminal dashboard of command-driven panes", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/paneboard/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run the built-in demo dashboard
    #[arg(long)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Write the default config template
        #[arg(long)]
        init: bool,
    },
}

/// Handle CLI subcommands. Returns true if one was handled (exit after).
pub fn handle_cli(cli: &Cli) -> Result<bool> {
    let Some(Commands::Config { path, show, init }) = &cli.command else {
        return Ok(false);
    };

    if *path {
        handle_config_path(cli)?;
    } else if *show {
        handle_config_show(cli)?;
    } else if *init {
        handle_config_init(cli)?;
    } else {
        println!("Usage: paneboard config [--path|--show|--init]");
        println!();
        println!("Options:");
        println!("  --path    Show config file path");
        println!("  --show    Display effective configuration");
        println!("  --init    Write the default config template");
    }
    Ok(true)
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    Config::resolve_path(cli.config.clone()).context("Could not determine config path")
}

fn handle_config_path(cli: &Cli) -> Result<()> {
    println!("{}", config_path(cli)?.display());
    Ok(())
}

fn handle_config_show(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.clone(), cli.demo)?;

    println!("# Effective configuration (flags > env > file > defaults)");
    match &config.source {
        Some(path) => println!("# Source: {}", path.display()),
        None => println!("# Source: defaults (no config file)"),
    }
    println!();
    print!("{}", config.to_toml());
    Ok(())
}

fn handle_config_init(cli: &Cli) -> Result<()> {
    let path = config_path(cli)?;
    Config::write_template(&path)?;
    println!("Config template written to {}", path.display());
    Ok(())
}

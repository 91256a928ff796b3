//! CLI module for papertrade
//!
//! Argument parsing and the command pattern for the trading simulator:
//! each subcommand pairs a clap `Args` struct with a command struct whose
//! `execute` does the work against the shared configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::config::AppConfig;
use crate::logging::{init_logging, LogMode, LoggingConfig};

use commands::demo::{DemoArgs, DemoCommand};
use commands::quote::{QuoteArgs, QuoteCommand};
use commands::rpc::{RpcArgs, RpcCommand};

#[derive(Parser)]
#[command(name = "papertrade")]
#[command(version)]
#[command(about = "Virtual stock trading simulator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for per-session log files (console-only when omitted)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a single quote from the configured quote source
    Quote(QuoteArgs),

    /// Execute a purchase and immediately value the resulting trade
    Demo(DemoArgs),

    /// Serve line-delimited JSON requests over stdin/stdout
    Rpc(RpcArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let (mode, log_dir) = match &self.log_dir {
            Some(dir) => (LogMode::ConsoleAndFile, dir.clone()),
            None => (LogMode::Console, PathBuf::from("logs")),
        };
        init_logging(LoggingConfig::new(mode, log_dir), self.verbose > 0)?;

        let config = AppConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Quote(args) => QuoteCommand::new(args).execute(&config).await,
            Commands::Demo(args) => DemoCommand::new(args).execute(&config).await,
            Commands::Rpc(args) => RpcCommand::new(args).execute(&config).await,
        }
    }
}

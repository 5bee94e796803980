//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: scan sources and write every locale's catalog
//! - `manifest`: print the per-segment client namespace manifest
//! - `init`: write a default `.intlrc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::FormatKind;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn common(&self) -> Option<&CommonArgs> {
        match &self.command {
            Some(Command::Extract(cmd)) => Some(&cmd.common),
            Some(Command::Manifest(cmd)) => Some(&cmd.common),
            Some(Command::Init(cmd)) => Some(&cmd.common),
            None => None,
        }
    }

    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|c| c.verbose)
    }
}

/// Arguments shared by all commands. Values given here override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root (default: current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Messages directory (overrides config file)
    #[arg(long)]
    pub messages_path: Option<String>,

    /// Source locale (overrides config file)
    #[arg(long)]
    pub source_locale: Option<String>,

    /// Catalog format (overrides config file)
    #[arg(long, value_enum)]
    pub format: Option<FormatKind>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Append the source message as a fallback argument when rewriting
    #[arg(long)]
    pub development: bool,
}

#[derive(Debug, Args)]
pub struct ManifestCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// App directory to analyze; can be given multiple times (overrides config file)
    #[arg(long = "app-dir")]
    pub app_dirs: Vec<String>,

    /// Write the manifest to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InitCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract messages from source files into per-locale catalogs
    Extract(ExtractCommand),
    /// Print the namespaces each route segment needs on the client
    Manifest(ManifestCommand),
    /// Initialize a new .intlrc.json configuration file
    Init(InitCommand),
}

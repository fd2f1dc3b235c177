use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::generate;

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "child_pipeline.yml";

#[derive(Debug, Parser)]
#[command(name = "pkgs-importer", version)]
#[command(
    about = "A tool to generate a configuration for engines that will import packages between two registries",
    long_about = "This tool reads a configuration file that describes imports. An import is a one way road \
between two package registries: the configuration holds the credentials for each registry and the \
packages to copy.

From this, the tool writes a CI child pipeline configuration that carries out the copy.

Supported package types:
- npm
- maven
- nuget
- pypi"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Pipeline configuration file path
    #[arg(
        short,
        long = "pipeline_config",
        global = true,
        default_value = DEFAULT_PIPELINE_CONFIG_PATH
    )]
    pub pipeline_config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generates the pipeline config file
    Generate(generate::Args),
}

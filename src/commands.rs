use crate::cli::{Cli, Command};

pub mod generate;

pub fn dispatch(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Generate(args) => generate::run(args, &cli.config, &cli.pipeline_config),
    }
}

use crate::config::Configuration;
use crate::error::ImporterError;
use crate::generator::Generator;
use crate::output;
use crate::packages::PackageSource;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Parser)]
#[command(
    long_about = "Generates the pipeline config file.\n\n\
Use the --pipeline_config flag to specify a file, otherwise \"child_pipeline.yml\" is used."
)]
pub struct Args {}

pub fn run(_args: Args, config_path: &Path, pipeline_config_path: &Path) -> Result<(), String> {
    output::info("Loading Config");
    let configuration = Configuration::load(config_path)
        .map_err(|e| report("Error while loading the config:", e))?;

    let file = File::create(pipeline_config_path)
        .map_err(|e| report("Error while opening the output file:", e.into()))?;
    output::info(&format!(
        "Writing pipeline config file {:?}",
        pipeline_config_path.display()
    ));

    let packages = PackageSource::from_config(&configuration);
    let mut writer = BufWriter::new(file);
    Generator::new(&configuration, &packages)
        .generate(&mut writer)
        .map_err(|e| report("Error while generating the engine config:", e))?;

    output::success("Pipeline config generated!");
    Ok(())
}

fn report(context: &str, err: ImporterError) -> String {
    output::format_error(context, &format!("[{}] {}", err.category().as_str(), err))
}

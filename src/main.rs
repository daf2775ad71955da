use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use env_logger::Env;
use log::debug;

use image_analysis_rs::{Config, Workflow};

fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Errors are reported, not turned into a failing exit status.
    if let Err(err) = run() {
        println!("{err:#}");
    }
}

fn run() -> Result<()> {
    let config = Config::parse();
    debug!("image {} against {}", config.image_file.display(), config.endpoint);

    let workflow = Workflow::from_config(config).context("Failed to create vision clients")?;
    let summary = workflow.run()?;

    debug!(
        "annotated {} image(s), segmentation status {}",
        summary.annotated.len(),
        summary.segmentation_status
    );
    Ok(())
}

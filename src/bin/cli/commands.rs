//! Command execution.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use nomen_rs::core::pipeline::NomenPipeline;
use nomen_rs::core::source::FsSourceReader;
use nomen_rs::expansion::ExpanderRegistry;
use nomen_rs::io::JsonFileSink;
use nomen_rs::mining::MinerRegistry;
use nomen_rs::splitting::SplitterRegistry;
use nomen_rs::{AnalysisReport, NomenConfig};

use super::args::{AnalyzeArgs, ValidateConfigArgs};

/// Load a configuration file, or the defaults when none is given.
pub fn load_configuration(path: Option<&Path>) -> anyhow::Result<NomenConfig> {
    match path {
        Some(path) => NomenConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(NomenConfig::default()),
    }
}

pub async fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    let mut config = load_configuration(args.config.as_deref())?;
    if let Some(project) = args.project {
        config.project = project;
    }
    if config.project.is_empty() {
        config.project = args
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.root.display().to_string());
    }
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }

    let pipeline = NomenPipeline::new(config)?;
    let reader = FsSourceReader::new(&args.root);
    let run = pipeline.start(&reader).await?;

    let report = match &args.out {
        Some(dir) => {
            let sink = JsonFileSink::new(dir);
            run.persist(&sink).await?
        }
        None => run.collect().await?,
    };

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    info!("Run {} started at {}", report.run_id, report.started_at);
    println!(
        "{}: {} identifiers from {} of {} files",
        report.project,
        report.identifiers.len(),
        report.stats.files_parsed,
        report.stats.files_read
    );
    for file in &report.stats.failed_files {
        println!("  skipped {file}");
    }
    println!();
    println!("{:<40} {:>8} {:>8} {:>8}", "package", "idents", "exported", "rate");
    for insight in report.insights.iter().chain(std::iter::once(&report.overall)) {
        println!(
            "{:<40} {:>8} {:>8} {:>8.3}",
            insight.package,
            insight.total_identifiers,
            insight.total_exported,
            insight.rate()
        );
    }
}

pub fn print_default_config() -> anyhow::Result<()> {
    println!("# Default nomen configuration");
    println!("# Usage: nomen analyze --config your-config.yml <root>");
    println!();
    print!("{}", serde_yaml::to_string(&NomenConfig::default())?);
    Ok(())
}

pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    let config = load_configuration(Some(&args.config))?;
    NomenPipeline::new(config)
        .with_context(|| format!("Invalid configuration: {}", args.config.display()))?;
    println!("{} is valid", args.config.display());
    Ok(())
}

pub fn list_algorithms() -> anyhow::Result<()> {
    let miners = MinerRegistry::default();
    let splitters = SplitterRegistry::default();
    let expanders = ExpanderRegistry::default();

    println!("miners:");
    for name in miners.names() {
        println!("  {name}");
    }
    println!("splitters:");
    for name in splitters.names() {
        let requires = splitters.requires(name)?;
        if requires.is_empty() {
            println!("  {name}");
        } else {
            println!("  {name} (needs {})", requires.join(", "));
        }
    }
    println!("expanders:");
    for name in expanders.names() {
        let requires = expanders.requires(name)?;
        let on = expanders.applicable_on(name)?;
        if requires.is_empty() {
            println!("  {name} on {on}");
        } else {
            println!("  {name} on {on} (needs {})", requires.join(", "));
        }
    }
    Ok(())
}

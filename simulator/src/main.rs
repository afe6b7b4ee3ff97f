use anyhow::Context;
use clap::Parser;
use fkcore::{CenterMode, FrequencyBand, RecordSet};
use generator::profile::build_record_set;
use gui_bridge::bridge::GuiBridge;
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{parse_band, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "FK beamforming workflow driver")]
struct Args {
    /// Load FK and scenario parameters from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Station records as a JSON array; a synthetic plane wave is used otherwise
    #[arg(long)]
    records: Option<PathBuf>,
    /// Where to write the JSON band results
    #[arg(long, default_value = "tools/data/fk_results.json")]
    output: PathBuf,
    /// Maximum slowness in s/deg
    #[arg(long, default_value_t = 10.0)]
    max_slowness: f64,
    /// Grid points per axis, or radial,backazimuth for polar grids
    #[arg(long, value_delimiter = ',', default_values_t = vec![41])]
    resolution: Vec<usize>,
    /// Frequency band as low,high in Hz (repeatable)
    #[arg(long = "band", value_parser = parse_band)]
    bands: Vec<FrequencyBand>,
    #[arg(long, default_value_t = false)]
    polar: bool,
    /// coarray, full, center, or lat,lon
    #[arg(long, default_value = "coarray")]
    center: CenterMode,
    /// Keep the HTTP bridge alive for incoming scenario requests
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        let bands = if args.bands.is_empty() {
            vec![FrequencyBand::new(0.08, 0.12)]
        } else {
            args.bands.clone()
        };
        WorkflowConfig::from_args(
            args.max_slowness,
            &args.resolution,
            &bands,
            args.polar,
            args.center,
        )?
    };

    let records = match args.records.as_ref() {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading records {}", path.display()))?;
            RecordSet::from_json(&contents)
                .with_context(|| format!("parsing records {}", path.display()))?
        }
        None => build_record_set(&workflow_config.scenario)?,
    };

    let runner = Runner::new(workflow_config.clone());
    let gui_bridge = if args.serve {
        GuiBridge::serve(Arc::new(runner.clone()))
    } else {
        GuiBridge::detached()
    };

    let result = runner.execute(records)?;
    for summary in &result.summaries {
        match (&summary.peak, &summary.warning) {
            (Some(peak), _) => println!(
                "band {:?} Hz -> peak {:.2} s/deg from {:.1} deg at {:.4} Hz ({} bins, {:.2} dB)",
                summary.band,
                peak.slowness_deg,
                peak.backazimuth_deg,
                peak.frequency_hz,
                summary.frequency_count,
                summary.normalization_db
            ),
            (None, Some(warning)) => println!("band {:?} Hz -> {}", summary.band, warning),
            (None, None) => println!("band {:?} Hz -> no peak", summary.band),
        }
    }

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let report = serde_json::to_string_pretty(&result.bands).context("serializing band results")?;
    fs::write(&args.output, report)
        .with_context(|| format!("writing results {}", args.output.display()))?;
    info!("results written to {}", args.output.display());

    gui_bridge.publish(result, workflow_config.scenario.scenario.clone())?;

    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

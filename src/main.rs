//! Graph Features entrypoint: one resumable pass over the configured corpus.
//! Ctrl+C stops scheduling new files; rows already written stay on disk for the next run.

use graph_features::{config::PipelineConfig, logging::StructuredLogger, pipeline::Pipeline};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("GRAPH_FEATURES_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = PipelineConfig::load(&config_path);

    StructuredLogger::init(&config.log)?;
    info!(
        malicious = %config.corpus.malicious_dir.display(),
        benign = %config.corpus.benign_dir.display(),
        output = %config.output.features_csv.display(),
        "graph feature extraction starting"
    );

    let pipeline = Pipeline::new(config);
    let stop = pipeline.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        stop.store(true, Ordering::Relaxed);
    }) {
        warn!(error = %e, "interrupt handler not installed");
    }

    let summary = pipeline.run()?;
    StructuredLogger::emit_json(&summary, &mut std::io::stdout());
    if summary.cancelled > 0 {
        info!(pending = summary.cancelled, "stopped early; rerun to resume");
    }
    Ok(())
}

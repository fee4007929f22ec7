pub mod advisory;
pub mod config;
pub mod models;
pub mod pipeline;

pub use models::{Interaction, InteractionSeverity, Medication, PrescriptionRecord, TierSource};
pub use pipeline::processor::{
    build_analyzer, AnalysisError, AnalysisInput, AnalysisOutcome, PrescriptionAnalyzer,
};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Logs go to stderr so stdout
/// stays free for results. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}

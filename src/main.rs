//! Test telemetry exporter - Main entry point.
//!
//! Runs the report-to-telemetry pipeline once and exits.

use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use test_telemetry_lib::config::Config;
use test_telemetry_lib::services::dispatch::HttpSink;
use test_telemetry_lib::services::pipeline::{PipelineStatus, run_pipeline};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging; the verbose toggle raises the default level
    let default_level = if std::env::var("TTE_VERBOSE_LOG").is_ok_and(|v| v == "1") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - TTE_LICENSE_KEY and TTE_REPORT_FILE must be set");
            error!("  - TTE_TELEMETRY_KIND, if set, must be 'metrics' or 'logs'");
            std::process::exit(1);
        }
    };

    info!(
        "Exporting {} from {}",
        config.telemetry_kind,
        config.report_file.display()
    );

    let sink = HttpSink::new(
        config.endpoint_url.clone(),
        config.license_key.clone(),
        config.request_timeout,
    );

    match run_pipeline(&config, &sink).await {
        PipelineStatus::Completed {
            records,
            batches,
            failed_deliveries,
        } => {
            if failed_deliveries > 0 {
                warn!(
                    "Run complete: {} record(s) in {} batch(es), {} batch(es) failed to deliver",
                    records, batches, failed_deliveries
                );
            } else {
                info!(
                    "Run complete: {} record(s) delivered in {} batch(es)",
                    records, batches
                );
            }
        }
        PipelineStatus::Aborted { reason } => {
            warn!(
                "{}\nExiting with exit code {} as per the TTE_FAIL_PIPELINE variable.",
                reason, config.abort_exit_code
            );
            std::process::exit(config.abort_exit_code);
        }
    }
}

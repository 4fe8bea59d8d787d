use crate::config::ObservabilityConfig;
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// `RUST_LOG` overrides the configured level.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!("Testboard telemetry initialized");
    Ok(())
}

/// Generate an id linking every log line of one report build
pub fn generate_build_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one tree build
pub fn create_build_span(build_id: &str, row_count: usize) -> tracing::Span {
    tracing::info_span!(
        "report_build",
        build.id = build_id,
        build.rows = row_count,
        otel.kind = "internal"
    )
}

/// Span wrapping one chart reconciliation
pub fn create_chart_span(case_name: &str, series: usize) -> tracing::Span {
    tracing::info_span!(
        "chart_reconcile",
        case.name = case_name,
        chart.series = series,
        otel.kind = "internal"
    )
}

use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Testboard
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestboardConfig {
    /// Report building and charting
    pub report: ReportConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Result store settings (optional)
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Properties charted when the caller selects none
    pub default_properties: Vec<String>,
    /// Upper bound on selected (property, server) pairs per chart
    pub max_series: usize,
    /// Name of the placeholder file shown for an empty run
    pub no_results_label: String,
    /// Floor for the suggested y-axis maximum
    pub min_chart_ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level, used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
}

impl Default for TestboardConfig {
    fn default() -> Self {
        Self {
            report: ReportConfig {
                default_properties: vec!["avg_fps".to_string()],
                max_series: 12,
                no_results_label: "No results found".to_string(),
                min_chart_ceiling: 60.0,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            database: None,
        }
    }
}

impl TestboardConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (testboard.toml, .testboard-rc)
    /// 3. Environment variables (`TESTBOARD__REPORT__MAX_SERIES` and so on)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`TestboardConfig::load`], looking for the files in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let toml_file = dir.join("testboard.toml");
        if toml_file.exists() {
            builder = builder.add_source(File::new(&toml_file.to_string_lossy(), FileFormat::Toml));
        }

        let rc_file = dir.join(".testboard-rc");
        if rc_file.exists() {
            builder = builder.add_source(File::new(&rc_file.to_string_lossy(), FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("TESTBOARD")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("report.default_properties")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<TestboardConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = TestboardConfig::load_env_file();
        TestboardConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TestboardConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

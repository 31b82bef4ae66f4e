use std::{env, sync::Arc};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static SUBSCRIBER_INSTALLED: OnceCell<()> = OnceCell::new();
static METRICS_HANDLE: OnceCell<Arc<PrometheusHandle>> = OnceCell::new();

const DEFAULT_LOG_FILTER: &str = "info";

/// Shared observability options for binaries.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    log_filter: String,
}

impl TelemetryConfig {
    /// Loads telemetry knobs from optional environment variables prefixed with
    /// `<PREFIX>_`, e.g. `API_LOG_FILTER`. Missing entries fall back to
    /// defaults so the binary boots without extra configuration.
    pub fn from_env(prefix: &str) -> Self {
        let upper = prefix.trim().to_ascii_uppercase();
        let log_key = format!("{}_LOG_FILTER", upper);

        let log_filter = env::var(log_key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self { log_filter }
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// True when any directive enables `debug` or `trace` output.
    pub fn is_verbose(&self) -> bool {
        self.log_filter.split(',').any(|directive| {
            let level = directive.rsplit('=').next().unwrap_or_default().trim();
            level.eq_ignore_ascii_case("debug") || level.eq_ignore_ascii_case("trace")
        })
    }
}

/// Guard returned after telemetry initialization.
#[derive(Clone)]
pub struct TelemetryGuard {
    metrics: Arc<PrometheusHandle>,
}

impl TelemetryGuard {
    pub fn render_metrics(&self) -> String {
        self.metrics.render()
    }
}

/// Centralized helper to wire up tracing + the metrics recorder once per
/// process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    install_tracing(config)?;
    let metrics = install_metrics()?;

    Ok(TelemetryGuard { metrics })
}

fn install_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if SUBSCRIBER_INSTALLED.get().is_some() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_new(config.log_filter())
        .map_err(|err| TelemetryError::InvalidLogFilter(err.to_string()))?;

    if SUBSCRIBER_INSTALLED.set(()).is_ok() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .map_err(|err| TelemetryError::Tracing(err.to_string()))?;
    }

    Ok(())
}

fn install_metrics() -> Result<Arc<PrometheusHandle>, TelemetryError> {
    METRICS_HANDLE
        .get_or_try_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map(Arc::new)
                .map_err(|err| TelemetryError::Metrics(err.to_string()))
        })
        .cloned()
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Tracing(String),
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::ENV_GUARD;

    #[test]
    fn telemetry_config_uses_defaults() {
        let _guard = ENV_GUARD.lock().unwrap();
        env::set_var("SHIPPING_SKIP_DOTENV", "1");
        env::remove_var("API_LOG_FILTER");

        let cfg = TelemetryConfig::from_env("api");
        assert_eq!(cfg.log_filter(), "info");
        assert!(!cfg.is_verbose());
    }

    #[test]
    fn telemetry_config_reads_env() {
        let _guard = ENV_GUARD.lock().unwrap();
        env::set_var("SHIPPING_SKIP_DOTENV", "1");
        env::set_var("API_LOG_FILTER", "debug,sea_orm=warn");
        let cfg = TelemetryConfig::from_env("API");
        assert_eq!(cfg.log_filter(), "debug,sea_orm=warn");
        assert!(cfg.is_verbose());
        env::remove_var("API_LOG_FILTER");
    }

    #[test]
    fn blank_log_filter_falls_back_to_default() {
        let _guard = ENV_GUARD.lock().unwrap();
        env::set_var("SHIPPING_SKIP_DOTENV", "1");
        env::set_var("API_LOG_FILTER", "  ");
        let cfg = TelemetryConfig::from_env("API");
        assert_eq!(cfg.log_filter(), "info");
        env::remove_var("API_LOG_FILTER");
    }

    #[test]
    fn verbosity_follows_directive_levels() {
        let _guard = ENV_GUARD.lock().unwrap();
        env::set_var("SHIPPING_SKIP_DOTENV", "1");
        env::set_var("API_LOG_FILTER", "warn,sea_orm=TRACE");
        assert!(TelemetryConfig::from_env("API").is_verbose());
        env::set_var("API_LOG_FILTER", "warn,actix_web=info");
        assert!(!TelemetryConfig::from_env("API").is_verbose());
        env::remove_var("API_LOG_FILTER");
    }
}

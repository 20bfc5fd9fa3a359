use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "framewright_engine=debug,wgpu_core=warn").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// wgpu is chatty at `info`; keep it at `warn` unless the filter names it.
const QUIET_GPU_FILTER: &str = "wgpu_core=warn,wgpu_hal=warn,naga=warn";

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Precedence: explicit `env_filter`, then `RUST_LOG`, then `info`.
/// Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(log::LevelFilter::Info);
        builder.parse_filters(QUIET_GPU_FILTER);

        if let Some(filter) = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();

        // `try_init` so a test harness logger installed earlier does not panic us.
        if builder.try_init().is_err() {
            log::debug!("a global logger was already installed; keeping it");
            return;
        }

        log::debug!("logging initialized");
    });
}

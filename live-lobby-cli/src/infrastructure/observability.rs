use crate::infrastructure::error::{CliError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

const LOBBY_CRATES: [&str; 5] = [
    "live_lobby",
    "live_lobby_cli",
    "live_lobby_client",
    "live_lobby_core",
    "live_lobby_server",
];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    pub json_format: bool,
    pub chrome_trace: bool,
    pub show_thread_ids: bool,
    pub show_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::INFO,
            json_format: false,
            chrome_trace: false,
            show_thread_ids: false,
            show_targets: true,
        }
    }
}

/// Keeps trace output flushing until dropped
#[must_use = "dropping the guard stops trace output"]
pub struct LogGuard {
    #[cfg(feature = "chrome-trace")]
    _chrome: Option<tracing_chrome::FlushGuard>,
}

impl LogConfig {
    /// Development configuration (verbose, human-readable)
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// Everything, including per-message detail
    pub fn verbose() -> Self {
        Self {
            default_level: tracing::Level::TRACE,
            ..Self::dev()
        }
    }

    /// Newline-delimited JSON records
    pub fn with_json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable Chrome tracing (needs the `chrome-trace` feature)
    pub fn with_chrome_trace(mut self) -> Self {
        self.chrome_trace = true;
        self
    }

    /// Filter used when `RUST_LOG` is unset
    pub fn default_directives(&self) -> String {
        LOBBY_CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, self.default_level))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn init(self) -> Result<LogGuard> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directives()));

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        if self.json_format {
            layers.push(
                fmt::layer()
                    .json()
                    .with_target(self.show_targets)
                    .with_thread_ids(self.show_thread_ids)
                    .with_writer(std::io::stderr)
                    .boxed(),
            );
        } else {
            layers.push(
                fmt::layer()
                    .with_target(self.show_targets)
                    .with_thread_ids(self.show_thread_ids)
                    .with_writer(std::io::stderr)
                    .boxed(),
            );
        }

        #[cfg(feature = "chrome-trace")]
        let chrome_guard = if self.chrome_trace {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
            layers.push(chrome_layer.boxed());
            eprintln!("📊 Chrome trace enabled, view at https://ui.perfetto.dev/");
            Some(guard)
        } else {
            None
        };

        #[cfg(not(feature = "chrome-trace"))]
        if self.chrome_trace {
            eprintln!("Chrome trace requested but the chrome-trace feature is disabled");
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|e| CliError::Logging(e.to_string()))?;

        Ok(LogGuard {
            #[cfg(feature = "chrome-trace")]
            _chrome: chrome_guard,
        })
    }
}

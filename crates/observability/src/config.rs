//! Environment-driven observability settings.

/// Output format for log lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Log filter and format for the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive, e.g. `info` or `stockroute_allocation=debug`.
    pub filter: String,
    pub format: LogFormat,
    /// A `STOCKROUTE_LOG_FORMAT` value that was not understood (JSON used instead).
    pub rejected_format: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
            rejected_format: None,
        }
    }
}

impl ObservabilityConfig {
    /// Read `RUST_LOG` and `STOCKROUTE_LOG_FORMAT` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(filter) = lookup("RUST_LOG").filter(|v| !v.trim().is_empty()) {
            config.filter = filter;
        }

        if let Some(raw) = lookup("STOCKROUTE_LOG_FORMAT") {
            match LogFormat::parse(&raw) {
                Some(format) => config.format = format,
                None => config.rejected_format = Some(raw),
            }
        }

        config
    }
}

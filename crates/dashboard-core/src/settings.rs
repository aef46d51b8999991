use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Browse case-level assistance payments by county and year
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ra-dashboard",
    about = "Browse case-level assistance payments by county and year",
    version
)]
pub struct Settings {
    /// RA dataset (CSV) to load
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Legacy GDP dataset (CSV) to pivot and summarize
    #[arg(long)]
    pub gdp_file: Option<PathBuf>,

    /// First year of the window (defaults to the earliest year in the data)
    #[arg(long)]
    pub from_year: Option<i32>,

    /// Last year of the window (defaults to the latest year in the data)
    #[arg(long)]
    pub to_year: Option<i32>,

    /// County to include; repeat for several (defaults to every county)
    #[arg(long = "county")]
    pub counties: Vec<String>,

    /// Seconds before a loaded dataset is considered stale (0 = never)
    #[arg(long, default_value = "0")]
    pub cache_ttl: u64,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(
        long,
        default_value = "INFO",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"]
    )]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Cache staleness horizon; `None` when `--cache-ttl` is 0.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl > 0).then(|| Duration::from_secs(self.cache_ttl))
    }
}

// ── Settings loading ───────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments.
    ///
    /// Nothing is read from or written to disk: every run starts from the
    /// command line alone, so omitted filters fall back to the full dataset.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::apply_debug(Settings::parse_from(args))
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

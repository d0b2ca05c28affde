#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args manually to keep the binary lean. Every option can also be set
//! through a `GEOGUIDE_*` environment variable; flags win over the
//! environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
geoguide: Geothermal Basics, a terminal guide to heating and cooling energy

USAGE:
    geoguide [OPTIONS]

OPTIONS:
    --reference-offset=N    Rows below the top edge that decide the active section (default: 4)
    --sidebar-breakpoint=N  Minimum columns for the docked contents sidebar (default: 100)
    --tick-ms=N             Animation tick interval in milliseconds (default: 16)
    --section=ID            Open the guide at section ID
    --no-mouse              Disable mouse event capture
    --log-file=PATH         Write logs to PATH (logging is off otherwise)
    --log-json              Write logs as JSON lines
    --help, -h              Show this help message
    --version, -V           Show version

KEYBINDINGS:
    Up/Down, PgUp/PgDn      Scroll
    Home / End              Jump to top / bottom
    [ / ]                   Previous / next section
    Tab / Shift-Tab         Focus next / previous card or map marker
    Enter / Space           Open the focused card or city
    t                       Show or hide the contents panel
    m                       Toggle mouse capture (to select text)
    Esc                     Close the open overlay
    q / Ctrl+C              Quit

ENVIRONMENT VARIABLES:
    GEOGUIDE_REFERENCE_OFFSET     Override --reference-offset
    GEOGUIDE_SIDEBAR_BREAKPOINT   Override --sidebar-breakpoint
    GEOGUIDE_TICK_MS              Override --tick-ms
    GEOGUIDE_SECTION              Override --section
    GEOGUIDE_LOG_FILE             Override --log-file
    GEOGUIDE_LOG_FILTER           Log filter directives (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Reference offset in rows, shared by the tracker and navigation.
    pub reference_offset: u32,
    /// Minimum terminal width for the docked sidebar.
    pub sidebar_breakpoint: u16,
    /// Tick interval in milliseconds.
    pub tick_ms: u64,
    /// Section to open at.
    pub section: Option<String>,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// Log destination; `None` disables logging.
    pub log_file: Option<PathBuf>,
    /// `tracing-subscriber` filter directives.
    pub log_filter: String,
    /// JSON lines instead of plain text.
    pub log_json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            reference_offset: 4,
            sidebar_breakpoint: 100,
            tick_ms: 16,
            section: None,
            mouse: true,
            log_file: None,
            log_filter: "info".into(),
            log_json: false,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Opts),
    Help,
    Version,
}

/// A malformed flag or environment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// `source` (a flag or variable name) held an unparsable number.
    InvalidNumber { source: String, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber { source, value } => {
                write!(f, "invalid value for {source}: {value:?}")
            }
            Self::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked to; prints the error and
    /// exits with status 1 on bad input.
    pub fn parse() -> Self {
        match Self::from_sources(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Invocation::Run(opts)) => opts,
            Ok(Invocation::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Invocation::Version) => {
                println!("geoguide {VERSION}");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Try --help for usage.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `var` looking up environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] for unparsable numbers or unknown arguments.
    pub fn from_sources<I, S, F>(args: I, var: F) -> Result<Invocation, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = var("GEOGUIDE_REFERENCE_OFFSET") {
            opts.reference_offset = number("GEOGUIDE_REFERENCE_OFFSET", &val)?;
        }
        if let Some(val) = var("GEOGUIDE_SIDEBAR_BREAKPOINT") {
            opts.sidebar_breakpoint = number("GEOGUIDE_SIDEBAR_BREAKPOINT", &val)?;
        }
        if let Some(val) = var("GEOGUIDE_TICK_MS") {
            opts.tick_ms = number("GEOGUIDE_TICK_MS", &val)?;
        }
        if let Some(val) = var("GEOGUIDE_SECTION")
            && !val.is_empty()
        {
            opts.section = Some(val);
        }
        if let Some(val) = var("GEOGUIDE_LOG_FILE")
            && !val.is_empty()
        {
            opts.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = var("GEOGUIDE_LOG_FILTER") {
            opts.log_filter = val;
        }

        // Command-line args override env vars
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Invocation::Help),
                "--version" | "-V" => return Ok(Invocation::Version),
                "--no-mouse" => opts.mouse = false,
                "--log-json" => opts.log_json = true,
                other => {
                    if let Some(val) = other.strip_prefix("--reference-offset=") {
                        opts.reference_offset = number("--reference-offset", val)?;
                    } else if let Some(val) = other.strip_prefix("--sidebar-breakpoint=") {
                        opts.sidebar_breakpoint = number("--sidebar-breakpoint", val)?;
                    } else if let Some(val) = other.strip_prefix("--tick-ms=") {
                        opts.tick_ms = number("--tick-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--section=") {
                        opts.section = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }
        opts.tick_ms = opts.tick_ms.max(1);
        Ok(Invocation::Run(opts))
    }
}

fn number<T: std::str::FromStr>(source: &str, value: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::InvalidNumber {
        source: source.to_string(),
        value: value.to_string(),
    })
}

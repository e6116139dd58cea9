#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args by hand. Environment variables with the `TAGFLOW_DEMO_*`
//! prefix (and `TAGFLOW_LOG`) override defaults; flags override both.

use std::env;
use std::path::PathBuf;
use std::process;

use tagflow_labels::{DEFAULT_MAX_OVERFLOW, DEFAULT_MAX_VISIBLE, Thresholds};

use crate::logging::DEFAULT_FILTER;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
tagflow demo: overflow tag filter over a pipeline run's labels

USAGE:
    tagflow-demo [OPTIONS]

OPTIONS:
    --labels=FILE           JSON object of label key/value strings
    --namespace=NS          Namespace used for tag link targets
    --max-visible=N         Tags shown inline (default: 2)
    --max-overflow=N        Tags shown in the overflow popover (default: 5)
    --no-mouse              Disable mouse event capture
    --keep-overflow-open    Keep the popover open after a tag is clicked
    --reset-search          Clear the search query when the modal closes
    --log-file=PATH         Log destination (default: tagflow-demo.log)
    --log-filter=DIRECTIVE  Log filter, e.g. 'tagflow_widgets=debug'
    --exit-after-ms=N       Quit after N milliseconds (for testing)
    --help, -h              Show this help message
    --version, -V           Show version

KEYBINDINGS:
    Tab                     Switch focus between tags and the log
    Left / Right            Move along the tag row
    Up / Down               Move in the popover or modal; scroll the log
    Enter / Space           Activate the focused tag or button
    Esc                     Close the popover or modal
    PageUp / PageDown       Scroll the log
    m                       Maximize / restore the log
    q / Ctrl+C              Quit

ENVIRONMENT VARIABLES:
    TAGFLOW_DEMO_LABELS         Override --labels
    TAGFLOW_DEMO_NAMESPACE      Override --namespace
    TAGFLOW_DEMO_MAX_VISIBLE    Override --max-visible
    TAGFLOW_DEMO_MAX_OVERFLOW   Override --max-overflow
    TAGFLOW_DEMO_EXIT_AFTER_MS  Override --exit-after-ms
    TAGFLOW_LOG                 Override --log-filter";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub labels: Option<PathBuf>,
    pub namespace: Option<String>,
    pub thresholds: Thresholds,
    pub mouse: bool,
    pub keep_overflow_open: bool,
    pub reset_search: bool,
    pub log_file: PathBuf,
    pub log_filter: String,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            labels: None,
            namespace: None,
            thresholds: Thresholds::new(DEFAULT_MAX_VISIBLE, DEFAULT_MAX_OVERFLOW),
            mouse: true,
            keep_overflow_open: false,
            reset_search: false,
            log_file: PathBuf::from("tagflow-demo.log"),
            log_filter: DEFAULT_FILTER.to_owned(),
            exit_after_ms: 0,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// Parse a signed count; negative values clamp to 0 later.
fn parse_count(flag: &str, val: &str) -> Result<i64, String> {
    val.trim()
        .parse()
        .map_err(|_| format!("Invalid {flag} value: {val}"))
}

impl Opts {
    /// Parse process arguments and environment, exiting on help, version,
    /// or bad input.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |name| env::var(name).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("tagflow-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` (without the program name) with `var` looking up
    /// environment variables.
    pub fn parse_from<I, F>(args: I, var: F) -> Result<Command, String>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();
        let mut max_visible = DEFAULT_MAX_VISIBLE as i64;
        let mut max_overflow = DEFAULT_MAX_OVERFLOW as i64;

        // Environment first; malformed numbers are ignored.
        if let Some(val) = var("TAGFLOW_DEMO_LABELS") {
            opts.labels = Some(PathBuf::from(val));
        }
        if let Some(val) = var("TAGFLOW_DEMO_NAMESPACE") {
            opts.namespace = Some(val);
        }
        if let Some(val) = var("TAGFLOW_DEMO_MAX_VISIBLE")
            && let Ok(n) = val.trim().parse()
        {
            max_visible = n;
        }
        if let Some(val) = var("TAGFLOW_DEMO_MAX_OVERFLOW")
            && let Ok(n) = val.trim().parse()
        {
            max_overflow = n;
        }
        if let Some(val) = var("TAGFLOW_DEMO_EXIT_AFTER_MS")
            && let Ok(n) = val.trim().parse()
        {
            opts.exit_after_ms = n;
        }
        if let Some(val) = var("TAGFLOW_LOG") {
            opts.log_filter = val;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--no-mouse" => opts.mouse = false,
                "--keep-overflow-open" => opts.keep_overflow_open = true,
                "--reset-search" => opts.reset_search = true,
                other => {
                    if let Some(val) = other.strip_prefix("--labels=") {
                        opts.labels = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--namespace=") {
                        opts.namespace = Some(val.to_owned());
                    } else if let Some(val) = other.strip_prefix("--max-visible=") {
                        max_visible = parse_count("--max-visible", val)?;
                    } else if let Some(val) = other.strip_prefix("--max-overflow=") {
                        max_overflow = parse_count("--max-overflow", val)?;
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = PathBuf::from(val);
                    } else if let Some(val) = other.strip_prefix("--log-filter=") {
                        opts.log_filter = val.to_owned();
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --exit-after-ms value: {val}"))?;
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        opts.thresholds = Thresholds::from_signed(max_visible, max_overflow);
        if opts.namespace.as_deref() == Some("") {
            opts.namespace = None;
        }
        Ok(Command::Run(opts))
    }
}

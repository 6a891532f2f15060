//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

/// TabSync - share a dashboard time window across tabs
#[derive(Parser)]
#[command(
    name = "tabsync",
    about = "Share a dashboard time window across open tabs",
    version,
    after_help = "Logs are written to: ~/.local/share/tabsync/logs/tabsync.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Override the shared store directory
    #[arg(short, long, global = true, help = "Override the shared store directory")]
    pub store_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Print the time window carried by a location
    Extract {
        /// Location to read
        url: Url,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Print a location with a time window applied
    Apply {
        /// Location to rewrite
        url: Url,

        /// Start of the window
        #[arg(long)]
        from: Option<String>,

        /// End of the window
        #[arg(long)]
        to: Option<String>,

        /// Live flag
        #[arg(long)]
        live: Option<String>,

        /// Refresh mode
        #[arg(long)]
        refresh_mode: Option<String>,
    },

    /// Broadcast a location's time window to every watching tab
    Publish {
        /// Location whose window is shared
        url: Url,
    },

    /// Show the envelope currently in the shared slot
    Show {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove the envelope from the shared slot
    Clear,

    /// Run a tab at a location until interrupted
    ///
    /// Reads commands from stdin: a location to move the tab, or `sync` to
    /// publish the tab's current window.
    Watch {
        /// Initial location of the tab
        url: Url,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(short, long, value_name = "SECS")]
        duration: Option<u64>,
    },
}

/// Output format for extract/show
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

//! TabSync - share a dashboard time window across tabs
//!
//! CLI entry point for inspecting locations and running tabs against the
//! shared file store.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use url::Url;

use tabsync::channel::{FileStore, SyncChannel};
use tabsync::cli::{Cli, Command, OutputFormat};
use tabsync::config::Config;
use tabsync::console::{ConsoleNavigator, ConsoleSurface};
use tabsync::controller::{ControllerHandle, PublishOutcome, SyncController};
use tabsync::window::{self, TimeWindow};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tabsync")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Setup tracing subscriber - write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("tabsync.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(store_dir) = cli.store_dir {
        config.channel.store_dir = store_dir;
    }

    info!(
        "TabSync loaded config: key={}, store-dir={}",
        config.channel.key,
        config.channel.store_dir.display()
    );

    match cli.command {
        Command::Extract { url, format } => cmd_extract(&url, format),
        Command::Apply {
            url,
            from,
            to,
            live,
            refresh_mode,
        } => cmd_apply(&url, TimeWindow::new(from, to, live, refresh_mode)),
        Command::Publish { url } => cmd_publish(&config, &url),
        Command::Show { format } => cmd_show(&config, format),
        Command::Clear => cmd_clear(&config),
        Command::Watch { url, duration } => cmd_watch(&config, url, duration.map(Duration::from_secs)).await,
    }
}

fn open_channel(config: &Config) -> Result<SyncChannel> {
    let store = FileStore::open(&config.channel.store_dir, config.channel.poll_interval())
        .context(format!("Failed to open store at {}", config.channel.store_dir.display()))?;
    Ok(SyncChannel::new(Arc::new(store.area()), config.channel.key.clone()))
}

/// Print the window a location carries
fn cmd_extract(url: &Url, format: OutputFormat) -> Result<()> {
    let window = window::extract(url);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&window)?),
        OutputFormat::Text => {
            if window.is_empty() {
                println!("(no time window)");
            } else {
                println!("{}", window);
            }
        }
    }
    Ok(())
}

/// Print a location with a window applied
fn cmd_apply(url: &Url, window: TimeWindow) -> Result<()> {
    println!("{}", window::apply(url, &window));
    Ok(())
}

/// Write a location's window into the shared slot
fn cmd_publish(config: &Config, url: &Url) -> Result<()> {
    let window = window::extract(url);
    if window.is_empty() {
        println!("{}", "No timestamp found in current URL to sync".yellow());
        return Ok(());
    }

    let channel = open_channel(config)?;
    let envelope = channel.publish(&window, url.as_str()).context("Failed to publish")?;
    println!("{} {}", "Published".green(), envelope.sync_id);
    Ok(())
}

/// Print the envelope currently in the slot
fn cmd_show(config: &Config, format: OutputFormat) -> Result<()> {
    let channel = open_channel(config)?;
    let latest = match channel.latest() {
        Ok(latest) => latest,
        Err(e) if e.is_malformed() => {
            println!("{} {}", "Slot holds an unreadable envelope:".yellow(), e);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to read shared slot"),
    };
    let Some(envelope) = latest else {
        println!("Slot is empty");
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&envelope)?),
        OutputFormat::Text => {
            println!("Sync ID:  {}", envelope.sync_id);
            println!("Window:   {}", envelope.window);
            println!("Origin:   {}", envelope.origin_tab_key);
            println!("Version:  {}", envelope.version);
        }
    }
    Ok(())
}

fn cmd_clear(config: &Config) -> Result<()> {
    let channel = open_channel(config)?;
    channel.clear().context("Failed to clear shared slot")?;
    println!("Slot cleared");
    Ok(())
}

/// Run one tab until Ctrl-C, or until `duration` has passed
async fn cmd_watch(config: &Config, url: Url, duration: Option<Duration>) -> Result<()> {
    let channel = open_channel(config)?;
    let handle = SyncController::new(
        config.timing.clone(),
        channel,
        Arc::new(ConsoleSurface),
        Arc::new(ConsoleNavigator),
        url.clone(),
    )
    .spawn();

    println!("Watching as {}", url.as_str().cyan());
    println!(
        "Type {} to publish, a location to move, {} for counters; Ctrl-C to stop",
        "sync".yellow(),
        "status".yellow()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let stop = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = &mut stop => break,
            line = lines.next_line(), if stdin_open => match line.context("Failed to read stdin")? {
                Some(line) => watch_command(&handle, line.trim()).await?,
                None => stdin_open = false,
            },
        }
    }

    let status = handle.status().await?;
    handle.shutdown().await?;
    println!();
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn watch_command(handle: &ControllerHandle, line: &str) -> Result<()> {
    match line {
        "" => {}
        "sync" => match handle.publish().await? {
            PublishOutcome::Published(envelope) => println!("{} {}", "Published".green(), envelope.sync_id),
            PublishOutcome::NothingToSync => {}
        },
        "status" => println!("{}", serde_json::to_string_pretty(&handle.status().await?)?),
        other => match Url::parse(other) {
            Ok(location) => {
                handle.set_location(location).await?;
                println!("Moved to {}", other);
            }
            Err(e) => println!("{} {}: {}", "?".yellow(), other, e),
        },
    }
    Ok(())
}

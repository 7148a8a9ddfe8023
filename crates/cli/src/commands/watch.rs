//! Live terminal dashboard
//!
//! Runs a refresh session and redraws on every published snapshot. Lines
//! read from stdin drive the session: `r` refresh, `l <LOC>` select a
//! location, `d` dismiss messages, `q` quit.

use anyhow::{Context, Result};
use monitor_lib::{DashboardSnapshot, SessionBuilder, SessionHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::render::render_snapshot;
use super::Settings;
use crate::output::{print_error, OutputFormat};

const DEFAULT_INTERVAL_SECS: u64 = 30;

const HELP: &str = "Commands: r refresh | l <LOCATION> select | d dismiss | q quit";

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchInput {
    Refresh,
    Select(String),
    Dismiss,
    Quit,
    Help,
    Unknown(String),
}

/// Parse one input line; blank lines yield `None`
pub fn parse_input(line: &str) -> Option<WatchInput> {
    let mut parts = line.split_whitespace();
    let command = parts.next()?;
    let argument = parts.next();

    let input = match (command, argument) {
        ("r" | "refresh", None) => WatchInput::Refresh,
        ("l" | "location", Some(location)) => WatchInput::Select(location.to_string()),
        ("d" | "dismiss", None) => WatchInput::Dismiss,
        ("q" | "quit", None) => WatchInput::Quit,
        ("h" | "help" | "?", None) => WatchInput::Help,
        _ => WatchInput::Unknown(line.trim().to_string()),
    };
    Some(input)
}

pub async fn watch(
    settings: &Settings,
    location: Option<String>,
    interval_secs: Option<u64>,
) -> Result<()> {
    let location = settings.config.resolve_location(location)?;
    let interval_secs = interval_secs
        .or(settings.config.refresh_interval_secs)
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    let session = SessionBuilder::new()
        .source(Arc::new(settings.source()))
        .locations(settings.config.locations())
        .initial_location(location)
        .refresh_interval(Duration::from_secs(interval_secs))
        .start()
        .context("Failed to start dashboard session")?;

    let handle = session.handle();
    let mut snapshots = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    draw(&snapshots.borrow_and_update(), settings.format)?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                draw(&snapshot, settings.format)?;
            }
            line = lines.next_line() => {
                match line? {
                    // end of input
                    None => break,
                    Some(line) => {
                        if !apply_input(&handle, parse_input(&line)).await {
                            break;
                        }
                    }
                }
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

/// Forward one input to the session; returns false when the user quits
async fn apply_input(handle: &SessionHandle, input: Option<WatchInput>) -> bool {
    let result = match input {
        None => Ok(()),
        Some(WatchInput::Quit) => return false,
        Some(WatchInput::Refresh) => handle.force_refresh().await,
        Some(WatchInput::Select(location)) => handle.select_location(&location).await,
        Some(WatchInput::Dismiss) => match handle.dismiss_error().await {
            Ok(()) => handle.dismiss_update_success().await,
            Err(e) => Err(e),
        },
        Some(WatchInput::Help) => {
            eprintln!("{}", HELP);
            Ok(())
        }
        Some(WatchInput::Unknown(line)) => {
            print_error(&format!("unrecognised command: {}", line));
            eprintln!("{}", HELP);
            Ok(())
        }
    };

    if let Err(e) = result {
        print_error(&e.to_string());
    }
    true
}

fn draw(snapshot: &DashboardSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(snapshot)?),
        OutputFormat::Table => {
            // clear screen, cursor home
            print!("\x1B[2J\x1B[H");
            render_snapshot(snapshot);
            println!();
            println!("{}", HELP);
        }
    }
    Ok(())
}

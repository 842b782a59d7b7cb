//! A log feed kept in a cell of the Monthly sheet while debug mode is on.
//!
//! Every message also goes to `tracing`, whether or not debug mode is on. Writing to the feed never
//! fails the caller: a problem with the feed is itself only traced.

use crate::api::CellStore;
use crate::debug::is_debug_enabled;
use crate::layout::{LOG_CELL, MONTHLY};
use crate::Result;
use chrono::Local;
use std::fmt::Display;
use tracing::{info, warn};

/// When the feed grows past this many lines it is cut back to `KEEP_LINES`.
const MAX_LINES: usize = 100;
const KEEP_LINES: usize = 50;

/// Logs `message`, and appends it with a timestamp to the feed cell when debug mode is on.
pub async fn log<H>(host: &mut H, message: impl AsRef<str>)
where
    H: CellStore + ?Sized,
{
    let message = message.as_ref();
    info!("{message}");
    if let Err(e) = append(host, message).await {
        warn!("Unable to write to the sheet log: {e:#}");
    }
}

/// Logs a failure together with what was being attempted.
pub async fn error<H, E>(host: &mut H, context: &str, err: E)
where
    H: CellStore + ?Sized,
    E: Display,
{
    let message = if context.is_empty() {
        format!("ERROR: {err:#}")
    } else {
        format!("{context}: {err:#}")
    };
    warn!("{message}");
    if let Err(e) = append(host, &message).await {
        warn!("Unable to write to the sheet log: {e:#}");
    }
}

/// Empties the feed cell.
pub async fn clear<H>(host: &mut H) -> Result<()>
where
    H: CellStore + ?Sized,
{
    host.set_value(MONTHLY, LOG_CELL, "").await
}

async fn append<H>(host: &mut H, message: &str) -> Result<()>
where
    H: CellStore + ?Sized,
{
    if !is_debug_enabled(host).await? {
        return Ok(());
    }
    let line = format!("[{}] {message}", Local::now().format("%H:%M:%S"));
    let current = host.value(MONTHLY, LOG_CELL).await?;
    host.set_value(MONTHLY, LOG_CELL, &append_line(&current, &line))
        .await
}

/// Adds `line` to the end of `feed`, cutting the feed back to its most recent lines when it gets
/// too long.
fn append_line(feed: &str, line: &str) -> String {
    let joined = if feed.is_empty() {
        line.to_string()
    } else {
        format!("{feed}\n{line}")
    };
    let lines: Vec<&str> = joined.split('\n').collect();
    if lines.len() > MAX_LINES {
        lines[lines.len() - KEEP_LINES..].join("\n")
    } else {
        joined
    }
}

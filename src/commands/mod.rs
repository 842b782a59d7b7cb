//! Command handlers for the budget CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod edit;
mod init;
mod inspect;
mod plan;
mod range;
mod recurring;
mod sheet;

use crate::api::MemoryWorkbook;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use edit::edit;
pub use init::init;
pub use inspect::{colors, intersects, SliceColor};
pub use plan::plan;
pub use range::{range_chart, range_reset, range_show, range_source, RangeSetting};
pub use recurring::{
    recurring_populate, recurring_preview, recurring_setup, recurring_summary,
    recurring_update_due,
};
pub use sheet::{debt_to_income, debug_mode, reset};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Backs up the workbook file and then overwrites it with `workbook`.
async fn commit(config: &Config, workbook: &MemoryWorkbook) -> Result<()> {
    let backup = config.backup().copy_workbook().await?;
    debug!("Backed up the workbook to {}", backup.display());
    config.save_workbook(workbook).await
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

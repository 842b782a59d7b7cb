//! Automation for a personal budgeting workbook.
//!
//! The pure core maps values onto a median-pivoted color gradient ([`model::compute_colors`]) and
//! decides whether A1 ranges overlap ([`model::intersects`]). Everything that touches a workbook
//! goes through the [`api::CellStore`] and [`api::ChartHost`] traits, so the same automation runs
//! against any host. [`api::MemoryWorkbook`] is the host the CLI uses.

pub mod api;
pub mod args;
pub mod backup;
pub mod charts;
pub mod commands;
mod config;
pub mod debug;
pub mod dispatch;
mod error;
pub mod layout;
pub mod model;
pub mod plans;
pub mod ranges;
pub mod recurring;
pub mod sheet_log;
mod utils;


pub use config::{Config, SchemeSetting};
pub use error::Error;
pub use error::Result;

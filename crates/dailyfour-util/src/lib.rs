//! Shared utilities for dailyfour
//!
//! This crate provides:
//! - Wall-clock access with mock time for development
//! - Record date/time text formats and duration display helpers
//! - Default paths for config, data, archive, and log directories

mod format;
mod paths;
mod time;

pub use format::*;
pub use paths::*;
pub use time::*;

//! Shared types for dailyfour
//!
//! This crate defines the data exchanged between the store, the engines,
//! and anything reading their state:
//! - The persisted session record and its validation rules
//! - The presence state published by the session engine
//! - The progress snapshot computed by the timer engine

mod progress;
mod record;
mod state;

pub use progress::*;
pub use record::*;
pub use state::*;

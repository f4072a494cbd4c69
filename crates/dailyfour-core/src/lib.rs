//! Session lifecycle and progress engines for dailyfour
//!
//! This crate contains:
//! - The session state machine (Idle <-> Active) driven by network observations
//! - Startup recovery of sessions left open by a previous process
//! - Progress evaluation against the daily target, with one-shot completion

mod engine;
mod events;
mod session;
mod timer;

pub use engine::*;
pub use events::*;
pub use session::*;
pub use timer::*;

//! Background loops of the dailyfourd service
//!
//! - Network poller: probes the connected network and drives the session engine
//! - Progress timer: evaluates the active session and sends the completion notification

mod tasks;

pub use tasks::*;

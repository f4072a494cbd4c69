//! Linux host adapter for dailyfour
//!
//! Provides:
//! - Wireless network name detection via `nmcli`, falling back to `iwgetid`
//! - Desktop notifications via `notify-send`
//! - Link/address/route change detection via netlink

mod command;
mod netlink;
mod notify;
mod probe;

pub use command::*;
pub use netlink::*;
pub use notify::*;
pub use probe::*;

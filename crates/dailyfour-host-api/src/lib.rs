//! Host adapter trait interfaces for dailyfour
//!
//! This crate defines the interface between the daemon and the platform:
//! finding the connected wireless network and raising desktop
//! notifications. It contains no platform code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;

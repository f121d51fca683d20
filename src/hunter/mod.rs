//! Host hunting module.
//!
//! This module walks the network hop by hop, from the device that owns the
//! target's ARP entry down to the access port the host is plugged into.

mod controller;

pub use controller::Hunter;

//! Domain models for hunting a host across the network.
//!
//! These types carry no knowledge of how devices are reached or how their
//! output is parsed.

mod device;
mod events;
mod hop;
mod mac;
mod outcome;
mod target;

pub use device::{is_port_channel, ArpEntry, DeviceId, Neighbor, OsName};
pub use events::HuntEvent;
pub use hop::HopContext;
pub use mac::{canonicalize_mac, MacAddress};
pub use outcome::{Outcome, Termination};
pub use target::{vlan_from_interface, TargetDescriptor};

//! Device connectivity abstraction.
//!
//! This module defines the `DeviceAdapter` and `DeviceSession` traits (DIP)
//! and provides an SSH implementation plus a scripted in-memory one. The
//! hunter only ever talks to devices through these traits.

mod scripted;
mod ssh;

pub use scripted::{Call, DeviceScript, ScriptedAdapter, ScriptedSession};
pub use ssh::{Credentials, SshAdapter, SshSession};

use std::net::IpAddr;

use crate::domain::{ArpEntry, DeviceId, MacAddress, Neighbor, OsName};
use crate::error::AdapterError;

/// Opens sessions to network devices.
///
/// Implementations own whatever is needed to reach a device (credentials,
/// transport settings) so the hunter never sees them.
pub trait DeviceAdapter {
    type Session: DeviceSession;

    /// Open a session to a device.
    ///
    /// `os_hint` selects the command dialect; when it is `None` the
    /// implementation works the OS out itself.
    fn connect(&self, device: &str, os_hint: Option<OsName>) -> Result<Self::Session, AdapterError>;
}

/// An open session to one device.
///
/// Every call blocks until the device answers. Dropping the session
/// releases it.
pub trait DeviceSession {
    /// The device this session is connected to.
    fn device(&self) -> &DeviceId;

    /// Ask the device to ping an address. Any failure counts as unreachable.
    fn probe_reachable(&mut self, ipaddr: IpAddr) -> bool;

    /// Look up the ARP entry for an IP address.
    fn resolve_mac_from_ip(&mut self, ipaddr: IpAddr) -> Result<Option<ArpEntry>, AdapterError>;

    /// Look up the ARP entry for a MAC address.
    fn resolve_ip_from_mac(&mut self, macaddr: &MacAddress)
        -> Result<Option<ArpEntry>, AdapterError>;

    /// Find the interface a MAC address was learned on.
    ///
    /// Fails with `AdapterError::NotFound` when the address table has no
    /// entry for it.
    fn locate_interface_for_mac(&mut self, macaddr: &MacAddress) -> Result<String, AdapterError>;

    /// Fetch the running configuration of an interface.
    fn fetch_interface_config(&mut self, interface: &str) -> Result<String, AdapterError>;

    /// List the members of a port-channel in the order the device reports them.
    fn list_port_channel_members(&mut self, interface: &str) -> Result<Vec<String>, AdapterError>;

    /// Find the CDP neighbor on an interface.
    fn find_neighbor(&mut self, interface: &str) -> Result<Option<Neighbor>, AdapterError>;
}

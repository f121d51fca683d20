//! Per-hop state of a hunt.

use std::fmt;

use super::device::DeviceId;

/// What the hunter knows about the device it is currently connected to.
///
/// A fresh context is built for every device visited and dropped once the
/// hunter moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopContext {
    pub device: DeviceId,
    /// Remaining hop budget, including this hop
    pub ttl: u32,
    /// Interface where the target MAC was last learned
    pub via_interface: Option<String>,
    /// Running configuration of `via_interface`
    pub interface_config: Option<String>,
}

impl HopContext {
    pub fn new(device: DeviceId, ttl: u32) -> Self {
        Self {
            device,
            ttl,
            via_interface: None,
            interface_config: None,
        }
    }

    /// `device:interface`, or just the device name before the interface is known.
    pub fn location(&self) -> String {
        match &self.via_interface {
            Some(interface) => format!("{}:{}", self.device.name, interface),
            None => self.device.name.clone(),
        }
    }
}

impl fmt::Display for HopContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [ttl {}]", self.location(), self.ttl)
    }
}

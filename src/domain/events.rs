//! Events emitted while a hunt progresses.

use std::net::IpAddr;

use super::device::{DeviceId, Neighbor};
use super::mac::MacAddress;
use super::outcome::Outcome;

/// A significant step of a hunt, handed to the reporter as it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuntEvent {
    /// A session to a device is open.
    Connected { device: DeviceId },
    /// The device pinged the target to refresh its ARP cache.
    Probed {
        device: String,
        ipaddr: IpAddr,
        reachable: bool,
    },
    /// The target MAC was resolved from its IP address.
    MacFound {
        device: String,
        ipaddr: IpAddr,
        macaddr: MacAddress,
        interface: String,
        vlan_id: Option<String>,
    },
    /// The target IP was resolved from its MAC address.
    IpFound {
        device: String,
        macaddr: MacAddress,
        ipaddr: IpAddr,
    },
    /// The MAC address table points at this interface.
    InterfaceLocated {
        device: String,
        macaddr: MacAddress,
        interface: String,
    },
    /// A port-channel was narrowed down to one member to follow.
    PortChannelMember {
        device: String,
        port_channel: String,
        member: String,
    },
    /// The hunter is moving on to a CDP neighbor.
    Following {
        device: String,
        interface: String,
        neighbor: Neighbor,
    },
    /// The hunt is over.
    Finished(Outcome),
}

impl HuntEvent {
    /// Whether this event ends the hunt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HopContext, OsName, TargetDescriptor, Termination};

    #[test]
    fn test_is_terminal() {
        let device = DeviceId::new("switch22", OsName::Nxos);
        assert!(!HuntEvent::Connected { device: device.clone() }.is_terminal());

        let target = TargetDescriptor::from_ip("192.168.100.171".parse().unwrap());
        let outcome = Outcome::at(Termination::TtlExhausted, &HopContext::new(device, 0), &target);
        assert!(HuntEvent::Finished(outcome).is_terminal());
    }
}

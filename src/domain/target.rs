//! What is currently known about the host being hunted.

use std::fmt;
use std::net::IpAddr;

use super::mac::MacAddress;
use crate::error::AddressError;

/// The host being hunted.
///
/// Fields only ever go from unknown to known; a learned value is never
/// replaced by a later lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    ipaddr: Option<IpAddr>,
    macaddr: Option<MacAddress>,
    vlan_id: Option<String>,
}

impl TargetDescriptor {
    /// Create a target from whatever the operator supplied.
    ///
    /// At least one of the two addresses must be given.
    pub fn new(ipaddr: Option<IpAddr>, macaddr: Option<MacAddress>) -> Result<Self, AddressError> {
        if ipaddr.is_none() && macaddr.is_none() {
            return Err(AddressError::MissingTarget);
        }

        Ok(Self {
            ipaddr,
            macaddr,
            vlan_id: None,
        })
    }

    pub fn from_ip(ipaddr: IpAddr) -> Self {
        Self {
            ipaddr: Some(ipaddr),
            macaddr: None,
            vlan_id: None,
        }
    }

    pub fn from_mac(macaddr: MacAddress) -> Self {
        Self {
            ipaddr: None,
            macaddr: Some(macaddr),
            vlan_id: None,
        }
    }

    pub fn ipaddr(&self) -> Option<IpAddr> {
        self.ipaddr
    }

    pub fn macaddr(&self) -> Option<&MacAddress> {
        self.macaddr.as_ref()
    }

    pub fn vlan_id(&self) -> Option<&str> {
        self.vlan_id.as_deref()
    }

    /// Record the IP address if none is known yet. Returns true if stored.
    pub fn learn_ipaddr(&mut self, ipaddr: IpAddr) -> bool {
        if self.ipaddr.is_some() {
            return false;
        }
        self.ipaddr = Some(ipaddr);
        true
    }

    /// Record the MAC address if none is known yet. Returns true if stored.
    pub fn learn_macaddr(&mut self, macaddr: MacAddress) -> bool {
        if self.macaddr.is_some() {
            return false;
        }
        self.macaddr = Some(macaddr);
        true
    }

    /// Record the VLAN the target lives in. Set at most once.
    pub fn learn_vlan_id(&mut self, vlan_id: impl Into<String>) -> bool {
        if self.vlan_id.is_some() {
            return false;
        }
        self.vlan_id = Some(vlan_id.into());
        true
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = self
            .ipaddr
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let mac = self
            .macaddr
            .as_ref()
            .map(|mac| mac.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        write!(f, "IP: {} | MAC: {}", ip, mac)?;
        if let Some(vlan) = &self.vlan_id {
            write!(f, " | VLAN: {}", vlan)?;
        }
        Ok(())
    }
}

/// Extract a VLAN id from an interface name such as `Vlan99`.
///
/// Returns `None` when the name does not contain `vlan` (any case) or has
/// nothing after it.
pub fn vlan_from_interface(interface: &str) -> Option<String> {
    let lower = interface.to_ascii_lowercase();
    let start = lower.find("vlan")? + "vlan".len();
    let vlan = interface[start..].trim();

    if vlan.is_empty() {
        None
    } else {
        Some(vlan.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac() -> MacAddress {
        MacAddress::parse("0050.c2ab.abab").unwrap()
    }

    #[test]
    fn test_new_requires_an_address() {
        assert_eq!(TargetDescriptor::new(None, None), Err(AddressError::MissingTarget));
        assert!(TargetDescriptor::new(Some("10.0.0.1".parse().unwrap()), None).is_ok());
        assert!(TargetDescriptor::new(None, Some(mac())).is_ok());
    }

    #[test]
    fn test_learned_fields_are_never_overwritten() {
        let mut target = TargetDescriptor::from_ip("10.9.2.171".parse().unwrap());

        assert!(!target.learn_ipaddr("10.9.2.172".parse().unwrap()));
        assert_eq!(target.ipaddr(), Some("10.9.2.171".parse().unwrap()));

        assert!(target.learn_macaddr(mac()));
        assert!(!target.learn_macaddr(MacAddress::parse("aaaa.bbbb.cccc").unwrap()));
        assert_eq!(target.macaddr(), Some(&mac()));
    }

    #[test]
    fn test_vlan_set_at_most_once() {
        let mut target = TargetDescriptor::from_mac(mac());
        assert!(target.learn_vlan_id("99"));
        assert!(!target.learn_vlan_id("18"));
        assert_eq!(target.vlan_id(), Some("99"));
    }

    #[test]
    fn test_vlan_from_interface() {
        assert_eq!(vlan_from_interface("Vlan99"), Some("99".to_string()));
        assert_eq!(vlan_from_interface("vlan18"), Some("18".to_string()));
        assert_eq!(vlan_from_interface("VLAN 200"), Some("200".to_string()));
        assert_eq!(vlan_from_interface("Eth1/1"), None);
        assert_eq!(vlan_from_interface("Vlan"), None);
    }

    #[test]
    fn test_display() {
        let mut target = TargetDescriptor::from_ip("192.168.100.171".parse().unwrap());
        assert_eq!(target.to_string(), "IP: 192.168.100.171 | MAC: N/A");

        target.learn_macaddr(mac());
        target.learn_vlan_id("99");
        assert_eq!(
            target.to_string(),
            "IP: 192.168.100.171 | MAC: 0050.c2ab.abab | VLAN: 99"
        );
    }
}

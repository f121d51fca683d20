//! Device-level domain models: OS families, ARP entries, CDP neighbors.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::mac::MacAddress;

/// Cisco OS families the hunter knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum OsName {
    Ios,
    Iosxe,
    Iosxr,
    Nxos,
}

impl OsName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Iosxe => "iosxe",
            Self::Iosxr => "iosxr",
            Self::Nxos => "nxos",
        }
    }

    /// Detect the OS family from `show version` or CDP detail text.
    ///
    /// The first family name found in the text wins. Text that names no
    /// known family yields `None`, meaning the device is not one we can
    /// follow.
    pub fn detect(content: &str) -> Option<Self> {
        const MARKERS: [(&str, OsName); 6] = [
            ("IOSXE", OsName::Iosxe),
            ("IOS-XE", OsName::Iosxe),
            ("IOS XE", OsName::Iosxe),
            ("IOS-XR", OsName::Iosxr),
            ("IOS XR", OsName::Iosxr),
            ("NX-OS", OsName::Nxos),
        ];

        let mut found: Option<(usize, OsName)> = None;
        for (marker, os) in MARKERS {
            if let Some(pos) = content.find(marker) {
                if found.map_or(true, |(best, _)| pos < best) {
                    found = Some((pos, os));
                }
            }
        }

        // Plain "IOS" also matches inside the longer markers, so only use it
        // when nothing more specific showed up before it.
        if let Some(pos) = content.find("IOS") {
            if found.map_or(true, |(best, _)| pos < best) {
                found = Some((pos, OsName::Ios));
            }
        }

        found.map(|(_, os)| os)
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ios" => Ok(Self::Ios),
            "iosxe" => Ok(Self::Iosxe),
            "iosxr" => Ok(Self::Iosxr),
            "nxos" => Ok(Self::Nxos),
            _ => Err(format!("unknown OS name: {}", s)),
        }
    }
}

/// A connected device as the hunter sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId {
    pub name: String,
    pub os_name: OsName,
}

impl DeviceId {
    pub fn new(name: impl Into<String>, os_name: OsName) -> Self {
        Self {
            name: name.into(),
            os_name,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.os_name)
    }
}

/// One line of a device ARP table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpEntry {
    pub ipaddr: IpAddr,
    pub macaddr: MacAddress,
    /// Interface the entry was learned on, e.g. `Vlan18`
    pub interface: String,
}

/// A CDP neighbor seen on an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    /// Device name with any domain suffix removed
    pub device: String,
    pub platform: Option<String>,
    /// `None` when the neighbor does not run an OS we can follow
    pub os_name: Option<OsName>,
}

impl Neighbor {
    /// A neighbor the hunter can connect to next.
    pub fn is_followable(&self) -> bool {
        !self.device.is_empty() && self.os_name.is_some()
    }
}

impl fmt::Display for Neighbor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.os_name {
            Some(os) => write!(f, "{} ({})", self.device, os)?,
            None => write!(f, "{} (unknown OS)", self.device)?,
        }
        if let Some(platform) = &self.platform {
            write!(f, " | Platform: {}", platform)?;
        }
        Ok(())
    }
}

/// Whether an interface name refers to a port-channel (`Po1`, `port-channel10`).
pub fn is_port_channel(interface: &str) -> bool {
    let lower = interface.to_ascii_lowercase();
    if lower.starts_with("port-channel") {
        return true;
    }
    lower
        .strip_prefix("po")
        .and_then(|rest| rest.chars().next())
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
}

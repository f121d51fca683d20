//! In-memory device adapter with scripted responses.
//!
//! Each device answers from a `DeviceScript`, and every call made through
//! the adapter or its sessions is appended to a shared log so tests can
//! check what the hunter asked and in which order.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::net::IpAddr;
use std::rc::Rc;

use super::{DeviceAdapter, DeviceSession};
use crate::domain::{ArpEntry, DeviceId, MacAddress, Neighbor, OsName};
use crate::error::AdapterError;

/// One call made against the scripted network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { device: String },
    ProbeReachable { device: String, ipaddr: IpAddr },
    ResolveMacFromIp { device: String, ipaddr: IpAddr },
    ResolveIpFromMac { device: String, macaddr: MacAddress },
    LocateInterfaceForMac { device: String, macaddr: MacAddress },
    FetchInterfaceConfig { device: String, interface: String },
    ListPortChannelMembers { device: String, interface: String },
    FindNeighbor { device: String, interface: String },
    Disconnect { device: String },
}

impl Call {
    pub fn device(&self) -> &str {
        match self {
            Self::Connect { device }
            | Self::ProbeReachable { device, .. }
            | Self::ResolveMacFromIp { device, .. }
            | Self::ResolveIpFromMac { device, .. }
            | Self::LocateInterfaceForMac { device, .. }
            | Self::FetchInterfaceConfig { device, .. }
            | Self::ListPortChannelMembers { device, .. }
            | Self::FindNeighbor { device, .. }
            | Self::Disconnect { device } => device,
        }
    }
}

/// How one scripted device answers.
#[derive(Debug, Clone)]
pub struct DeviceScript {
    /// OS reported when the caller gives no hint
    pub os_name: OsName,
    pub reachable: bool,
    pub arp: Vec<ArpEntry>,
    /// MAC address table: canonical MAC -> interface
    pub mac_table: HashMap<MacAddress, String>,
    pub interface_configs: HashMap<String, String>,
    pub port_channels: HashMap<String, Vec<String>>,
    pub neighbors: HashMap<String, Neighbor>,
    /// Commands fail with this message once connected
    pub broken: Option<String>,
    /// Single commands that fail with the given message
    pub failing: HashMap<String, String>,
}

impl DeviceScript {
    pub fn new(os_name: OsName) -> Self {
        Self {
            os_name,
            reachable: true,
            arp: Vec::new(),
            mac_table: HashMap::new(),
            interface_configs: HashMap::new(),
            port_channels: HashMap::new(),
            neighbors: HashMap::new(),
            broken: None,
            failing: HashMap::new(),
        }
    }

    pub fn with_arp(mut self, ipaddr: IpAddr, macaddr: MacAddress, interface: &str) -> Self {
        self.arp.push(ArpEntry {
            ipaddr,
            macaddr,
            interface: interface.to_string(),
        });
        self
    }

    pub fn with_mac_entry(mut self, macaddr: MacAddress, interface: &str) -> Self {
        self.mac_table.insert(macaddr, interface.to_string());
        self
    }

    pub fn with_interface_config(mut self, interface: &str, config: &str) -> Self {
        self.interface_configs
            .insert(interface.to_string(), config.to_string());
        self
    }

    pub fn with_port_channel(mut self, interface: &str, members: &[&str]) -> Self {
        self.port_channels.insert(
            interface.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_neighbor(mut self, interface: &str, device: &str, os_name: Option<OsName>) -> Self {
        self.neighbors.insert(
            interface.to_string(),
            Neighbor {
                device: device.to_string(),
                platform: None,
                os_name,
            },
        );
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn broken(mut self, reason: &str) -> Self {
        self.broken = Some(reason.to_string());
        self
    }

    /// Make one command fail while the rest keep answering.
    pub fn failing(mut self, command: &str, reason: &str) -> Self {
        self.failing.insert(command.to_string(), reason.to_string());
        self
    }
}

/// Shared bookkeeping between the adapter and its sessions.
#[derive(Debug, Default)]
struct Journal {
    calls: RefCell<Vec<Call>>,
    open_sessions: Cell<usize>,
    peak_sessions: Cell<usize>,
}

impl Journal {
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

/// Device adapter answering from scripts instead of real devices.
///
/// Devices without a script refuse connections.
#[derive(Debug, Default)]
pub struct ScriptedAdapter {
    devices: HashMap<String, DeviceScript>,
    journal: Rc<Journal>,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, name: &str, script: DeviceScript) -> Self {
        self.devices.insert(name.to_string(), script);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.journal.calls.borrow().clone()
    }

    /// Whether any recorded call matches.
    pub fn called(&self, predicate: impl Fn(&Call) -> bool) -> bool {
        self.journal.calls.borrow().iter().any(predicate)
    }

    /// Sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.journal.open_sessions.get()
    }

    /// Most sessions that were ever open at the same time.
    pub fn peak_sessions(&self) -> usize {
        self.journal.peak_sessions.get()
    }
}

impl DeviceAdapter for ScriptedAdapter {
    type Session = ScriptedSession;

    fn connect(
        &self,
        device: &str,
        os_hint: Option<OsName>,
    ) -> Result<ScriptedSession, AdapterError> {
        self.journal.record(Call::Connect {
            device: device.to_string(),
        });

        let script = self
            .devices
            .get(device)
            .cloned()
            .ok_or_else(|| AdapterError::ConnectionFailed {
                device: device.to_string(),
                reason: "no route to host".to_string(),
            })?;

        let open = self.journal.open_sessions.get() + 1;
        self.journal.open_sessions.set(open);
        self.journal
            .peak_sessions
            .set(self.journal.peak_sessions.get().max(open));

        Ok(ScriptedSession {
            device: DeviceId::new(device, os_hint.unwrap_or(script.os_name)),
            script,
            journal: Rc::clone(&self.journal),
        })
    }
}

/// A session to a scripted device.
#[derive(Debug)]
pub struct ScriptedSession {
    device: DeviceId,
    script: DeviceScript,
    journal: Rc<Journal>,
}

impl ScriptedSession {
    fn name(&self) -> String {
        self.device.name.clone()
    }

    fn check_command(&self, command: &str) -> Result<(), AdapterError> {
        match self.script.broken.as_ref().or(self.script.failing.get(command)) {
            Some(reason) => Err(AdapterError::CommandFailed {
                device: self.name(),
                command: command.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DeviceSession for ScriptedSession {
    fn device(&self) -> &DeviceId {
        &self.device
    }

    fn probe_reachable(&mut self, ipaddr: IpAddr) -> bool {
        self.journal.record(Call::ProbeReachable {
            device: self.name(),
            ipaddr,
        });
        self.script.broken.is_none() && self.script.reachable
    }

    fn resolve_mac_from_ip(&mut self, ipaddr: IpAddr) -> Result<Option<ArpEntry>, AdapterError> {
        self.journal.record(Call::ResolveMacFromIp {
            device: self.name(),
            ipaddr,
        });
        self.check_command("show ip arp")?;
        Ok(self.script.arp.iter().find(|e| e.ipaddr == ipaddr).cloned())
    }

    fn resolve_ip_from_mac(
        &mut self,
        macaddr: &MacAddress,
    ) -> Result<Option<ArpEntry>, AdapterError> {
        self.journal.record(Call::ResolveIpFromMac {
            device: self.name(),
            macaddr: macaddr.clone(),
        });
        self.check_command("show ip arp | include")?;
        Ok(self.script.arp.iter().find(|e| &e.macaddr == macaddr).cloned())
    }

    fn locate_interface_for_mac(&mut self, macaddr: &MacAddress) -> Result<String, AdapterError> {
        self.journal.record(Call::LocateInterfaceForMac {
            device: self.name(),
            macaddr: macaddr.clone(),
        });
        self.check_command("show mac address-table")?;
        self.script
            .mac_table
            .get(macaddr)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound {
                device: self.name(),
                what: format!("MAC address-table entry for {}", macaddr),
            })
    }

    fn fetch_interface_config(&mut self, interface: &str) -> Result<String, AdapterError> {
        self.journal.record(Call::FetchInterfaceConfig {
            device: self.name(),
            interface: interface.to_string(),
        });
        self.check_command("show running-config interface")?;
        Ok(self
            .script
            .interface_configs
            .get(interface)
            .cloned()
            .unwrap_or_else(|| format!("interface {}", interface)))
    }

    fn list_port_channel_members(&mut self, interface: &str) -> Result<Vec<String>, AdapterError> {
        self.journal.record(Call::ListPortChannelMembers {
            device: self.name(),
            interface: interface.to_string(),
        });
        self.check_command("show port-channel summary")?;
        Ok(self
            .script
            .port_channels
            .get(interface)
            .cloned()
            .unwrap_or_default())
    }

    fn find_neighbor(&mut self, interface: &str) -> Result<Option<Neighbor>, AdapterError> {
        self.journal.record(Call::FindNeighbor {
            device: self.name(),
            interface: interface.to_string(),
        });
        self.check_command("show cdp neighbors")?;
        Ok(self.script.neighbors.get(interface).cloned())
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.journal.record(Call::Disconnect {
            device: self.name(),
        });
        let open = self.journal.open_sessions.get();
        self.journal.open_sessions.set(open.saturating_sub(1));
    }
}

//! Parser for Cisco show-command output.
//!
//! Handles the NX-OS and IOS flavours of the handful of tables the hunter
//! reads: ARP, MAC address-table, port-channel summary, CDP neighbor detail
//! and ping.

use std::net::IpAddr;

use regex::Regex;

use crate::domain::{ArpEntry, MacAddress, Neighbor, OsName};
use crate::error::ParseError;

/// Marker IOS prints when a CDP query has nothing to show.
const CDP_NO_ENTRIES: &str = "Total cdp entries displayed : 0";

/// Marker both OS families print for a rejected command.
const INVALID_COMMAND: &str = "Invalid";

/// Parser for show-command text.
///
/// Holds the compiled patterns so a single instance can be reused for a
/// whole hunt.
pub struct ShowParser {
    device_id: Regex,
    platform: Regex,
    ios_ping: Regex,
    nxos_ping: Regex,
}

impl ShowParser {
    /// Create a new parser.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            device_id: Regex::new(r"(?m)^\s*Device ID:\s*(\S+)")?,
            platform: Regex::new(r"(?m)Platform:\s*([^,\r\n]+)")?,
            ios_ping: Regex::new(r"Success rate is (\d+) percent")?,
            nxos_ping: Regex::new(r"(\d+) packets received")?,
        })
    }

    /// Parse ARP table lines.
    ///
    /// Accepts both the NX-OS layout (`10.9.2.171  00:13:37  0050.abcd.de17  Vlan18`)
    /// and the IOS layout (`Internet  10.9.2.171  5  0050.abcd.de17  ARPA  Vlan18`).
    /// Lines without an IP and a MAC column (headers, incomplete entries) are
    /// skipped.
    pub fn parse_arp_table(&self, text: &str) -> Vec<ArpEntry> {
        if text.contains(INVALID_COMMAND) {
            return Vec::new();
        }

        text.lines()
            .filter_map(|line| self.parse_arp_line(line).ok())
            .collect()
    }

    /// Parse a single ARP table line.
    pub fn parse_arp_line(&self, line: &str) -> Result<ArpEntry, ParseError> {
        let columns: Vec<&str> = line.split_whitespace().collect();
        let malformed = || ParseError::ArpEntry(line.trim().to_string());

        let ipaddr = columns
            .iter()
            .find_map(|col| col.parse::<IpAddr>().ok())
            .ok_or_else(malformed)?;

        // Dotted IPv4 addresses can hold 12 digits too, so skip anything that
        // parses as an IP. The age column (00:13:37) has too few digits.
        let macaddr = columns
            .iter()
            .filter(|col| col.contains('.') || col.contains(':'))
            .filter(|col| col.parse::<IpAddr>().is_err())
            .find_map(|col| MacAddress::parse(col).ok())
            .ok_or_else(malformed)?;

        // NX-OS may print a flags column (`+`, `*`) after the interface.
        let interface = columns
            .iter()
            .rev()
            .find(|col| looks_like_interface(col))
            .ok_or_else(malformed)?;

        Ok(ArpEntry {
            ipaddr,
            macaddr,
            interface: interface.to_string(),
        })
    }

    /// Find the interface a MAC address was learned on.
    ///
    /// `* 17       0050.abcd.de17    dynamic   0          F    F  Po1` - the
    /// last column is the interface. Returns `None` when no line mentions
    /// the MAC.
    pub fn parse_mac_table_interface(
        &self,
        text: &str,
        macaddr: &MacAddress,
    ) -> Result<Option<String>, ParseError> {
        let needle = macaddr.to_string();
        let Some(line) = text.lines().find(|line| line.contains(&needle)) else {
            return Ok(None);
        };

        line.split_whitespace()
            .last()
            .filter(|col| *col != needle)
            .map(|col| Some(col.to_string()))
            .ok_or_else(|| ParseError::MacTableEntry(line.trim().to_string()))
    }

    /// List the member interfaces of a port-channel, in the order shown.
    ///
    /// `1     Po1(SU)     Eth      LACP      Eth2/1(P)    Eth2/2(P)` yields
    /// `["Eth2/1", "Eth2/2"]`. Continuation lines holding only members are
    /// included.
    pub fn parse_port_channel_members(&self, text: &str, port_channel: &str) -> Vec<String> {
        let wanted = short_port_channel_name(port_channel);
        let mut members = Vec::new();
        let mut in_group = false;

        for line in text.lines() {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.is_empty() {
                continue;
            }

            let starts_group = columns[0].chars().all(|c| c.is_ascii_digit()) && columns.len() > 1;
            if starts_group {
                let name = columns[1].split('(').next().unwrap_or_default();
                in_group = short_port_channel_name(name) == wanted;
                if in_group {
                    members.extend(columns[2..].iter().filter_map(|col| member_name(col)));
                }
            } else if in_group && line.starts_with(char::is_whitespace) {
                let continuation: Vec<String> =
                    columns.iter().filter_map(|col| member_name(col)).collect();
                if continuation.len() == columns.len() {
                    members.extend(continuation);
                } else {
                    in_group = false;
                }
            } else {
                in_group = false;
            }
        }

        members
    }

    /// Parse `show cdp neighbor ... detail` output.
    ///
    /// Returns `None` when the device reports no neighbor. The device name
    /// has its domain and any NX-OS serial suffix removed; the OS family is
    /// `None` when the neighbor is not a recognized Cisco OS.
    pub fn parse_cdp_neighbor(&self, text: &str) -> Option<Neighbor> {
        if text.trim().is_empty() || text.contains(INVALID_COMMAND) || text.contains(CDP_NO_ENTRIES) {
            return None;
        }

        let raw_device = self.device_id.captures(text)?.get(1)?.as_str();
        let device = raw_device
            .split('(')
            .next()
            .and_then(|name| name.split('.').next())
            .unwrap_or_default()
            .to_string();

        if device.is_empty() {
            return None;
        }

        let platform = self
            .platform
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string());

        Some(Neighbor {
            device,
            platform,
            os_name: OsName::detect(text),
        })
    }

    /// Whether ping output shows at least one reply.
    pub fn parse_ping_success(&self, text: &str) -> bool {
        [&self.ios_ping, &self.nxos_ping]
            .iter()
            .filter_map(|re| re.captures(text))
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .any(|count| count > 0)
    }
}

/// `Port-channel10` and `Po10` both become `po10`.
fn looks_like_interface(column: &str) -> bool {
    column.len() > 1
        && column.starts_with(|c: char| c.is_ascii_alphabetic())
        && MacAddress::parse(column).is_err()
        && column.parse::<IpAddr>().is_err()
}

fn short_port_channel_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.strip_prefix("port-channel") {
        Some(number) => format!("po{}", number),
        None => lower,
    }
}

/// `Eth2/1(P)` -> `Eth2/1`; columns without a flag suffix are not members.
fn member_name(column: &str) -> Option<String> {
    let (name, _flags) = column.split_once('(')?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NXOS_CDP_DETAIL: &str = "\
----------------------------------------
Device ID:switch21.corp.example.com(FDO21120U8N)
System Name: switch21

Interface address(es):
    IPv4 Address: 10.1.1.21
Platform: N9K-C93180YC-EX, Capabilities: Router Switch IGMP Filtering Supports-STP-Dispute
Interface: Ethernet1/1, Port ID (outgoing port): Ethernet1/49
Holdtime: 164 sec

Version:
Cisco Nexus Operating System (NX-OS) Software, Version 7.0(3)I7(6)
";

    const IOS_CDP_DETAIL: &str = "\
-------------------------
Device ID: switch39.corp.example.com
Entry address(es):
  IP address: 10.1.1.39
Platform: cisco WS-C3850-48P,  Capabilities: Switch IGMP
Interface: GigabitEthernet1/1/1,  Port ID (outgoing port): TenGigabitEthernet1/1/4
Holdtime : 150 sec

Version :
Cisco IOS Software, IOS-XE Software, Catalyst L3 Switch Software (CAT3K_CAA-UNIVERSALK9-M), Version 03.06.06E RELEASE SOFTWARE (fc1)

Total cdp entries displayed : 1
";

    const PHONE_CDP_DETAIL: &str = "\
-------------------------
Device ID: SEP001122334455
Platform: Cisco IP Phone 8845,  Capabilities: Host Phone Two-port Mac Relay
Interface: GigabitEthernet1/1/19,  Port ID (outgoing port): Port 1
Version :
sip88xx.12-5-1SR1-4

Total cdp entries displayed : 1
";

    fn parser() -> ShowParser {
        ShowParser::new().unwrap()
    }

    #[test]
    fn test_bad_pattern_is_a_parse_error() {
        let err: ParseError = Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, ParseError::Pattern(_)));
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn test_parse_nxos_arp_line() {
        let entry = parser()
            .parse_arp_line("10.9.2.171  00:13:37  0050.abcd.de17  Vlan18")
            .unwrap();
        assert_eq!(entry.ipaddr, "10.9.2.171".parse::<IpAddr>().unwrap());
        assert_eq!(entry.macaddr.to_string(), "0050.abcd.de17");
        assert_eq!(entry.interface, "Vlan18");

        for flag in ["+", "*", "#"] {
            let line = format!("10.9.2.171  00:13:37  0050.abcd.de17  Vlan18  {}", flag);
            let entry = parser().parse_arp_line(&line).unwrap();
            assert_eq!(entry.interface, "Vlan18", "flag: {flag}");
        }
    }

    #[test]
    fn test_parse_ios_arp_line() {
        let entry = parser()
            .parse_arp_line("Internet  192.168.100.171   12   0050.c2ab.abab  ARPA   Vlan99")
            .unwrap();
        assert_eq!(entry.ipaddr, "192.168.100.171".parse::<IpAddr>().unwrap());
        assert_eq!(entry.macaddr.to_string(), "0050.c2ab.abab");
        assert_eq!(entry.interface, "Vlan99");
    }

    #[test]
    fn test_parse_incomplete_arp_line() {
        assert!(parser()
            .parse_arp_line("Internet  10.9.2.5   0   Incomplete      ARPA")
            .is_err());
    }

    #[test]
    fn test_parse_arp_table_skips_headers_and_invalid() {
        let text = "\
Protocol  Address          Age (min)  Hardware Addr   Type   Interface
Internet  10.9.2.17              3   0050.abcd.0017  ARPA   Vlan18
Internet  10.9.2.171             0   0050.abcd.de17  ARPA   Vlan18
";
        let entries = parser().parse_arp_table(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].macaddr.to_string(), "0050.abcd.de17");

        assert!(parser()
            .parse_arp_table("% Invalid input detected at '^' marker.")
            .is_empty());
        assert!(parser().parse_arp_table("").is_empty());
    }

    #[test]
    fn test_parse_mac_table_interface() {
        let mac = MacAddress::parse("0050.abcd.de17").unwrap();
        let text = "* 17       0050.abcd.de17    dynamic   0          F    F  Po1\n";
        assert_eq!(
            parser().parse_mac_table_interface(text, &mac).unwrap(),
            Some("Po1".to_string())
        );

        let ios = "  99    0050.abcd.de17    DYNAMIC     Gi1/1/19\n";
        assert_eq!(
            parser().parse_mac_table_interface(ios, &mac).unwrap(),
            Some("Gi1/1/19".to_string())
        );

        assert_eq!(parser().parse_mac_table_interface("", &mac).unwrap(), None);
    }

    #[test]
    fn test_parse_port_channel_members_nxos() {
        let text = "1     Po1(SU)     Eth      LACP      Eth2/1(P)    Eth2/2(P)\n";
        assert_eq!(
            parser().parse_port_channel_members(text, "Po1"),
            vec!["Eth2/1".to_string(), "Eth2/2".to_string()]
        );
    }

    #[test]
    fn test_parse_port_channel_members_full_table() {
        let text = "\
Group Port-       Type     Protocol  Member Ports
      Channel
--------------------------------------------------------------------------------
1     Po1(SU)     Eth      LACP      Eth2/1(P)    Eth2/2(P)
10    Po10(SU)    Eth      LACP      Eth1/1(P)    Eth1/2(P)    Eth1/3(P)
                                     Eth1/4(P)
11    Po11(SD)    Eth      LACP      Eth1/5(D)
";
        assert_eq!(
            parser().parse_port_channel_members(text, "port-channel10"),
            vec!["Eth1/1", "Eth1/2", "Eth1/3", "Eth1/4"]
        );
    }

    #[test]
    fn test_parse_port_channel_members_ios_layout() {
        let text = "20     Po20(SU)        LACP      Gi1/0/1(P)  Gi2/0/1(P)\n";
        assert_eq!(
            parser().parse_port_channel_members(text, "Po20"),
            vec!["Gi1/0/1", "Gi2/0/1"]
        );
    }

    #[test]
    fn test_parse_port_channel_without_members() {
        let text = "12    Po12(SD)    Eth      NONE      --\n";
        assert!(parser().parse_port_channel_members(text, "Po12").is_empty());
        assert!(parser().parse_port_channel_members("", "Po12").is_empty());
    }

    #[test]
    fn test_parse_cdp_nxos() {
        let neighbor = parser().parse_cdp_neighbor(NXOS_CDP_DETAIL).unwrap();
        assert_eq!(neighbor.device, "switch21");
        assert_eq!(neighbor.platform.as_deref(), Some("N9K-C93180YC-EX"));
        assert_eq!(neighbor.os_name, Some(OsName::Nxos));
    }

    #[test]
    fn test_parse_cdp_ios() {
        let neighbor = parser().parse_cdp_neighbor(IOS_CDP_DETAIL).unwrap();
        assert_eq!(neighbor.device, "switch39");
        assert_eq!(neighbor.platform.as_deref(), Some("cisco WS-C3850-48P"));
        assert_eq!(neighbor.os_name, Some(OsName::Ios));
    }

    #[test]
    fn test_parse_cdp_unknown_os() {
        let neighbor = parser().parse_cdp_neighbor(PHONE_CDP_DETAIL).unwrap();
        assert_eq!(neighbor.device, "SEP001122334455");
        assert_eq!(neighbor.os_name, None);
        assert!(!neighbor.is_followable());
    }

    #[test]
    fn test_parse_cdp_no_neighbor() {
        assert!(parser().parse_cdp_neighbor("").is_none());
        assert!(parser()
            .parse_cdp_neighbor("\nTotal cdp entries displayed : 0\n")
            .is_none());
        assert!(parser()
            .parse_cdp_neighbor("% Invalid command at '^' marker.")
            .is_none());
    }

    #[test]
    fn test_parse_ping_success() {
        let p = parser();
        assert!(p.parse_ping_success("Success rate is 80 percent (4/5), round-trip min/avg/max = 1/1/2 ms"));
        assert!(!p.parse_ping_success("Success rate is 0 percent (0/5)"));
        assert!(p.parse_ping_success("5 packets transmitted, 5 packets received, 0.00% packet loss"));
        assert!(!p.parse_ping_success("5 packets transmitted, 0 packets received, 100.00% packet loss"));
        assert!(!p.parse_ping_success(""));
    }
}

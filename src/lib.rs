//! find-host
//!
//! Locates the switch port an end host is attached to. Starting from the
//! device that holds the host's ARP entry, it follows the MAC address table
//! and CDP neighbors hop by hop until there is no network device left
//! behind the port.

pub mod adapter;
pub mod config;
pub mod domain;
pub mod error;
pub mod hunter;
pub mod logging;
pub mod parser;
pub mod prompt;
pub mod reporter;

use std::net::IpAddr;

pub use config::Config;
pub use domain::{MacAddress, Outcome, TargetDescriptor, Termination};
pub use error::AddressError;
pub use hunter::Hunter;

/// Build the target descriptor from the addresses given on the command line.
///
/// Either address may be absent, but not both. The MAC is accepted in any
/// common notation and canonicalized.
#[must_use = "validation result must be checked"]
pub fn parse_target(
    ipaddr: Option<&str>,
    macaddr: Option<&str>,
) -> Result<TargetDescriptor, AddressError> {
    let ipaddr = ipaddr
        .map(|ip| {
            ip.trim()
                .parse::<IpAddr>()
                .map_err(|_| AddressError::InvalidIp(ip.to_string()))
        })
        .transpose()?;
    let macaddr = macaddr.map(MacAddress::parse).transpose()?;

    TargetDescriptor::new(ipaddr, macaddr)
}

//! Log-line event reporter.

use tracing::Level;

use crate::domain::{HuntEvent, Outcome, Termination};
use crate::reporter::Reporter;

/// Reports hunt events as `tracing` log lines.
///
/// With the `find-host` subscriber installed each event becomes one
/// `LEVEL:message` line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LogReporter {
    /// Create a new log reporter.
    pub fn new() -> Self {
        Self
    }

    /// Level and message for an event.
    pub fn format_event(&self, event: &HuntEvent) -> (Level, String) {
        match event {
            HuntEvent::Connected { device } => (Level::INFO, format!("Connected to {}", device)),
            HuntEvent::Probed {
                device,
                ipaddr,
                reachable,
            } => {
                let state = if *reachable { "reachable" } else { "not reachable" };
                (
                    Level::INFO,
                    format!("Ping {} from {}: {}", ipaddr, device, state),
                )
            }
            HuntEvent::MacFound {
                device,
                ipaddr,
                macaddr,
                interface,
                vlan_id,
            } => {
                let mut message = format!(
                    "Found MAC {} for {} on {}:{}",
                    macaddr, ipaddr, device, interface
                );
                if let Some(vlan) = vlan_id {
                    message.push_str(&format!(" | VLAN: {}", vlan));
                }
                (Level::INFO, message)
            }
            HuntEvent::IpFound {
                device,
                macaddr,
                ipaddr,
            } => (
                Level::INFO,
                format!("Found IP {} for MAC {} on {}", ipaddr, macaddr, device),
            ),
            HuntEvent::InterfaceLocated {
                device,
                macaddr,
                interface,
            } => (
                Level::INFO,
                format!("MAC {} last seen on {}:{}", macaddr, device, interface),
            ),
            HuntEvent::PortChannelMember {
                device,
                port_channel,
                member,
            } => (
                Level::INFO,
                format!(
                    "{}:{} is a port-channel, following member {}",
                    device, port_channel, member
                ),
            ),
            HuntEvent::Following {
                device,
                interface,
                neighbor,
            } => (
                Level::INFO,
                format!("Following {}:{} to {}", device, interface, neighbor),
            ),
            HuntEvent::Finished(outcome) => self.format_outcome(outcome),
        }
    }

    fn format_outcome(&self, outcome: &Outcome) -> (Level, String) {
        let location = outcome.location();
        let mut message = match outcome.termination {
            Termination::NoNextDevice => format!("Host found on {}", location),
            Termination::UserDeclined => {
                format!("Stopped by user, last known location {}", location)
            }
            Termination::PortChannelEmpty => format!("Port-channel {} has no members", location),
            Termination::TtlExhausted => {
                format!("Hop limit reached, last known location {}", location)
            }
            Termination::MacNotFound => format!("MAC address not found on {}", location),
            Termination::ConnectionFailure => format!("Connection failure after {}", location),
        };
        let level = if outcome.termination.is_failure() {
            Level::ERROR
        } else if outcome.termination == Termination::PortChannelEmpty {
            Level::WARN
        } else {
            Level::INFO
        };

        message.push_str(&format!(" | {} | {}", outcome.target, outcome.termination));
        if let Some(next) = &outcome.next_device {
            message.push_str(&format!(" | Next: {}", next));
        }
        if let Some(detail) = &outcome.detail {
            message.push_str(&format!(" | {}", detail));
        }
        (level, message)
    }
}

impl Reporter for LogReporter {
    fn report(&mut self, event: &HuntEvent) {
        let (level, message) = self.format_event(event);
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            _ => tracing::trace!("{}", message),
        }
    }
}

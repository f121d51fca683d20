//! Terminal outcomes of a hunt.

use std::fmt;

use super::hop::HopContext;
use super::target::TargetDescriptor;

/// Why a hunt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The origin device has no ARP entry for the target IP.
    MacNotFound,
    /// The operator chose not to follow the next hop.
    UserDeclined,
    /// The MAC was learned on a port-channel with no members.
    PortChannelEmpty,
    /// No CDP neighbor we can follow on the interface; the host is here.
    NoNextDevice,
    /// A session to a device could not be opened or was lost.
    ConnectionFailure,
    /// The hop budget ran out before the host was located.
    TtlExhausted,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MacNotFound => "MAC_NOT_FOUND",
            Self::UserDeclined => "USER_DECLINED",
            Self::PortChannelEmpty => "PORTCHANNEL_EMPTY",
            Self::NoNextDevice => "NO_NEXT_DEVICE",
            Self::ConnectionFailure => "CONNECTION_FAILURE",
            Self::TtlExhausted => "TTL_EXHAUSTED",
        }
    }

    /// Whether the hunt ended because something went wrong, as opposed to
    /// finding the end of the path or the operator stopping it.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::MacNotFound | Self::ConnectionFailure | Self::TtlExhausted
        )
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a hunt ended and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub termination: Termination,
    /// Last device the hunter was connected to
    pub device: String,
    /// Interface on `device` where the target was last seen, if known
    pub interface: Option<String>,
    pub interface_config: Option<String>,
    /// Device the hunter was about to visit, if one had been identified
    pub next_device: Option<String>,
    pub target: TargetDescriptor,
    /// Extra context, e.g. the connection error
    pub detail: Option<String>,
}

impl Outcome {
    /// Build an outcome from the state of the hop the hunt stopped on.
    pub fn at(termination: Termination, hop: &HopContext, target: &TargetDescriptor) -> Self {
        Self {
            termination,
            device: hop.device.name.clone(),
            interface: hop.via_interface.clone(),
            interface_config: hop.interface_config.clone(),
            next_device: None,
            target: target.clone(),
            detail: None,
        }
    }

    pub fn with_next_device(mut self, device: impl Into<String>) -> Self {
        self.next_device = Some(device.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// `device:interface`, or just the device when no interface was found.
    pub fn location(&self) -> String {
        match &self.interface {
            Some(interface) => format!("{}:{}", self.device, interface),
            None => self.device.clone(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} | {}", self.termination, self.location(), self.target)?;
        if let Some(next) = &self.next_device {
            write!(f, " | Next: {}", next)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " | {}", detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceId, OsName};

    fn hop() -> HopContext {
        let mut hop = HopContext::new(DeviceId::new("switch39", OsName::Ios), 1);
        hop.via_interface = Some("Gi1/1/19".to_string());
        hop.interface_config = Some("interface GigabitEthernet1/1/19\n switchport".to_string());
        hop
    }

    #[test]
    fn test_outcome_at_hop() {
        let target = TargetDescriptor::from_ip("192.168.100.171".parse().unwrap());
        let outcome = Outcome::at(Termination::NoNextDevice, &hop(), &target);

        assert_eq!(outcome.device, "switch39");
        assert_eq!(outcome.location(), "switch39:Gi1/1/19");
        assert!(outcome.interface_config.is_some());
        assert!(outcome.next_device.is_none());
        assert!(!outcome.termination.is_failure());
    }

    #[test]
    fn test_display() {
        let target = TargetDescriptor::from_ip("10.0.0.5".parse().unwrap());
        let outcome = Outcome::at(Termination::ConnectionFailure, &hop(), &target)
            .with_next_device("switch40")
            .with_detail("ssh exited with status 255");

        assert_eq!(
            outcome.to_string(),
            "CONNECTION_FAILURE at switch39:Gi1/1/19 | IP: 10.0.0.5 | MAC: N/A | Next: switch40 | ssh exited with status 255"
        );
    }

    #[test]
    fn test_termination_names() {
        assert_eq!(Termination::MacNotFound.to_string(), "MAC_NOT_FOUND");
        assert_eq!(Termination::PortChannelEmpty.to_string(), "PORTCHANNEL_EMPTY");
        assert_eq!(Termination::TtlExhausted.to_string(), "TTL_EXHAUSTED");
    }
}

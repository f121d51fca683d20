//! Hop-by-hop traversal logic.

use crate::adapter::{DeviceAdapter, DeviceSession};
use crate::domain::{
    is_port_channel, vlan_from_interface, HopContext, HuntEvent, Neighbor, Outcome,
    TargetDescriptor, Termination,
};
use crate::error::AdapterError;
use crate::prompt::{AutoFollow, Confirm};
use crate::reporter::{LogReporter, Reporter};

/// Follows a host from an origin device to the port it is attached to.
///
/// Each hop resolves whatever is still unknown about the target, finds the
/// interface its MAC was learned on and asks CDP who sits behind that
/// interface. The hunt ends when there is nobody left to follow, something
/// fails, the operator says stop, or the hop budget runs out.
///
/// Only one device session is open at a time.
pub struct Hunter<'a, A, C = AutoFollow, R = LogReporter> {
    adapter: &'a A,
    confirm: C,
    reporter: R,
}

impl<'a, A: DeviceAdapter> Hunter<'a, A> {
    /// Create a hunter that follows every hop and logs its progress.
    pub fn new(adapter: &'a A) -> Self {
        Self {
            adapter,
            confirm: AutoFollow,
            reporter: LogReporter::new(),
        }
    }
}

impl<'a, A, C, R> Hunter<'a, A, C, R>
where
    A: DeviceAdapter,
    C: Confirm,
    R: Reporter,
{
    /// Ask `confirm` before following each hop when not in follow mode.
    pub fn with_confirm<C2: Confirm>(self, confirm: C2) -> Hunter<'a, A, C2, R> {
        Hunter {
            adapter: self.adapter,
            confirm,
            reporter: self.reporter,
        }
    }

    /// Send hunt events to `reporter` instead of the log.
    pub fn with_reporter<R2: Reporter>(self, reporter: R2) -> Hunter<'a, A, C, R2> {
        Hunter {
            adapter: self.adapter,
            confirm: self.confirm,
            reporter,
        }
    }

    /// Hunt for `target` starting at `origin`.
    ///
    /// Addresses learned along the way are written into `target`. With
    /// `follow` set the confirmation step is skipped. `ttl` bounds the
    /// number of devices visited. Always returns exactly one outcome, which
    /// is also handed to the reporter.
    pub fn hunt(
        &mut self,
        origin: A::Session,
        target: &mut TargetDescriptor,
        follow: bool,
        ttl: u32,
    ) -> Outcome {
        let outcome = self.walk(origin, target, follow, ttl);
        self.reporter.report(&HuntEvent::Finished(outcome.clone()));
        outcome
    }

    fn walk(
        &mut self,
        origin: A::Session,
        target: &mut TargetDescriptor,
        follow: bool,
        ttl: u32,
    ) -> Outcome {
        let mut session = origin;
        let mut hop = HopContext::new(session.device().clone(), ttl);
        self.reporter.report(&HuntEvent::Connected {
            device: hop.device.clone(),
        });

        loop {
            let neighbor = match self.visit(&mut session, &mut hop, target, follow) {
                Ok(neighbor) => neighbor,
                Err(outcome) => return outcome,
            };

            let remaining = hop.ttl.saturating_sub(1);
            if remaining == 0 {
                return Outcome::at(Termination::TtlExhausted, &hop, target)
                    .with_next_device(neighbor.device);
            }

            // Release the current device before dialing the next one.
            drop(session);

            tracing::debug!("Connecting to {} ({} hops left)", neighbor.device, remaining);
            session = match self.adapter.connect(&neighbor.device, neighbor.os_name) {
                Ok(session) => session,
                Err(e) => {
                    return Outcome::at(Termination::ConnectionFailure, &hop, target)
                        .with_next_device(neighbor.device)
                        .with_detail(e.to_string());
                }
            };

            hop = HopContext::new(session.device().clone(), remaining);
            self.reporter.report(&HuntEvent::Connected {
                device: hop.device.clone(),
            });
        }
    }

    /// Run one hop on the current device.
    ///
    /// Returns the neighbor to move on to, or the outcome the hunt ends with.
    fn visit(
        &mut self,
        session: &mut A::Session,
        hop: &mut HopContext,
        target: &mut TargetDescriptor,
        follow: bool,
    ) -> Result<Neighbor, Outcome> {
        if hop.ttl == 0 {
            return Err(Outcome::at(Termination::TtlExhausted, hop, target));
        }
        let device = hop.device.name.clone();

        if target.macaddr().is_none() {
            let Some(ipaddr) = target.ipaddr() else {
                return Err(Outcome::at(Termination::MacNotFound, hop, target));
            };

            let reachable = session.probe_reachable(ipaddr);
            self.reporter.report(&HuntEvent::Probed {
                device: device.clone(),
                ipaddr,
                reachable,
            });

            let entry = session
                .resolve_mac_from_ip(ipaddr)
                .map_err(|e| connection_lost(hop, target, e))?
                .ok_or_else(|| Outcome::at(Termination::MacNotFound, hop, target))?;

            let vlan_id = vlan_from_interface(&entry.interface);
            target.learn_macaddr(entry.macaddr.clone());
            if let Some(vlan_id) = &vlan_id {
                target.learn_vlan_id(vlan_id.clone());
            }
            self.reporter.report(&HuntEvent::MacFound {
                device: device.clone(),
                ipaddr,
                macaddr: entry.macaddr,
                interface: entry.interface,
                vlan_id,
            });
        }

        let Some(macaddr) = target.macaddr().cloned() else {
            return Err(Outcome::at(Termination::MacNotFound, hop, target));
        };

        if target.ipaddr().is_none() {
            match session.resolve_ip_from_mac(&macaddr) {
                Ok(Some(entry)) => {
                    target.learn_ipaddr(entry.ipaddr);
                    self.reporter.report(&HuntEvent::IpFound {
                        device: device.clone(),
                        macaddr: macaddr.clone(),
                        ipaddr: entry.ipaddr,
                    });
                }
                Ok(None) => tracing::debug!("No ARP entry for {} on {}", macaddr, device),
                Err(e) => tracing::warn!("Reverse ARP lookup failed: {}", e),
            }
        }

        let interface = match session.locate_interface_for_mac(&macaddr) {
            Ok(interface) => interface,
            Err(e) if e.is_not_found() => {
                tracing::debug!("{}", e);
                return Err(Outcome::at(Termination::MacNotFound, hop, target));
            }
            Err(e) => return Err(connection_lost(hop, target, e)),
        };
        hop.via_interface = Some(interface.clone());
        self.reporter.report(&HuntEvent::InterfaceLocated {
            device: device.clone(),
            macaddr,
            interface: interface.clone(),
        });

        let config = session
            .fetch_interface_config(&interface)
            .map_err(|e| connection_lost(hop, target, e))?;
        hop.interface_config = Some(config);

        if !follow && !self.confirm.confirm(hop, target) {
            return Err(Outcome::at(Termination::UserDeclined, hop, target));
        }

        let follow_interface = if is_port_channel(&interface) {
            let members = session
                .list_port_channel_members(&interface)
                .map_err(|e| connection_lost(hop, target, e))?;
            let Some(member) = members.into_iter().next() else {
                return Err(Outcome::at(Termination::PortChannelEmpty, hop, target));
            };
            self.reporter.report(&HuntEvent::PortChannelMember {
                device: device.clone(),
                port_channel: interface.clone(),
                member: member.clone(),
            });
            member
        } else {
            interface
        };

        let neighbor = session
            .find_neighbor(&follow_interface)
            .map_err(|e| connection_lost(hop, target, e))?
            .ok_or_else(|| Outcome::at(Termination::NoNextDevice, hop, target))?;

        if !neighbor.is_followable() {
            tracing::debug!("Not following {} on {}", neighbor, follow_interface);
            return Err(Outcome::at(Termination::NoNextDevice, hop, target));
        }

        self.reporter.report(&HuntEvent::Following {
            device,
            interface: follow_interface,
            neighbor: neighbor.clone(),
        });
        Ok(neighbor)
    }
}

fn connection_lost(hop: &HopContext, target: &TargetDescriptor, err: AdapterError) -> Outcome {
    Outcome::at(Termination::ConnectionFailure, hop, target).with_detail(err.to_string())
}

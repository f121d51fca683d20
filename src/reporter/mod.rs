//! Reporting module for hunt progress.
//!
//! This module defines the `Reporter` trait (ISP, DIP) and provides a
//! log-line implementation plus one that records events for inspection.

mod log_reporter;

pub use log_reporter::LogReporter;

use crate::domain::{HuntEvent, Outcome};

/// Trait for reporting hunt events (Interface Segregation Principle).
///
/// The hunter hands every significant step to its reporter as it happens;
/// what gets printed, stored or ignored is up to the implementation.
pub trait Reporter {
    /// Report a hunt event.
    fn report(&mut self, event: &HuntEvent);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: &HuntEvent) {
        (**self).report(event)
    }
}

/// Keeps every event it is given.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    events: Vec<HuntEvent>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HuntEvent] {
        &self.events
    }

    /// The outcome reported at the end of the hunt, if any.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.events.iter().rev().find_map(|event| match event {
            HuntEvent::Finished(outcome) => Some(outcome),
            _ => None,
        })
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: &HuntEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceId, HopContext, OsName, TargetDescriptor, Termination};

    #[test]
    fn test_recording_reporter_keeps_order() {
        let device = DeviceId::new("switch22", OsName::Nxos);
        let target = TargetDescriptor::from_ip("192.168.100.171".parse().unwrap());
        let outcome = Outcome::at(
            Termination::NoNextDevice,
            &HopContext::new(device.clone(), 4),
            &target,
        );

        let mut reporter = RecordingReporter::new();
        assert!(reporter.outcome().is_none());

        reporter.report(&HuntEvent::Connected { device });
        reporter.report(&HuntEvent::Finished(outcome.clone()));

        assert_eq!(reporter.events().len(), 2);
        assert!(matches!(reporter.events()[0], HuntEvent::Connected { .. }));
        assert_eq!(reporter.outcome(), Some(&outcome));
    }
}

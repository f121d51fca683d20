//! Operator confirmation between hops.
//!
//! This module defines the `Confirm` trait (ISP, DIP). The hunter asks it
//! before leaving a device unless it was told to follow automatically.

mod terminal_prompt;

pub use terminal_prompt::TerminalPrompt;

use crate::domain::{HopContext, TargetDescriptor};

/// Decides whether the hunt should move on from the current device.
pub trait Confirm {
    /// Return true to keep following, false to stop here.
    fn confirm(&mut self, hop: &HopContext, target: &TargetDescriptor) -> bool;
}

/// Always continues. Used for `--follow`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoFollow;

impl Confirm for AutoFollow {
    fn confirm(&mut self, _hop: &HopContext, _target: &TargetDescriptor) -> bool {
        true
    }
}

/// Answers from a fixed list, then stops. Handy for tests.
#[derive(Debug, Default, Clone)]
pub struct ScriptedAnswers {
    answers: Vec<bool>,
    asked: Vec<String>,
}

impl ScriptedAnswers {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().rev().copied().collect(),
            asked: Vec::new(),
        }
    }

    /// Locations the prompt was shown for, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Confirm for ScriptedAnswers {
    fn confirm(&mut self, hop: &HopContext, _target: &TargetDescriptor) -> bool {
        self.asked.push(hop.location());
        self.answers.pop().unwrap_or(false)
    }
}

impl<C: Confirm + ?Sized> Confirm for &mut C {
    fn confirm(&mut self, hop: &HopContext, target: &TargetDescriptor) -> bool {
        (**self).confirm(hop, target)
    }
}

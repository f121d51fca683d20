//! Interactive confirmation on a terminal.

use std::io::{self, BufRead, Write};

use crate::domain::{HopContext, TargetDescriptor};
use crate::prompt::Confirm;

/// Shows the interface the host was found on and asks whether to follow it.
///
/// An empty answer or anything starting with `y` continues. Any other
/// answer, end of input or a read error stops the hunt.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr and read answers from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, hop: &HopContext, target: &TargetDescriptor) -> io::Result<bool> {
        writeln!(self.output)?;
        writeln!(self.output, "Host {} found on {}", target, hop.location())?;
        if let Some(config) = &hop.interface_config {
            writeln!(self.output, "{}", config)?;
        }
        write!(self.output, "Follow? [Y/n] ")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        let answer = answer.trim();
        Ok(answer.is_empty() || answer.to_ascii_lowercase().starts_with('y'))
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalPrompt<R, W> {
    fn confirm(&mut self, hop: &HopContext, target: &TargetDescriptor) -> bool {
        match self.ask(hop, target) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceId, OsName};
    use std::io::Cursor;

    fn hop() -> HopContext {
        let mut hop = HopContext::new(DeviceId::new("switch22", OsName::Nxos), 4);
        hop.via_interface = Some("Eth1/1".to_string());
        hop.interface_config = Some("interface Ethernet1/1\n  switchport mode trunk".to_string());
        hop
    }

    fn target() -> TargetDescriptor {
        TargetDescriptor::from_ip("192.168.100.171".parse().unwrap())
    }

    fn answer(input: &str) -> (bool, String) {
        let mut output = Vec::new();
        let result = TerminalPrompt::new(Cursor::new(input.as_bytes()), &mut output)
            .confirm(&hop(), &target());
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_default_answer_follows() {
        assert!(answer("\n").0);
        assert!(answer("y\n").0);
        assert!(answer("Yes\n").0);
    }

    #[test]
    fn test_other_answers_stop() {
        assert!(!answer("n\n").0);
        assert!(!answer("quit\n").0);
        assert!(!answer("").0);
    }

    #[test]
    fn test_prompt_shows_interface_and_config() {
        let (_, shown) = answer("y\n");
        assert!(shown.contains("found on switch22:Eth1/1"));
        assert!(shown.contains("switchport mode trunk"));
        assert!(shown.ends_with("Follow? [Y/n] "));
    }
}

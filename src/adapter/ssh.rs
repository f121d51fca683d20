//! OpenSSH-based device adapter.
//!
//! Each session is an OpenSSH control master (`ssh -M -f -N`). Show commands
//! are run as separate execs over the control socket, and the master is shut
//! down with `ssh -O exit` when the session is dropped.

use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use super::{DeviceAdapter, DeviceSession};
use crate::config::Config;
use crate::domain::{ArpEntry, DeviceId, MacAddress, Neighbor, OsName};
use crate::error::AdapterError;
use crate::parser::ShowParser;

/// Environment variables holding the login name, in lookup order.
const USERNAME_VARS: [&str; 2] = ["FINDHOST_USERNAME", "PYATS_USERNAME"];
/// Environment variables holding the password, in lookup order.
const PASSWORD_VARS: [&str; 2] = ["FINDHOST_PASSWORD", "PYATS_PASSWORD"];

/// Show commands, per OS family.
mod commands {
    use std::net::IpAddr;

    use crate::domain::{MacAddress, OsName};

    pub const SHOW_VERSION: &str = "show version";

    pub fn arp_by_ip(os: OsName, ipaddr: IpAddr) -> String {
        match os {
            OsName::Iosxr => format!("show arp | include {}", ipaddr),
            _ => format!("show ip arp {} | include {}", ipaddr, ipaddr),
        }
    }

    pub fn arp_by_mac(os: OsName, macaddr: &MacAddress) -> String {
        match os {
            OsName::Iosxr => format!("show arp | include {}", macaddr),
            _ => format!("show ip arp | include {}", macaddr),
        }
    }

    pub fn mac_table(macaddr: &MacAddress) -> String {
        format!("show mac address-table | include {}", macaddr)
    }

    pub fn running_config(interface: &str) -> String {
        format!("show running-config interface {}", interface)
    }

    pub fn port_channel_summary(os: OsName, interface: &str) -> String {
        match os {
            OsName::Nxos => format!("show port-channel summary interface {}", interface),
            _ => "show etherchannel summary".to_string(),
        }
    }

    pub fn cdp_neighbor(os: OsName, interface: &str) -> String {
        match os {
            OsName::Nxos => format!("show cdp neighbor interface {} detail", interface),
            _ => format!("show cdp neighbors {} detail", interface),
        }
    }

    pub fn ping(ipaddr: IpAddr) -> String {
        format!("ping {}", ipaddr)
    }
}

/// Login credentials for network devices.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    /// `None` means key-based authentication
    pub password: Option<String>,
}

impl Credentials {
    /// Load credentials from `FINDHOST_USERNAME` / `FINDHOST_PASSWORD`,
    /// falling back to `PYATS_USERNAME` / `PYATS_PASSWORD`.
    pub fn from_env() -> Result<Self, AdapterError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdapterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.is_empty())
        };

        let username = first_set(&USERNAME_VARS)
            .ok_or_else(|| AdapterError::MissingCredentials(USERNAME_VARS.join(" or ")))?;

        Ok(Self {
            username,
            password: first_set(&PASSWORD_VARS),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

/// Settings shared by the adapter and all of its sessions.
#[derive(Debug)]
struct SshSettings {
    ssh_command: String,
    connect_timeout: Duration,
    domain_suffix: Option<String>,
    control_dir: PathBuf,
    credentials: Credentials,
}

impl SshSettings {
    /// `ssh` invocation that talks through an existing control socket.
    fn over_socket(&self, control_path: &Path, host: &str) -> Command {
        let mut cmd = Command::new(&self.ssh_command);
        cmd.arg("-S")
            .arg(control_path)
            .args(["-o", "BatchMode=yes"])
            .arg("-l")
            .arg(&self.credentials.username)
            .arg(host);
        cmd
    }

    /// `ssh` invocation that starts a backgrounded control master.
    fn master(&self, control_path: &Path, host: &str) -> Command {
        let mut cmd = match &self.credentials.password {
            Some(password) => {
                let mut cmd = Command::new("sshpass");
                cmd.arg("-e").arg(&self.ssh_command).env("SSHPASS", password);
                cmd
            }
            None => {
                let mut cmd = Command::new(&self.ssh_command);
                cmd.args(["-o", "BatchMode=yes"]);
                cmd
            }
        };

        cmd.args(["-M", "-f", "-N"])
            .arg("-S")
            .arg(control_path)
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)))
            .arg("-l")
            .arg(&self.credentials.username)
            .arg(host)
            // the backgrounded master keeps any pipe open, so never capture
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Device adapter that reaches devices over OpenSSH.
pub struct SshAdapter {
    settings: Arc<SshSettings>,
    parser: Arc<ShowParser>,
}

impl SshAdapter {
    /// Create a new adapter.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, AdapterError> {
        Ok(Self {
            settings: Arc::new(SshSettings {
                ssh_command: config.ssh_command.clone(),
                connect_timeout: config.connect_timeout,
                domain_suffix: config.domain_suffix.clone(),
                control_dir: config.control_dir.clone(),
                credentials,
            }),
            parser: Arc::new(ShowParser::new()?),
        })
    }

    /// Host name to dial for a device name learned from CDP or the CLI.
    fn host_for(&self, device: &str) -> String {
        match &self.settings.domain_suffix {
            Some(suffix) if !device.contains('.') => format!("{}.{}", device, suffix),
            _ => device.to_string(),
        }
    }

    fn control_path_for(&self, device: &str) -> PathBuf {
        let name: String = device
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.settings
            .control_dir
            .join(format!("find-host-{}-{}.sock", std::process::id(), name))
    }
}

impl DeviceAdapter for SshAdapter {
    type Session = SshSession;

    fn connect(&self, device: &str, os_hint: Option<OsName>) -> Result<SshSession, AdapterError> {
        let host = self.host_for(device);
        let control_path = self.control_path_for(device);

        tracing::debug!("Opening SSH control master to {} at {:?}", host, control_path);

        let status = self
            .settings
            .master(&control_path, &host)
            .status()
            .map_err(|e| AdapterError::ConnectionFailed {
                device: device.to_string(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(AdapterError::ConnectionFailed {
                device: device.to_string(),
                reason: format!("ssh exited with {}", status),
            });
        }

        let mut session = SshSession {
            device: DeviceId::new(device, os_hint.unwrap_or(OsName::Ios)),
            host,
            control_path,
            settings: Arc::clone(&self.settings),
            parser: Arc::clone(&self.parser),
        };

        if os_hint.is_none() {
            let version = session.run(commands::SHOW_VERSION)?;
            match OsName::detect(&version) {
                Some(os_name) => session.device.os_name = os_name,
                None => tracing::warn!(
                    "Could not detect the OS of {}, assuming {}",
                    device,
                    session.device.os_name
                ),
            }
        }

        Ok(session)
    }
}

/// A live SSH session to one device.
pub struct SshSession {
    device: DeviceId,
    host: String,
    control_path: PathBuf,
    settings: Arc<SshSettings>,
    parser: Arc<ShowParser>,
}

impl SshSession {
    /// Run one show command and return its output.
    fn run(&self, command: &str) -> Result<String, AdapterError> {
        tracing::debug!("{}# {}", self.device.name, command);

        let output = self
            .settings
            .over_socket(&self.control_path, &self.host)
            .arg(command)
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AdapterError::CommandFailed {
                device: self.device.name.clone(),
                command: command.to_string(),
                reason: if stderr.is_empty() {
                    format!("ssh exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DeviceSession for SshSession {
    fn device(&self) -> &DeviceId {
        &self.device
    }

    fn probe_reachable(&mut self, ipaddr: IpAddr) -> bool {
        match self.run(&commands::ping(ipaddr)) {
            Ok(output) => self.parser.parse_ping_success(&output),
            Err(e) => {
                tracing::debug!("Ping from {} failed: {}", self.device.name, e);
                false
            }
        }
    }

    fn resolve_mac_from_ip(&mut self, ipaddr: IpAddr) -> Result<Option<ArpEntry>, AdapterError> {
        let output = self.run(&commands::arp_by_ip(self.device.os_name, ipaddr))?;
        Ok(self
            .parser
            .parse_arp_table(&output)
            .into_iter()
            .find(|entry| entry.ipaddr == ipaddr))
    }

    fn resolve_ip_from_mac(
        &mut self,
        macaddr: &MacAddress,
    ) -> Result<Option<ArpEntry>, AdapterError> {
        let output = self.run(&commands::arp_by_mac(self.device.os_name, macaddr))?;
        Ok(self
            .parser
            .parse_arp_table(&output)
            .into_iter()
            .find(|entry| &entry.macaddr == macaddr))
    }

    fn locate_interface_for_mac(&mut self, macaddr: &MacAddress) -> Result<String, AdapterError> {
        let output = self.run(&commands::mac_table(macaddr))?;
        self.parser
            .parse_mac_table_interface(&output, macaddr)
            .map_err(|source| AdapterError::Parse {
                device: self.device.name.clone(),
                source,
            })?
            .ok_or_else(|| AdapterError::NotFound {
                device: self.device.name.clone(),
                what: format!("MAC address-table entry for {}", macaddr),
            })
    }

    fn fetch_interface_config(&mut self, interface: &str) -> Result<String, AdapterError> {
        let output = self.run(&commands::running_config(interface))?;
        Ok(output.trim_end().to_string())
    }

    fn list_port_channel_members(&mut self, interface: &str) -> Result<Vec<String>, AdapterError> {
        let output = self.run(&commands::port_channel_summary(self.device.os_name, interface))?;
        Ok(self.parser.parse_port_channel_members(&output, interface))
    }

    fn find_neighbor(&mut self, interface: &str) -> Result<Option<Neighbor>, AdapterError> {
        let output = self.run(&commands::cdp_neighbor(self.device.os_name, interface))?;
        Ok(self.parser.parse_cdp_neighbor(&output))
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        let result = Command::new(&self.settings.ssh_command)
            .arg("-S")
            .arg(&self.control_path)
            .args(["-O", "exit"])
            .arg(&self.host)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => {
                tracing::debug!("Closed session to {}", self.device.name)
            }
            Ok(status) => tracing::debug!(
                "Closing session to {} exited with {}",
                self.device.name,
                status
            ),
            Err(e) => tracing::debug!("Failed to close session to {}: {}", self.device.name, e),
        }
    }
}

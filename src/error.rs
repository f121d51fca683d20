use thiserror::Error;

/// Errors raised while validating host addresses given on the command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid MAC address format: {0}")]
    InvalidFormat(String),

    #[error("Invalid IP address: {0}")]
    InvalidIp(String),

    #[error("A target needs at least an IP address or a MAC address")]
    MissingTarget,
}

/// Errors raised by a device adapter while talking to a network device.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Failed to connect to {device}: {reason}")]
    ConnectionFailed { device: String, reason: String },

    #[error("Command '{command}' failed on {device}: {reason}")]
    CommandFailed {
        device: String,
        command: String,
        reason: String,
    },

    #[error("{what} not found on {device}")]
    NotFound { device: String, what: String },

    #[error("Missing environment variable: {0}")]
    MissingCredentials(String),

    #[error("Unexpected output from {device}: {source}")]
    Parse {
        device: String,
        #[source]
        source: ParseError,
    },

    #[error("Parser setup failed: {0}")]
    Parser(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    /// Whether the device answered but had no matching entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while parsing device show-command output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed ARP entry: {0}")]
    ArpEntry(String),

    #[error("Malformed MAC address-table entry: {0}")]
    MacTableEntry(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

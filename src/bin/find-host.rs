use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use findhost::adapter::{Credentials, DeviceAdapter, SshAdapter};
use findhost::domain::OsName;
use findhost::prompt::TerminalPrompt;
use findhost::{logging, parse_target, Config, Hunter, Outcome};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "find-host")]
#[command(about = "Find the switch port a host is attached to")]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["ipaddr", "macaddr"])
))]
struct Cli {
    /// Device to start from, normally the gateway holding the host's ARP entry
    #[arg(long)]
    origin_device: String,

    /// OS of the origin device (detected from `show version` when omitted)
    #[arg(long, value_enum)]
    os_name: Option<OsName>,

    /// IP address of the host
    #[arg(long)]
    ipaddr: Option<String>,

    /// MAC address of the host, in any common notation
    #[arg(long)]
    macaddr: Option<String>,

    /// Follow every hop without asking
    #[arg(long)]
    follow: bool,

    /// Maximum number of devices to visit [default: from config, 4]
    #[arg(long)]
    ttl: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file [default: $FINDHOST_CONFIG or /etc/find-host.conf]
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(outcome) => {
            println!("{}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let mut target = parse_target(cli.ipaddr.as_deref(), cli.macaddr.as_deref())?;
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let ttl = cli.ttl.unwrap_or(config.ttl);

    let credentials = Credentials::from_env()?;
    let adapter = SshAdapter::new(&config, credentials)?;

    let origin = adapter
        .connect(&cli.origin_device, cli.os_name)
        .with_context(|| format!("failed to connect to {}", cli.origin_device))?;

    tracing::info!("Hunting {} from {} [ttl {}]", target, cli.origin_device, ttl);

    let outcome = if cli.follow {
        Hunter::new(&adapter).hunt(origin, &mut target, true, ttl)
    } else {
        Hunter::new(&adapter)
            .with_confirm(TerminalPrompt::stdio())
            .hunt(origin, &mut target, false, ttl)
    };
    Ok(outcome)
}

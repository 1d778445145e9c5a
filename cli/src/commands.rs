pub mod dns;
pub mod full;
pub mod ports;
pub mod subs;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rekon")]
#[command(about = "Domain reconnaissance: subdomains, DNS records, open ports.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and classify a domain's DNS records
    #[command(alias = "d")]
    Dns { domain: String },

    /// TCP connect scan against an address
    #[command(alias = "p")]
    Ports {
        address: IpAddr,
        /// Port range to scan, e.g. "1-1024" (default: all ports)
        #[arg(long)]
        ports: Option<String>,
        /// Connect timeout per port in milliseconds
        #[arg(long, default_value_t = 500)]
        timeout_ms: u64,
    },

    /// Enumerate live subdomains from a word list
    #[command(alias = "s")]
    Subs {
        domain: String,
        /// Word list URL or local file path
        #[arg(long)]
        wordlist: Option<String>,
    },

    /// Subdomains, then DNS and ports for everything found
    #[command(alias = "f")]
    Full {
        domain: String,
        /// Word list URL or local file path
        #[arg(long)]
        wordlist: Option<String>,
        /// Write the JSON report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// "url-or-path" option: anything with a scheme is a URL, the rest is
/// a file path.
pub fn wordlist_source(arg: &str) -> rekon_common::config::WordlistSource {
    use rekon_common::config::WordlistSource;
    if arg.starts_with("http://") || arg.starts_with("https://") {
        WordlistSource::Url(arg.to_string())
    } else {
        WordlistSource::File(arg.into())
    }
}

/// Parses "start-end" or a single port into an inclusive range.
pub fn parse_port_range(s: &str) -> anyhow::Result<(u16, u16)> {
    if let Some((a, b)) = s.split_once('-') {
        let start: u16 = a.trim().parse()?;
        let end: u16 = b.trim().parse()?;
        anyhow::ensure!(start >= 1 && start <= end, "invalid port range: {s}");
        Ok((start, end))
    } else {
        let port: u16 = s.trim().parse()?;
        anyhow::ensure!(port >= 1, "invalid port: {s}");
        Ok((port, port))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

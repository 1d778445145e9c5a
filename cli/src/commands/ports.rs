use std::net::IpAddr;
use std::time::Duration;

use colored::*;

use rekon_common::config::EngineConfig;
use rekon_common::ports::{PortScanResult, PortStatus};
use rekon_core::ports::PortScanner;

use super::parse_port_range;

pub async fn run(address: IpAddr, ports: Option<String>, timeout_ms: u64) -> anyhow::Result<()> {
    let cfg = EngineConfig {
        probe_timeout: Duration::from_millis(timeout_ms),
        ..EngineConfig::default()
    };
    let scanner = PortScanner::new(&cfg)?;

    let scan = match ports {
        Some(range) => {
            let (start, end) = parse_port_range(&range)?;
            scanner
                .scan_ports(address, move |port| port >= start && port <= end)
                .await
        }
        None => scanner.scan_all_ports(address).await,
    };

    print_result(&scan);
    Ok(())
}

fn print_result(scan: &PortScanResult) {
    println!("{}", scan.target.to_string().bold());

    let open = scan.open_ports();
    if open.is_empty() {
        println!("  {}", "no open ports".dimmed());
    }
    for result in scan.results.iter().filter(|r| r.status == PortStatus::Open) {
        println!(
            "  {:>5}/tcp  {}  {}ms",
            result.port.to_string().green().bold(),
            "open".green(),
            result.ping_ms
        );
    }

    println!("{}", scan.summary().dimmed());
}

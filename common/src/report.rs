//! # Export Report Shape
//!
//! The JSON document front-ends persist after a full reconnaissance
//! run. The engine fills these types in; serializing them is the
//! front-end's job.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::dns::DnsScanResult;
use crate::ports::PortScanResult;

#[derive(Clone, Debug, Serialize)]
pub struct ScanReport {
    pub scan_timestamp: u64,
    pub subdomains: Vec<SubdomainReport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubdomainReport {
    pub domain: String,
    pub dns_records: Vec<RecordReport>,
    pub name_servers: Vec<NameServerReport>,
    pub port_scans: Vec<PortScanReport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecordReport {
    #[serde(rename = "type")]
    pub rtype: String,
    pub ttl: i64,
    pub data: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct NameServerReport {
    pub name: String,
    pub responsive: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PortScanReport {
    pub ip: String,
    pub open_ports: Vec<u16>,
}

impl ScanReport {
    pub fn new(timestamp: SystemTime) -> Self {
        Self {
            scan_timestamp: epoch_millis(timestamp),
            subdomains: Vec::new(),
        }
    }
}

impl SubdomainReport {
    /// Builds the per-domain entry from one DNS scan and the port scans
    /// run against the addresses it discovered.
    pub fn from_results(dns: &DnsScanResult, port_scans: &[PortScanResult]) -> Self {
        Self {
            domain: dns.target.clone(),
            dns_records: dns
                .records
                .iter()
                .map(|r| RecordReport {
                    rtype: r.rtype.to_string(),
                    ttl: r.ttl,
                    data: r.data.clone(),
                })
                .collect(),
            name_servers: dns
                .name_server_checks
                .iter()
                .map(|c| NameServerReport {
                    name: c.server_name.clone(),
                    responsive: c.responsive,
                })
                .collect(),
            port_scans: port_scans
                .iter()
                .map(|p| PortScanReport {
                    ip: p.target.to_string(),
                    open_ports: p.open_ports(),
                })
                .collect(),
        }
    }
}

fn epoch_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

//! # Port Scan Result Model

use std::net::IpAddr;
use std::time::SystemTime;

use serde::Serialize;

/// Classification of a single TCP connect attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PortStatus {
    Open,
    Closed,
    Timeout,
}

/// Outcome of probing one port, including how long the attempt took
/// even when it failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PortResult {
    pub port: u16,
    pub status: PortStatus,
    pub ping_ms: u64,
}

/// Aggregate result of one port scan against one address.
///
/// The open/closed/timeout views are computed on demand rather than
/// stored, so the result stays a plain list in submission order.
#[derive(Clone, Debug, Serialize)]
pub struct PortScanResult {
    pub target: IpAddr,
    pub timestamp: SystemTime,
    pub results: Vec<PortResult>,
}

impl PortScanResult {
    pub fn open_ports(&self) -> Vec<u16> {
        self.ports_with(PortStatus::Open)
    }

    pub fn closed_ports(&self) -> Vec<u16> {
        self.ports_with(PortStatus::Closed)
    }

    pub fn timed_out_ports(&self) -> Vec<u16> {
        self.ports_with(PortStatus::Timeout)
    }

    fn ports_with(&self, status: PortStatus) -> Vec<u16> {
        self.results
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.port)
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} probed, {} open, {} closed, {} timed out",
            self.target,
            self.results.len(),
            self.open_ports().len(),
            self.closed_ports().len(),
            self.timed_out_ports().len()
        )
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

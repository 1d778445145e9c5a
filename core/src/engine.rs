//! # Engine Facade
//!
//! Explicitly constructed entry point for front-ends. The engine owns
//! the shared DNS socket and the per-component concurrency bounds; it
//! holds no global state, so callers keep and pass the handle they
//! built. `shutdown` consumes the engine, which makes use-after-
//! shutdown unrepresentable.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::SystemTime;

use tracing::info;

use rekon_common::config::{EngineConfig, WordlistSource};
use rekon_common::dns::{DnsScanResult, RecordType};
use rekon_common::ports::PortScanResult;
use rekon_common::report::{ScanReport, SubdomainReport};

use crate::dns::{DnsScanner, DnsTransport, system_resolvers};
use crate::ports::PortScanner;
use crate::resolve::{HostResolver, SystemResolver};
use crate::subdomain::SubdomainScanner;

pub struct Engine {
    dns: DnsScanner,
    ports: PortScanner,
    subdomains: SubdomainScanner,
}

impl Engine {
    /// Validates the configuration, binds the shared DNS socket and
    /// loads the word list. Fails fast on bad config or an unreadable
    /// word list source.
    pub async fn new(config: EngineConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let resolver: Arc<dyn HostResolver> = Arc::new(SystemResolver);
        let transport = Arc::new(
            DnsTransport::new(system_resolvers(), config.dns_transport_timeout).await?,
        );
        info!("using resolvers {:?}", transport.resolvers());

        let dns = DnsScanner::new(transport, Arc::clone(&resolver), &config);
        let ports = PortScanner::new(&config)?;
        let subdomains = SubdomainScanner::new(resolver, &config).await?;

        Ok(Self {
            dns,
            ports,
            subdomains,
        })
    }

    pub async fn scan_all_ports(&self, addr: IpAddr) -> PortScanResult {
        self.ports.scan_all_ports(addr).await
    }

    pub async fn scan_ports<F>(&self, addr: IpAddr, filter: F) -> PortScanResult
    where
        F: Fn(u16) -> bool,
    {
        self.ports.scan_ports(addr, filter).await
    }

    pub async fn scan_dns_entry(&self, domain: &str) -> anyhow::Result<DnsScanResult> {
        self.dns.scan(domain).await
    }

    pub async fn scan_sub_domain(&self, domain: &str) -> anyhow::Result<Vec<String>> {
        self.subdomains.scan_domain(domain).await
    }

    pub async fn scan_sub_domain_with(
        &self,
        domain: &str,
        source: &WordlistSource,
    ) -> anyhow::Result<Vec<String>> {
        self.subdomains.scan_domain_with(domain, source).await
    }

    /// Full reconnaissance run: enumerate subdomains, resolve each
    /// discovered FQDN (the root domain included), then port-scan
    /// every address the DNS scans surfaced.
    pub async fn full_scan(&self, domain: &str) -> anyhow::Result<ScanReport> {
        let mut report = ScanReport::new(SystemTime::now());

        let mut targets = vec![domain.trim_end_matches('.').to_string()];
        targets.extend(self.scan_sub_domain(domain).await?);
        targets.dedup();

        for target in &targets {
            let dns = self.scan_dns_entry(target).await?;

            let mut port_scans: Vec<PortScanResult> = Vec::new();
            for addr in address_records(&dns) {
                port_scans.push(self.scan_all_ports(addr).await);
            }

            report
                .subdomains
                .push(SubdomainReport::from_results(&dns, &port_scans));
        }

        Ok(report)
    }

    /// Releases pooled resources. Further calls are impossible by
    /// construction — the engine is gone.
    pub fn shutdown(self) {
        info!("engine shut down");
        drop(self);
    }
}

/// The distinct addresses found in a DNS scan's A and AAAA records.
fn address_records(dns: &DnsScanResult) -> Vec<IpAddr> {
    let mut out: Vec<IpAddr> = Vec::new();
    for record in dns
        .records_of(RecordType::A)
        .chain(dns.records_of(RecordType::Aaaa))
    {
        if let Ok(ip) = record.data.parse::<IpAddr>() {
            if !out.contains(&ip) {
                out.push(ip);
            }
        }
    }
    out
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use rekon_common::dns::DnsRecord;

    #[test]
    fn address_records_dedup_and_skip_garbage() {
        let dns = DnsScanResult {
            target: "example.com".into(),
            timestamp: SystemTime::now(),
            records: vec![
                DnsRecord::new("example.com", RecordType::A, 300, "10.0.0.1"),
                DnsRecord::new("example.com", RecordType::A, -1, "10.0.0.1"),
                DnsRecord::new("example.com", RecordType::Aaaa, 300, "2001:db8:0:0:0:0:0:1"),
                DnsRecord::new("example.com", RecordType::Txt, 300, "not an address"),
            ],
            name_server_checks: vec![],
        };
        let addrs = address_records(&dns);
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0], "10.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn invalid_config_fails_construction() {
        let cfg = EngineConfig {
            dns_pool_size: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::new(cfg).await.is_err());
    }
}

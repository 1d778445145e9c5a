//! # DNS Resolution Service
//!
//! Orchestrates a full domain scan: platform address resolution, a
//! bounded parallel fan-out over every record type the engine knows,
//! deduplication, and authoritative name-server discovery with a
//! responsiveness probe per server.
//!
//! Record-type lookups run in parallel; name servers are checked one
//! after another. The asymmetry is intentional: there are rarely more
//! than a handful of NS entries, while the record-type fan-out is the
//! latency-dominant part of the scan.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::stream::{self, StreamExt};
use tracing::debug;

use rekon_common::config::EngineConfig;
use rekon_common::dns::{
    DnsRecord, DnsScanResult, NameServerCheckResult, RecordType, SCANNED_TYPES, TTL_UNKNOWN,
};
use rekon_common::error::InputError;

use crate::dns::transport::DnsLookup;
use crate::resolve::HostResolver;

pub struct DnsScanner {
    transport: Arc<dyn DnsLookup>,
    resolver: Arc<dyn HostResolver>,
    pool_size: usize,
    lookup_timeout: Duration,
    resolver_test_timeout: Duration,
}

impl DnsScanner {
    pub fn new(
        transport: Arc<dyn DnsLookup>,
        resolver: Arc<dyn HostResolver>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            transport,
            resolver,
            pool_size: config.dns_pool_size,
            lookup_timeout: config.dns_lookup_timeout,
            resolver_test_timeout: config.resolver_test_timeout,
        }
    }

    /// Scans `domain` across every supported record type and checks
    /// each authoritative name server for responsiveness.
    pub async fn scan(&self, domain: &str) -> anyhow::Result<DnsScanResult> {
        let timestamp = SystemTime::now();
        let normalized = strip_trailing_dot(domain);
        if normalized.is_empty() {
            return Err(InputError::EmptyDomain.into());
        }

        let mut records: Vec<DnsRecord> = self.platform_records(normalized).await;
        records.extend(self.fan_out_lookups(normalized).await);

        let records = dedup_first_wins(records);

        let mut ns_names = distinct_ns_names(&records);
        if ns_names.is_empty() {
            // The parallel NS lookup may have timed out; give it one
            // more direct try before declaring the delegation unknown.
            let fallback = self.bounded_lookup(normalized, RecordType::Ns).await;
            ns_names = distinct_ns_names(&fallback);
        }

        let mut name_server_checks = Vec::with_capacity(ns_names.len());
        for ns in &ns_names {
            name_server_checks.push(self.check_name_server(ns, normalized).await);
        }

        let result = DnsScanResult {
            target: normalized.to_string(),
            timestamp,
            records,
            name_server_checks,
        };
        debug!("{}", result.short_summary());
        Ok(result)
    }

    /// Platform hostname resolution, classified as A or AAAA with an
    /// unknown TTL. Failure here is simply zero records.
    async fn platform_records(&self, name: &str) -> Vec<DnsRecord> {
        let lookup = self.resolver.resolve_host(name);
        let ips = tokio::time::timeout(self.lookup_timeout, lookup)
            .await
            .unwrap_or_default();

        ips.into_iter()
            .map(|ip| {
                let rtype = match ip {
                    IpAddr::V4(_) => RecordType::A,
                    IpAddr::V6(_) => RecordType::Aaaa,
                };
                DnsRecord::new(name, rtype, TTL_UNKNOWN, ip.to_string())
            })
            .collect()
    }

    /// One transport lookup per record type, at most `pool_size` in
    /// flight. Order does not matter; the merge deduplicates.
    async fn fan_out_lookups(&self, name: &str) -> Vec<DnsRecord> {
        stream::iter(SCANNED_TYPES)
            .map(|rtype| self.bounded_lookup(name, rtype))
            .buffer_unordered(self.pool_size)
            .collect::<Vec<Vec<DnsRecord>>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn bounded_lookup(&self, name: &str, rtype: RecordType) -> Vec<DnsRecord> {
        match tokio::time::timeout(self.lookup_timeout, self.transport.lookup(name, rtype)).await {
            Ok(records) => records,
            Err(_) => {
                debug!("{rtype} lookup for {name} timed out");
                Vec::new()
            }
        }
    }

    /// Resolves the name server's own addresses, then probes each with
    /// a query for the *original target* until one answers.
    async fn check_name_server(&self, ns_name: &str, target: &str) -> NameServerCheckResult {
        let lookup = self.resolver.resolve_host(ns_name);
        let resolved_addrs = tokio::time::timeout(self.lookup_timeout, lookup)
            .await
            .unwrap_or_default();

        let mut responsive = false;
        for ip in &resolved_addrs {
            if self
                .transport
                .test_resolver(*ip, target, self.resolver_test_timeout)
                .await
            {
                responsive = true;
                break;
            }
        }

        let error = if resolved_addrs.is_empty() {
            Some(format!("no addresses resolved for {ns_name}"))
        } else {
            None
        };

        NameServerCheckResult {
            server_name: ns_name.to_string(),
            resolved_addrs,
            responsive,
            error,
        }
    }
}

fn strip_trailing_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Keeps the first record per `(type, data)` key, preserving order.
fn dedup_first_wins(records: Vec<DnsRecord>) -> Vec<DnsRecord> {
    let mut seen: HashSet<(RecordType, String)> = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.rtype, r.data.clone())))
        .collect()
}

/// NS targets with the trailing dot stripped, first occurrence order.
fn distinct_ns_names(records: &[DnsRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for record in records.iter().filter(|r| r.rtype == RecordType::Ns) {
        let name = strip_trailing_dot(&record.data).to_string();
        if !out.contains(&name) {
            out.push(name);
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

#![cfg(test)]
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use rekon_common::config::{EngineConfig, WordlistSource};
use rekon_common::ports::PortStatus;
use rekon_core::ports::PortScanner;
use rekon_core::resolve::HostResolver;
use rekon_core::subdomain::SubdomainScanner;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Resolver that answers "exists" for a fixed set of names; the whole
/// pipeline is otherwise real.
struct FixedResolver {
    known: Vec<String>,
}

#[async_trait]
impl HostResolver for FixedResolver {
    async fn resolve_host(&self, name: &str) -> Vec<IpAddr> {
        if self.known.iter().any(|k| k == name) {
            vec![LOCALHOST]
        } else {
            Vec::new()
        }
    }
}

#[tokio::test]
async fn port_scan_finds_real_listeners_among_closed_ports() {
    let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_a = first.local_addr().unwrap().port();
    let open_b = second.local_addr().unwrap().port();

    let scanner = PortScanner::new(&EngineConfig::default()).unwrap();
    let scan = scanner
        .scan_ports(LOCALHOST, |port| {
            port == open_a || port == open_b || port == open_a.wrapping_sub(1)
        })
        .await;

    let open = scan.open_ports();
    assert!(open.contains(&open_a));
    assert!(open.contains(&open_b));
    assert!(scan
        .results
        .iter()
        .all(|r| r.status != PortStatus::Timeout));
}

#[tokio::test]
async fn subdomain_scan_reads_a_wordlist_file_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "www").unwrap();
    writeln!(file, "mail").unwrap();
    writeln!(file, "# not a candidate").unwrap();
    writeln!(file, "ftp").unwrap();

    let cfg = EngineConfig {
        wordlist: WordlistSource::File(file.path().to_path_buf()),
        ..EngineConfig::default()
    };
    let resolver = Arc::new(FixedResolver {
        known: vec!["www.example.com".into(), "mail.example.com".into()],
    });

    let scanner = SubdomainScanner::new(resolver, &cfg).await.unwrap();
    let found = scanner.scan_domain("example.com").await.unwrap();

    assert_eq!(found, vec!["mail.example.com", "www.example.com"]);
}

#[tokio::test]
async fn missing_wordlist_file_fails_construction() {
    let cfg = EngineConfig {
        wordlist: WordlistSource::File("/definitely/not/here.txt".into()),
        ..EngineConfig::default()
    };
    let resolver = Arc::new(FixedResolver { known: vec![] });
    assert!(SubdomainScanner::new(resolver, &cfg).await.is_err());
}

#[tokio::test]
async fn probe_timeout_bounds_the_slowest_path() {
    // A 25ms budget against a blackholed address must come back in
    // roughly that time, not hang the batch.
    let cfg = EngineConfig {
        probe_timeout: Duration::from_millis(25),
        ..EngineConfig::default()
    };
    let scanner = PortScanner::new(&cfg).unwrap();
    let blackhole: IpAddr = "192.0.2.1".parse().unwrap();

    let started = std::time::Instant::now();
    let scan = scanner.scan_ports(blackhole, |port| port <= 8).await;
    assert_eq!(scan.results.len(), 8);
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// Needs outbound DNS and HTTP; run manually.
#[tokio::test]
#[ignore]
async fn full_scan_against_a_live_domain() {
    use rekon_core::engine::Engine;

    let engine = Engine::new(EngineConfig::default()).await.unwrap();
    let result = engine.scan_dns_entry("example.com").await.unwrap();
    assert!(!result.records.is_empty());
    engine.shutdown();
}

//! # DNS Transport
//!
//! One UDP round trip per lookup against an ordered list of resolver
//! endpoints. Ordinary lookups share one socket per address family,
//! serialized behind a mutex; responsiveness probes open their own
//! ephemeral socket so they never interfere with concurrent lookups.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use rekon_common::dns::{DnsRecord, RecordType};
use rekon_protocols::dns as codec;

pub const DNS_PORT: u16 = 53;

/// Adequate for plain (non-EDNS0) responses; anything larger
/// truncates, which we accept.
const RECV_BUF_LEN: usize = 4096;

/// Well-known public resolvers used when none can be discovered.
const FALLBACK_RESOLVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
];

/// Resolver endpoints configured on this machine, or the public
/// fallback pair when discovery comes up empty.
pub fn system_resolvers() -> Vec<SocketAddr> {
    let mut out = resolv_conf_nameservers("/etc/resolv.conf");
    if out.is_empty() {
        out = FALLBACK_RESOLVERS
            .iter()
            .map(|ip| SocketAddr::new(*ip, DNS_PORT))
            .collect();
    }
    out
}

fn resolv_conf_nameservers(path: &str) -> Vec<SocketAddr> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };

    let mut out: Vec<SocketAddr> = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("nameserver") else {
            continue;
        };
        if let Ok(ip) = rest.trim().parse::<IpAddr>() {
            let addr = SocketAddr::new(ip, DNS_PORT);
            if !out.contains(&addr) {
                out.push(addr);
            }
        }
    }
    out
}

/// The lookup surface the resolution service depends on; implemented
/// by [`DnsTransport`] and by stubs in tests.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Queries `name`/`rtype` against the resolver list, returning the
    /// parsed records of the first resolver that completes a round
    /// trip. Total failure is an empty list, never an error.
    async fn lookup(&self, name: &str, rtype: RecordType) -> Vec<DnsRecord>;

    /// True iff `ip:53` sends *any* reply to an SOA query for `target`
    /// within `timeout`. Reply content is deliberately not validated.
    async fn test_resolver(&self, ip: IpAddr, target: &str, timeout: Duration) -> bool;
}

/// Shared lookup sockets, one per address family. A resolver is
/// reached through the socket matching its family; `send_to` across
/// families fails at the OS level.
struct LookupSockets {
    v4: UdpSocket,
    v6: Option<UdpSocket>,
}

impl LookupSockets {
    fn for_target(&self, target: SocketAddr) -> Option<&UdpSocket> {
        if target.is_ipv6() {
            self.v6.as_ref()
        } else {
            Some(&self.v4)
        }
    }
}

pub struct DnsTransport {
    resolvers: Vec<SocketAddr>,
    sockets: Mutex<LookupSockets>,
    recv_timeout: Duration,
}

impl DnsTransport {
    /// Binds the shared lookup sockets. Resolvers are tried in the
    /// order given. A host without an IPv6 stack keeps working; its
    /// IPv6 resolvers are skipped.
    pub async fn new(resolvers: Vec<SocketAddr>, recv_timeout: Duration) -> anyhow::Result<Self> {
        let v4 = UdpSocket::bind("0.0.0.0:0")
            .await
            .context("binding shared dns socket")?;
        let v6 = match UdpSocket::bind("[::]:0").await {
            Ok(socket) => Some(socket),
            Err(e) => {
                debug!("no ipv6 lookup socket: {e}");
                None
            }
        };
        Ok(Self {
            resolvers,
            sockets: Mutex::new(LookupSockets { v4, v6 }),
            recv_timeout,
        })
    }

    pub fn resolvers(&self) -> &[SocketAddr] {
        &self.resolvers
    }

    /// One send/receive round trip on the shared socket. Stray
    /// datagrams with a foreign transaction id are ignored until the
    /// receive window closes.
    async fn round_trip(&self, resolver: SocketAddr, query: &[u8]) -> anyhow::Result<Vec<u8>> {
        let want_id = codec::transaction_id(query);
        let sockets = self.sockets.lock().await;
        let socket = sockets
            .for_target(resolver)
            .with_context(|| format!("no local socket family for {resolver}"))?;
        socket
            .send_to(query, resolver)
            .await
            .with_context(|| format!("sending query to {resolver}"))?;

        let receive = async {
            let mut buf = vec![0u8; RECV_BUF_LEN];
            loop {
                let (len, _from) = socket
                    .recv_from(&mut buf)
                    .await
                    .context("receiving dns response")?;
                if codec::transaction_id(&buf[..len]) == want_id {
                    return anyhow::Ok(buf[..len].to_vec());
                }
                trace!("ignoring datagram with unexpected transaction id");
            }
        };

        tokio::time::timeout(self.recv_timeout, receive)
            .await
            .with_context(|| format!("no response from {resolver}"))?
    }
}

#[async_trait]
impl DnsLookup for DnsTransport {
    async fn lookup(&self, name: &str, rtype: RecordType) -> Vec<DnsRecord> {
        let qname = if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{name}.")
        };

        for resolver in &self.resolvers {
            let query = match codec::encode_query(&qname, rtype) {
                Ok(query) => query,
                Err(e) => {
                    debug!("cannot encode {rtype} query for {qname}: {e}");
                    return Vec::new();
                }
            };

            match self.round_trip(*resolver, &query).await {
                Ok(response) => return codec::decode_response(&response),
                Err(e) => {
                    debug!("{rtype} lookup via {resolver} failed: {e:#}");
                    continue;
                }
            }
        }
        Vec::new()
    }

    async fn test_resolver(&self, ip: IpAddr, target: &str, timeout: Duration) -> bool {
        probe_udp(SocketAddr::new(ip, DNS_PORT), target, timeout).await
    }
}

/// Sends an SOA query for `target` from a fresh ephemeral socket and
/// reports whether *any* bytes came back before the timeout.
async fn probe_udp(resolver: SocketAddr, target: &str, timeout: Duration) -> bool {
    let attempt = async {
        let bind_addr = if resolver.is_ipv6() {
            "[::]:0"
        } else {
            "0.0.0.0:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        let qname = if target.ends_with('.') {
            target.to_string()
        } else {
            format!("{target}.")
        };
        let query = codec::encode_query(&qname, RecordType::Soa)?;
        socket.send_to(&query, resolver).await?;
        let mut buf = vec![0u8; RECV_BUF_LEN];
        socket.recv_from(&mut buf).await?;
        anyhow::Ok(())
    };

    matches!(tokio::time::timeout(timeout, attempt).await, Ok(Ok(())))
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
    use std::io::Write;

    #[test]
    fn resolv_conf_parsing_picks_nameserver_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "search example.com").unwrap();
        writeln!(file, "nameserver 192.168.1.1").unwrap();
        writeln!(file, "nameserver 2606:4700:4700::1111").unwrap();
        writeln!(file, "nameserver 192.168.1.1").unwrap();
        writeln!(file, "nameserver not-an-ip").unwrap();

        let servers = resolv_conf_nameservers(file.path().to_str().unwrap());
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0], "192.168.1.1:53".parse().unwrap());
        assert_eq!(
            servers[1],
            SocketAddr::new("2606:4700:4700::1111".parse().unwrap(), 53)
        );
    }

    #[test]
    fn missing_resolv_conf_is_empty() {
        assert!(resolv_conf_nameservers("/does/not/exist").is_empty());
    }

    #[test]
    fn system_resolvers_never_empty() {
        assert!(!system_resolvers().is_empty());
    }

    #[tokio::test]
    async fn lookup_with_unreachable_resolvers_returns_empty() {
        // TEST-NET-1 never answers; both resolvers must be tried and
        // the failure degraded to an empty list.
        let resolvers = vec![
            "192.0.2.1:53".parse().unwrap(),
            "192.0.2.2:53".parse().unwrap(),
        ];
        let transport = DnsTransport::new(resolvers, Duration::from_millis(50))
            .await
            .unwrap();
        let records = transport.lookup("example.com", RecordType::A).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_against_silent_address_is_false() {
        let transport = DnsTransport::new(system_resolvers(), Duration::from_millis(50))
            .await
            .unwrap();
        let responsive = transport
            .test_resolver(
                "192.0.2.1".parse().unwrap(),
                "example.com",
                Duration::from_millis(50),
            )
            .await;
        assert!(!responsive);
    }

    #[tokio::test]
    async fn test_resolver_true_when_anything_replies() {
        // A local UDP "resolver" that echoes garbage still counts as
        // responsive; presence of a reply is the whole contract.
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            if let Ok((_, from)) = server.recv_from(&mut buf).await {
                let _ = server.send_to(b"anything", from).await;
            }
        });

        let responsive = probe_udp(server_addr, "example.com", Duration::from_secs(1)).await;
        assert!(responsive);
    }

    #[tokio::test]
    async fn probe_udp_reaches_an_ipv6_resolver() {
        let Ok(server) = UdpSocket::bind("[::1]:0").await else {
            return; // host without an ipv6 loopback
        };
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            if let Ok((_, from)) = server.recv_from(&mut buf).await {
                let _ = server.send_to(b"anything", from).await;
            }
        });

        let responsive = probe_udp(server_addr, "example.com", Duration::from_secs(1)).await;
        assert!(responsive);
    }
}

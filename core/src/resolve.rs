//! # Hostname Resolution Seam
//!
//! The engine never calls the platform resolver directly; it goes
//! through this trait so tests can substitute a deterministic stub.

use std::net::IpAddr;

use async_trait::async_trait;
use tracing::trace;

/// Resolves a hostname to its addresses via whatever mechanism the
/// implementation chooses. A name that does not exist (or any lookup
/// failure) is an empty list, never an error.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve_host(&self, name: &str) -> Vec<IpAddr>;
}

/// [`HostResolver`] backed by the operating system's resolver.
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve_host(&self, name: &str) -> Vec<IpAddr> {
        match tokio::net::lookup_host((name, 0u16)).await {
            Ok(addrs) => {
                let mut ips: Vec<IpAddr> = Vec::new();
                for addr in addrs {
                    if !ips.contains(&addr.ip()) {
                        ips.push(addr.ip());
                    }
                }
                ips
            }
            Err(e) => {
                trace!("platform resolution failed for {name}: {e}");
                Vec::new()
            }
        }
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

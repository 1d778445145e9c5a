//! Engine configuration.
//!
//! Every timeout and pool bound the engine honours lives here so that
//! front-ends can tune the scan profile without touching engine code.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::InputError;

/// Fallback word list used when the caller names no source of their own.
pub const DEFAULT_WORDLIST_URL: &str =
    "https://raw.githubusercontent.com/n0kovo/n0kovo_subdomains/refs/heads/main/n0kovo_subdomains_tiny.txt";

/// Where subdomain candidates are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordlistSource {
    Url(String),
    File(PathBuf),
}

impl WordlistSource {
    /// Source identity used as the cache key: URLs compare
    /// case-insensitively, file paths compare exactly.
    pub fn same_identity(&self, other: &WordlistSource) -> bool {
        match (self, other) {
            (WordlistSource::Url(a), WordlistSource::Url(b)) => a.eq_ignore_ascii_case(b),
            (WordlistSource::File(a), WordlistSource::File(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Connect timeout for a single TCP port probe.
    pub probe_timeout: Duration,
    /// Concurrent probes during a full port scan.
    pub port_pool_size: usize,
    /// Concurrent record-type lookups during a DNS scan.
    pub dns_pool_size: usize,
    /// Budget for one record-type lookup before it is treated as empty.
    pub dns_lookup_timeout: Duration,
    /// UDP receive timeout for one resolver round trip.
    pub dns_transport_timeout: Duration,
    /// Budget for one name-server responsiveness probe.
    pub resolver_test_timeout: Duration,
    /// Cap on in-flight subdomain resolvability checks.
    pub max_in_flight_lookups: usize,
    /// Budget for one subdomain resolvability check.
    pub subdomain_lookup_timeout: Duration,
    /// Word list the enumerator loads and caches at construction.
    pub wordlist: WordlistSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            probe_timeout: Duration::from_millis(500),
            port_pool_size: 200,
            dns_pool_size: 6,
            dns_lookup_timeout: Duration::from_secs(5),
            dns_transport_timeout: Duration::from_secs(3),
            resolver_test_timeout: Duration::from_secs(2),
            max_in_flight_lookups: (parallelism * 4).max(50),
            subdomain_lookup_timeout: Duration::from_secs(3),
            wordlist: WordlistSource::Url(DEFAULT_WORDLIST_URL.to_string()),
        }
    }
}

impl EngineConfig {
    /// Rejects configurations that would deadlock or starve the pools.
    pub fn validate(&self) -> Result<(), InputError> {
        for (what, got) in [
            ("port_pool_size", self.port_pool_size),
            ("dns_pool_size", self.dns_pool_size),
            ("max_in_flight_lookups", self.max_in_flight_lookups),
        ] {
            if got == 0 {
                return Err(InputError::InvalidConcurrency { what, got });
            }
        }
        Ok(())
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

//! # DNS Result Model
//!
//! Value types produced by the DNS codec and the resolution service.
//! All of them are created fresh per scan and never mutated after the
//! scan returns them.

use std::fmt;
use std::net::IpAddr;
use std::time::SystemTime;

use serde::Serialize;

/// TTL value used when a source (e.g. platform hostname resolution)
/// does not supply one.
pub const TTL_UNKNOWN: i64 = -1;

/// The record types the engine queries and knows how to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RecordType {
    A,
    Ns,
    Cname,
    Soa,
    Mx,
    Txt,
    Aaaa,
}

/// Every type a domain scan fans out over.
pub const SCANNED_TYPES: [RecordType; 7] = [
    RecordType::A,
    RecordType::Aaaa,
    RecordType::Cname,
    RecordType::Mx,
    RecordType::Ns,
    RecordType::Txt,
    RecordType::Soa,
];

impl RecordType {
    /// RFC 1035 / 3596 TYPE value.
    pub fn to_u16(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
        }
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordType::A),
            2 => Some(RecordType::Ns),
            5 => Some(RecordType::Cname),
            6 => Some(RecordType::Soa),
            15 => Some(RecordType::Mx),
            16 => Some(RecordType::Txt),
            28 => Some(RecordType::Aaaa),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordType::A => "A",
            RecordType::Ns => "NS",
            RecordType::Cname => "CNAME",
            RecordType::Soa => "SOA",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Aaaa => "AAAA",
        };
        f.write_str(s)
    }
}

/// One resource record as seen by this scan.
///
/// `ttl` is [`TTL_UNKNOWN`] when the producing source had none to give.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    pub name: String,
    pub rtype: RecordType,
    pub ttl: i64,
    pub data: String,
}

impl DnsRecord {
    pub fn new(name: impl Into<String>, rtype: RecordType, ttl: i64, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rtype,
            ttl,
            data: data.into(),
        }
    }

    /// Deduplication key: two records are the same answer when type and
    /// payload match, regardless of TTL.
    pub fn dedup_key(&self) -> (RecordType, &str) {
        (self.rtype, self.data.as_str())
    }
}

/// Outcome of probing one authoritative name server.
#[derive(Clone, Debug, Serialize)]
pub struct NameServerCheckResult {
    pub server_name: String,
    pub resolved_addrs: Vec<IpAddr>,
    pub responsive: bool,
    pub error: Option<String>,
}

/// Aggregate result of one domain scan.
#[derive(Clone, Debug, Serialize)]
pub struct DnsScanResult {
    pub target: String,
    pub timestamp: SystemTime,
    pub records: Vec<DnsRecord>,
    pub name_server_checks: Vec<NameServerCheckResult>,
}

impl DnsScanResult {
    /// All records of one type, in discovery order.
    pub fn records_of(&self, rtype: RecordType) -> impl Iterator<Item = &DnsRecord> {
        self.records.iter().filter(move |r| r.rtype == rtype)
    }

    pub fn short_summary(&self) -> String {
        let responsive = self
            .name_server_checks
            .iter()
            .filter(|c| c.responsive)
            .count();
        format!(
            "{}: {} records, {}/{} name servers responsive",
            self.target,
            self.records.len(),
            responsive,
            self.name_server_checks.len()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_wire_values_round_trip() {
        for rtype in SCANNED_TYPES {
            assert_eq!(RecordType::from_u16(rtype.to_u16()), Some(rtype));
        }
        assert_eq!(RecordType::from_u16(255), None);
    }

    #[test]
    fn record_types_are_orderable_for_stable_comparisons() {
        let mut types = vec![RecordType::Txt, RecordType::A, RecordType::Mx];
        types.sort();
        assert_eq!(types, vec![RecordType::A, RecordType::Mx, RecordType::Txt]);
    }

    #[test]
    fn dedup_key_ignores_ttl() {
        let a = DnsRecord::new("example.com", RecordType::A, 300, "93.184.216.34");
        let b = DnsRecord::new("example.com", RecordType::A, TTL_UNKNOWN, "93.184.216.34");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn summary_counts_responsive_servers() {
        let result = DnsScanResult {
            target: "example.com".into(),
            timestamp: SystemTime::now(),
            records: vec![],
            name_server_checks: vec![
                NameServerCheckResult {
                    server_name: "ns1.example.com".into(),
                    resolved_addrs: vec![],
                    responsive: true,
                    error: None,
                },
                NameServerCheckResult {
                    server_name: "ns2.example.com".into(),
                    resolved_addrs: vec![],
                    responsive: false,
                    error: None,
                },
            ],
        };
        assert_eq!(
            result.short_summary(),
            "example.com: 0 records, 1/2 name servers responsive"
        );
    }
}

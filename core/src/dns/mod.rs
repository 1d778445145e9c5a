//! DNS client plumbing: the UDP transport with resolver fallback and
//! the resolution service that orchestrates a full domain scan.

pub mod scanner;
pub mod transport;

pub use scanner::DnsScanner;
pub use transport::{DnsLookup, DnsTransport, system_resolvers};

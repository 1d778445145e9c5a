//! # Rekon Protocols
//!
//! Hand-rolled wire codecs. Currently only the RFC 1035 subset the
//! reconnaissance engine speaks: query encoding and response decoding
//! for A, NS, CNAME, SOA, MX, TXT and AAAA records.

pub mod dns;

//! # Rekon Core
//!
//! The scanning engine: DNS transport and resolution service, TCP port
//! scan orchestration and subdomain enumeration, tied together by the
//! [`engine::Engine`] facade.
//!
//! Aggregate operations degrade gracefully: a slow or unreachable host
//! costs only its own timeout and never fails the batch. Callers get a
//! structurally complete result even when most probes came back empty.

pub mod dns;
pub mod engine;
pub mod ports;
pub mod resolve;
pub mod subdomain;

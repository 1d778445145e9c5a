//! # Rekon Common
//!
//! Shared data model for the reconnaissance engine: configuration,
//! DNS and port scan result types, input errors and the export report
//! shape consumed by front-ends.

pub mod config;
pub mod dns;
pub mod error;
pub mod ports;
pub mod report;

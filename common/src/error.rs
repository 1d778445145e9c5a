//! Typed errors for caller mistakes.
//!
//! Transient network failures never surface through these: a timed-out
//! probe or an unreachable resolver degrades to an empty result at the
//! call site. Only malformed input and invalid configuration are worth
//! a real error value.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("domain name must not be empty")]
    EmptyDomain,

    #[error("dns query name must not be empty")]
    EmptyQueryName,

    #[error("{what} must be greater than zero (got {got})")]
    InvalidConcurrency { what: &'static str, got: usize },
}

//! # Subdomain Enumerator
//!
//! Brute-forces `label.rootDomain` candidates from a word list against
//! the platform resolver. The word list is fetched once at
//! construction and shared read-only across concurrent scans; a scan
//! naming a different source loads a single-use list instead.
//!
//! Resolvability checks race ahead with bounded in-flight concurrency
//! and are drained in completion order; the final output is sorted, so
//! observable ordering stays deterministic regardless of timing.

use std::collections::BTreeSet;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use flate2::read::GzDecoder;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use rekon_common::config::{EngineConfig, WordlistSource};
use rekon_common::error::InputError;

use crate::resolve::HostResolver;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_READ_TIMEOUT: Duration = Duration::from_secs(120);
const USER_AGENT: &str = concat!("rekon/", env!("CARGO_PKG_VERSION"));

/// A sanitized candidate list tied to the source it was loaded from.
#[derive(Clone, Debug)]
pub struct Wordlist {
    source: WordlistSource,
    entries: Vec<String>,
}

impl Wordlist {
    /// Fetches and sanitizes a word list. HTTP sources are gzip-decoded
    /// transparently when the encoding header or a `.gz` suffix says so.
    pub async fn load(source: &WordlistSource) -> anyhow::Result<Self> {
        let raw = match source {
            WordlistSource::Url(url) => fetch_url(url).await?,
            WordlistSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading word list {}", path.display()))?,
        };

        let entries: Vec<String> = raw.lines().filter_map(sanitize_line).collect();
        info!("loaded {} candidates from {source:?}", entries.len());

        Ok(Self {
            source: source.clone(),
            entries,
        })
    }

    pub fn from_entries(source: WordlistSource, entries: Vec<String>) -> Self {
        Self { source, entries }
    }

    pub fn source(&self) -> &WordlistSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn fetch_url(url: &str) -> anyhow::Result<String> {
    let client = reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_READ_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("building http client")?;

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("fetching word list {url}"))?;

    let gzipped = response
        .headers()
        .get(reqwest::header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("gzip"))
        || url.to_ascii_lowercase().ends_with(".gz");

    let body = response.bytes().await.context("reading word list body")?;

    if gzipped {
        let mut text = String::new();
        GzDecoder::new(body.as_ref())
            .read_to_string(&mut text)
            .context("gunzipping word list")?;
        Ok(text)
    } else {
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Trims, drops blanks and `#` comments, strips edge dots and rejects
/// anything outside `[A-Za-z0-9.-]`.
fn sanitize_line(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() || s.starts_with('#') {
        return None;
    }
    let s = s.trim_matches('.');
    if s.is_empty() {
        return None;
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return None;
    }
    Some(s.to_string())
}

pub struct SubdomainScanner {
    resolver: Arc<dyn HostResolver>,
    cached: Arc<Wordlist>,
    max_in_flight: usize,
    lookup_timeout: Duration,
}

impl SubdomainScanner {
    /// Loads and caches the configured word list.
    pub async fn new(
        resolver: Arc<dyn HostResolver>,
        config: &EngineConfig,
    ) -> anyhow::Result<Self> {
        if config.max_in_flight_lookups == 0 {
            return Err(InputError::InvalidConcurrency {
                what: "max_in_flight_lookups",
                got: 0,
            }
            .into());
        }
        let cached = Arc::new(Wordlist::load(&config.wordlist).await?);
        Ok(Self::with_wordlist(resolver, cached, config))
    }

    /// Builds a scanner around an already-loaded list. Used by tests
    /// and by callers that manage word lists themselves.
    pub fn with_wordlist(
        resolver: Arc<dyn HostResolver>,
        cached: Arc<Wordlist>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            resolver,
            cached,
            max_in_flight: config.max_in_flight_lookups,
            lookup_timeout: config.subdomain_lookup_timeout,
        }
    }

    pub fn cached_wordlist(&self) -> &Arc<Wordlist> {
        &self.cached
    }

    /// Enumerates `root_domain` with the cached word list, returning
    /// the sorted, distinct FQDNs that resolve.
    pub async fn scan_domain(&self, root_domain: &str) -> anyhow::Result<Vec<String>> {
        let list = Arc::clone(&self.cached);
        self.scan_with(root_domain, list).await
    }

    /// Same, but with an explicit source. A source with the cached
    /// identity reuses the cache; anything else is loaded single-use.
    pub async fn scan_domain_with(
        &self,
        root_domain: &str,
        source: &WordlistSource,
    ) -> anyhow::Result<Vec<String>> {
        let list = if source.same_identity(self.cached.source()) {
            Arc::clone(&self.cached)
        } else {
            debug!("word list {source:?} bypasses the cache");
            Arc::new(Wordlist::load(source).await?)
        };
        self.scan_with(root_domain, list).await
    }

    async fn scan_with(
        &self,
        root_domain: &str,
        list: Arc<Wordlist>,
    ) -> anyhow::Result<Vec<String>> {
        let root = root_domain.trim().trim_matches('.');
        if root.is_empty() {
            return Err(InputError::EmptyDomain.into());
        }

        info!(
            "enumerating {root} with {} candidates, {} in flight",
            list.len(),
            self.max_in_flight
        );

        let found: BTreeSet<String> = stream::iter(list.entries.iter())
            .map(|label| {
                let fqdn = format!("{label}.{root}");
                async move {
                    if self.resolves(&fqdn).await {
                        debug!("found {fqdn}");
                        Some(fqdn)
                    } else {
                        None
                    }
                }
            })
            .buffer_unordered(self.max_in_flight)
            .filter_map(|hit| async move { hit })
            .collect()
            .await;

        Ok(found.into_iter().collect())
    }

    /// Timeout and resolution failure both mean "does not exist".
    async fn resolves(&self, fqdn: &str) -> bool {
        tokio::time::timeout(self.lookup_timeout, self.resolver.resolve_host(fqdn))
            .await
            .map(|ips| !ips.is_empty())
            .unwrap_or(false)
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

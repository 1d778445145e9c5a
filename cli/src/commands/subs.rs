use std::sync::Arc;

use colored::*;

use rekon_common::config::EngineConfig;
use rekon_core::resolve::SystemResolver;
use rekon_core::subdomain::SubdomainScanner;

use super::wordlist_source;

pub async fn run(domain: &str, wordlist: Option<String>) -> anyhow::Result<()> {
    let mut cfg = EngineConfig::default();
    if let Some(arg) = wordlist {
        cfg.wordlist = wordlist_source(&arg);
    }

    let scanner = SubdomainScanner::new(Arc::new(SystemResolver), &cfg).await?;
    let found = scanner.scan_domain(domain).await?;

    if found.is_empty() {
        println!("{}", "no subdomains found".dimmed());
        return Ok(());
    }

    for fqdn in &found {
        println!("{}", fqdn.green());
    }
    println!(
        "{}",
        format!("{} live subdomains under {domain}", found.len()).dimmed()
    );
    Ok(())
}

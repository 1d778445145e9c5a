use std::sync::Arc;

use colored::*;

use rekon_common::config::EngineConfig;
use rekon_common::dns::DnsScanResult;
use rekon_core::dns::{DnsScanner, DnsTransport, system_resolvers};
use rekon_core::resolve::SystemResolver;

pub async fn run(domain: &str) -> anyhow::Result<()> {
    let cfg = EngineConfig::default();
    let transport = Arc::new(
        DnsTransport::new(system_resolvers(), cfg.dns_transport_timeout).await?,
    );
    let scanner = DnsScanner::new(transport, Arc::new(SystemResolver), &cfg);

    let result = scanner.scan(domain).await?;
    print_result(&result);
    Ok(())
}

fn print_result(result: &DnsScanResult) {
    println!("{}", result.target.bold());

    if result.records.is_empty() {
        println!("  {}", "no records found".dimmed());
    }
    for record in &result.records {
        let ttl = if record.ttl < 0 {
            "-".to_string()
        } else {
            record.ttl.to_string()
        };
        println!(
            "  {:<6} {:>8}  {}",
            record.rtype.to_string().cyan(),
            ttl.dimmed(),
            record.data
        );
    }

    if !result.name_server_checks.is_empty() {
        println!("{}", "name servers".bold());
        for check in &result.name_server_checks {
            let status = if check.responsive {
                "responsive".green()
            } else {
                "unresponsive".red()
            };
            println!("  {:<30} {}", check.server_name, status);
            if let Some(error) = &check.error {
                println!("    {}", error.dimmed());
            }
        }
    }

    println!("{}", result.short_summary().dimmed());
}

use std::path::PathBuf;

use anyhow::Context;
use colored::*;
use tracing::info;

use rekon_common::config::EngineConfig;
use rekon_core::engine::Engine;

use super::wordlist_source;

pub async fn run(
    domain: &str,
    wordlist: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut cfg = EngineConfig::default();
    if let Some(arg) = wordlist {
        cfg.wordlist = wordlist_source(&arg);
    }

    let engine = Engine::new(cfg).await?;
    let report = engine.full_scan(domain).await?;
    engine.shutdown();

    let json = serde_json::to_string_pretty(&report).context("serializing report")?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("writing report to {}", path.display()))?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    println!(
        "{}",
        format!("{} hosts surveyed under {domain}", report.subdomains.len())
            .bold()
            .green()
    );
    Ok(())
}

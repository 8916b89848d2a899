//! Decide command implementation

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use cascade::domain::keys;
use cascade::hook::CascadeHook;
use cascade::store::{self, CollectingSink, DirSink, FileFindings, StaticRules};

/// Run one offline decision pass and show (or write) the scans it produces.
pub async fn decide_command(
    scan_path: &Path,
    findings_path: &Path,
    rules_path: &Path,
    parse_definition_path: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let scan = store::load_scan(scan_path).context("loading scan manifest")?;
    let rules = StaticRules::from_files(rules_path, parse_definition_path)
        .context("loading cascading rules")?;
    let findings = FileFindings::new(findings_path);

    if let Some(dir) = out {
        let hook = CascadeHook::new(findings, rules, DirSink::new(dir)?);
        let submitted = hook.handle(&scan).await?;
        println!(
            "Wrote {submitted} cascading scan manifest(s) to {}",
            dir.display()
        );
        return Ok(());
    }

    let sink = Arc::new(CollectingSink::new());
    let hook = CascadeHook::new(findings, rules, Arc::clone(&sink));
    hook.handle(&scan).await?;
    let scans = sink.take();

    if scans.is_empty() {
        println!("No cascading scans triggered.");
        return Ok(());
    }

    println!("{} cascading scan(s):\n", scans.len());
    for cascading_scan in &scans {
        let name = cascading_scan
            .metadata
            .generate_name
            .as_deref()
            .unwrap_or("<unnamed>");
        println!(
            "  {}  [{}] {}",
            name,
            cascading_scan.spec.scan_type,
            cascading_scan.spec.parameters.join(" ")
        );
        if let Some(finding) = cascading_scan.annotation(keys::MATCHED_FINDING_ANNOTATION) {
            println!("    matched finding: {}", finding);
        }
        if let Some(chain) = cascading_scan.annotation(keys::CHAIN_ANNOTATION) {
            println!("    chain: {}", chain);
        }
        println!();
    }

    Ok(())
}

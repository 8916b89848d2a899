//! Chain command implementation

use anyhow::{Context, Result};
use std::path::Path;

use cascade::engine::ScanChain;
use cascade::store;

/// Print the rule chain that produced a scan.
pub fn chain_command(scan_path: &Path) -> Result<()> {
    let scan = store::load_scan(scan_path).context("loading scan manifest")?;
    let chain = ScanChain::of(&scan);

    if chain.is_empty() {
        println!("{}: root scan, no cascading rules applied", scan.name());
        return Ok(());
    }

    println!("{}: {} rule(s) applied", scan.name(), chain.len());
    for (index, rule) in chain.iter().enumerate() {
        println!("  {}. {}", index + 1, rule);
    }
    Ok(())
}

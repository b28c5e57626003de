use crate::cli::{open_engine, Cli};
use anyhow::Result;
use swapmatch_core::RequestKind;

pub fn run(cli: &Cli) -> Result<()> {
    let stats = open_engine(cli)?.stats()?;

    println!();
    println!("Store Overview");
    println!("{}", "─".repeat(40));
    println!("Requests:  {:>8}", stats.request_count);
    for kind in [RequestKind::Preference, RequestKind::Cycle] {
        let count = stats.request_counts_by_kind.get(&kind).copied().unwrap_or(0);
        println!("  {:14} {:>8}", kind, count);
    }
    println!("Interests: {:>8}", stats.interest_count);
    println!("{}", "─".repeat(40));
    println!();

    Ok(())
}

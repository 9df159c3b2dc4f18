//! Command implementations for sonar-sync
//!
//! Each command splits into a function computing its result against any
//! [`CodacyApi`](sonar_sync_core::CodacyApi) and a `run_*` entry point that
//! builds the HTTP client and prints.

pub mod check;
pub mod defaults;
pub mod import;
pub mod probe;
pub mod verify;

pub use check::run_check;
pub use defaults::run_defaults;
pub use import::{ImportOptions, run_import};
pub use probe::run_probe;
pub use verify::run_verify;

use std::collections::BTreeSet;

use colored::Colorize;
use serde::Serialize;
use sonar_sync_core::Reconciliation;

use crate::error::Result;

/// Pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Key list under a heading, skipped when empty
pub(crate) fn print_keys(heading: &str, marker: &str, keys: &BTreeSet<String>) {
    if keys.is_empty() {
        return;
    }
    println!();
    println!("{} ({}):", heading.bold(), keys.len());
    for key in keys {
        println!("   {} {}", marker, key);
    }
}

pub(crate) fn print_summary(result: &Reconciliation, remote_label: &str) {
    println!();
    println!("{}", "Summary".bold());
    println!("   Rules in XML:        {}", result.xml_total);
    println!("   {:<21}{}", format!("{}:", remote_label), result.remote_total);
    println!("   Missing from Codacy: {}", result.missing_remote.len());
    println!("   Extra in Codacy:     {}", result.extra_remote.len());
    println!("   Matching:            {}", result.matching.len());
}

//! Plan inspection commands
//!
//! Implements `--list` (dependency table) and `--dry-run` (build plan and
//! rendered backend arguments).

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use super::Session;
use crate::core::packages::DependencyTable;

/// One row of `--list` output
#[derive(Debug, Serialize)]
struct PackageEntry<'a> {
    name: &'a str,
    depends: &'a [String],
}

/// `--dry-run` output
#[derive(Debug, Serialize)]
struct DryRun<'a> {
    source_root: &'a PathBuf,
    packages: &'a [String],
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_prefix: Option<PathBuf>,
}

/// Print the dependency table
///
/// Packages appear in default order, followed by any package the default
/// order leaves out, by name.
pub fn list(table: &DependencyTable, json: bool) -> Result<()> {
    let entries = list_entries(table);

    if json {
        let out = serde_json::to_string_pretty(&entries).context("Failed to serialize table")?;
        println!("{out}");
        return Ok(());
    }

    for line in list_lines(&entries) {
        println!("{line}");
    }
    Ok(())
}

/// Print the build plan without building
pub fn dry_run(session: &Session, json: bool) -> Result<()> {
    let report = DryRun {
        source_root: &session.source_root,
        packages: session.plan.packages(),
        args: session.config.backend_args(),
        stage_dir: session.config.install().stage_dir().map(PathBuf::from),
        test_prefix: session.config.test_prefix(),
    };

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize plan")?;
        println!("{out}");
        return Ok(());
    }

    println!("Source root: {}", report.source_root.display());
    println!("Build plan ({} packages):", report.packages.len());
    for (i, package) in report.packages.iter().enumerate() {
        println!("  {}. {package}", i + 1);
    }
    println!("Backend arguments: {}", report.args.join(" "));
    if let Some(prefix) = &report.test_prefix {
        println!("Tests: against {}", prefix.display());
    }
    Ok(())
}

fn list_entries(table: &DependencyTable) -> Vec<PackageEntry<'_>> {
    let ordered: HashSet<&str> = table.default_order().iter().map(String::as_str).collect();
    table
        .default_order()
        .iter()
        .map(String::as_str)
        .chain(table.names().filter(|name| !ordered.contains(name)))
        .map(|name| PackageEntry {
            name,
            depends: table.lookup(name).unwrap_or_default(),
        })
        .collect()
}

fn list_lines(entries: &[PackageEntry<'_>]) -> Vec<String> {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| {
            if e.depends.is_empty() {
                e.name.to_string()
            } else {
                format!("{:width$}  <- {}", e.name, e.depends.join(", "))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_list_lines_follow_default_order() {
        let table = DependencyTable::casacore();
        let entries = list_entries(&table);

        let lines = list_lines(&entries);
        assert_eq!(lines.len(), table.len());
        assert_eq!(lines[0], "casa");
        assert_eq!(lines[1], "tables       <- casa");
        assert!(lines.last().unwrap().starts_with("msfits"));
    }

    #[test]
    fn test_list_includes_packages_outside_default_order() {
        let depends: BTreeMap<String, Vec<String>> = [
            ("casa", vec![]),
            ("tables", vec!["casa"]),
            ("fits", vec!["casa"]),
        ]
        .into_iter()
        .map(|(name, deps)| {
            (
                name.to_string(),
                deps.into_iter().map(String::from).collect(),
            )
        })
        .collect();
        let table = DependencyTable::new(depends, Some(vec!["casa".to_string()])).unwrap();

        let names: Vec<&str> = list_entries(&table).iter().map(|e| e.name).collect();

        assert_eq!(names, ["casa", "fits", "tables"]);
        assert_eq!(names.len(), table.len());
    }
}

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::PackageRecord;
use crate::repair::RepairOutcome;

/// Write the repair summary log: per-bucket counts followed by a numbered
/// `name@version` list for each bucket.
pub fn write(path: &Path, defective: &[PackageRecord], outcome: &RepairOutcome) -> Result<()> {
    std::fs::write(path, render(defective, outcome))
        .with_context(|| format!("failed to write repair log {}", path.display()))
}

pub fn render(defective: &[PackageRecord], outcome: &RepairOutcome) -> String {
    let fixed: HashSet<String> = outcome.fixed.iter().map(PackageRecord::key).collect();
    let unfixed: Vec<String> = defective
        .iter()
        .map(PackageRecord::key)
        .filter(|key| !fixed.contains(key))
        .collect();

    let mut out = String::from("license-fixr repair summary\n");
    out.push_str("===========================\n\n");
    out.push_str(&format!("defective records:   {}\n", defective.len()));
    out.push_str(&format!("extracted from text: {}\n", outcome.log.extracted.len()));
    out.push_str(&format!("fetched from github: {}\n", outcome.log.github.len()));
    out.push_str(&format!("synthesized:         {}\n", outcome.log.generated.len()));
    out.push_str(&format!("unfixable:           {}\n", unfixed.len()));

    bucket(&mut out, "Defective", &defective.iter().map(PackageRecord::key).collect::<Vec<_>>());
    bucket(&mut out, "Extracted from license text", &outcome.log.extracted);
    bucket(&mut out, "Fetched from repository", &outcome.log.github);
    bucket(&mut out, "Synthesized from template", &outcome.log.generated);
    bucket(&mut out, "Unfixable (dropped from the appendix)", &unfixed);

    out
}

fn bucket(out: &mut String, title: &str, keys: &[String]) {
    if keys.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", title));
    for (i, key) in keys.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, key));
    }
}

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::models::{FixStatus, PackageRecord};
use crate::repair::RepairOutcome;

/// Render a colored console summary of the repair run.
pub fn render(
    records: &[PackageRecord],
    defective: &[PackageRecord],
    outcome: &RepairOutcome,
    output: &Path,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let total = records.len();
    let fixed_keys: HashSet<String> = outcome.fixed.iter().map(PackageRecord::key).collect();
    let unfixed: Vec<&PackageRecord> = defective
        .iter()
        .filter(|record| !fixed_keys.contains(&record.key()))
        .collect();

    if quiet {
        println!(
            "Total: {}  Defective: {}  Fixed: {}  Unfixed: {}",
            total,
            defective.len(),
            outcome.log.fixed_count().to_string().green(),
            unfixed.len().to_string().red(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "license-fixr".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Appendix: {}\n", output.display());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total packages     : {}", total));
    println!(
        " │  {:<48} │",
        format!("Defective records  : {}", defective.len())
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Extracted       : {:>4}",
            "✓".green(),
            outcome.log.extracted.len()
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Fetched         : {:>4}",
            "✓".green(),
            outcome.log.github.len()
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Synthesized     : {:>4}",
            "✓".green(),
            outcome.log.generated.len()
        )
    );
    println!(
        " │  {:<48} │",
        format!("{}  Unfixable       : {:>4}", "✗".red(), unfixed.len())
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if !unfixed.is_empty() {
        println!(
            " {} Dropped from the appendix (no license text recovered):\n",
            "[UNFIXED]".red().bold()
        );
        let mut table = new_table(vec!["Name", "Version", "License(s)", "License file"]);
        for record in &unfixed {
            table.add_row(vec![
                Cell::new(&record.name),
                Cell::new(&record.version),
                Cell::new(record.licenses.to_string()),
                Cell::new(&record.license_file),
            ]);
        }
        println!("{}\n", table);
    }

    if verbose && !outcome.fixed.is_empty() {
        println!(" {} Repaired records:\n", "[FIXED]".green().bold());
        let mut table = new_table(vec!["Name", "Version", "License(s)", "Repaired via"]);
        for record in &outcome.fixed {
            let via_color = match record.fix_status {
                FixStatus::ExtractedFromText => comfy_table::Color::Cyan,
                FixStatus::FetchedRemote => comfy_table::Color::Blue,
                FixStatus::Synthesized => comfy_table::Color::Yellow,
                FixStatus::Unresolved => comfy_table::Color::DarkGrey,
            };
            table.add_row(vec![
                Cell::new(&record.name),
                Cell::new(&record.version),
                Cell::new(record.licenses.to_string()),
                Cell::new(record.fix_status.to_string()).fg(via_color),
            ]);
        }
        println!("{}\n", table);
    }

    Ok(())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

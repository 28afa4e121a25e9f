//! `license-fixr` — repair dependency license records and emit a license appendix.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Read the package inspector's scan result ([`inspector`]).
//! 4. Partition out defective records — no license file, or text sourced
//!    from a README ([`models::PackageRecord::is_defective`]).
//! 5. Run the repair pipeline: extraction → repository lookup → template
//!    synthesis ([`repair`]).
//! 6. Merge repaired text back and write the appendix ([`report::appendix`]).
//! 7. Print the console summary and the optional repair log ([`report`]).

mod cli;
mod config;
mod inspector;
mod models;
mod repair;
mod report;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;

use cli::Cli;
use config::load_config;
use models::PackageRecord;
use repair::templates::TemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Fail before any network work if the appendix can't be written
    let output_dir = cli.output.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = output_dir {
        if !dir.is_dir() {
            bail!("output directory {} does not exist", dir.display());
        }
    }

    let config = load_config(cli.config.as_deref())?;

    let store = match &config.templates.dir {
        Some(dir) => TemplateStore::from_dir(dir)?,
        None => TemplateStore::bundled(),
    };

    if !cli.quiet {
        eprintln!("  {} processing {}", "→".cyan(), cli.input.display());
    }

    let mut records = inspector::load_records(&cli.input)?;

    let defective: Vec<PackageRecord> = records
        .iter()
        .filter(|record| record.is_defective())
        .cloned()
        .collect();

    if !cli.quiet {
        eprintln!(
            "  {} {} packages, {} with defective license records",
            "→".cyan(),
            records.len(),
            defective.len()
        );
    }

    let auth_token = cli.auth.clone().or_else(|| config.github.token.clone());
    if auth_token.is_none() && !cli.quiet {
        eprintln!(
            "  {} no auth token; skipping the repository lookup stage",
            "⚠".yellow()
        );
    }

    let outcome = repair::fix_license_errors(
        &defective,
        auth_token.as_deref(),
        &store,
        &config,
        cli.quiet,
    )
    .await?;

    repair::apply_fixes(&mut records, &outcome.fixed);

    // Unfixable records are dropped from the appendix; the repair log is the
    // only place they surface.
    records.retain(|record| !record.is_defective() || record.fix_status.is_fixed());

    report::appendix::write(&records, &cli.output, &cli.format)?;

    if let Some(log_path) = &cli.log {
        report::summary::write(log_path, &defective, &outcome)?;
        if !cli.quiet {
            eprintln!("  {} repair log written to {}", "→".cyan(), log_path.display());
        }
    }

    report::terminal::render(
        &records,
        &defective,
        &outcome,
        &cli.output,
        cli.verbose,
        cli.quiet,
    )?;

    Ok(())
}

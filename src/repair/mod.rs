//! Best-effort repair of defective license records.
//!
//! Three stages run in strict order, each only over records no earlier stage
//! fixed: [`extract`] pulls an embedded license section out of README-style
//! text, [`github`] looks for a real license file in the package's source
//! repository (only when a token was supplied), and [`templates`] falls back
//! to synthesizing text from a canonical template. The first stage to
//! succeed owns the record.

pub mod extract;
pub mod github;
pub mod templates;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::models::{FixLog, FixStatus, PackageRecord};
use templates::TemplateStore;

/// What a repair run produced: the records that were fixed, and which stage
/// fixed each of them.
#[derive(Debug)]
pub struct RepairOutcome {
    pub fixed: Vec<PackageRecord>,
    pub log: FixLog,
}

/// Run the repair pipeline over the defective records.
///
/// Records that no stage could fix are dropped from the result; partial
/// success is the expected terminal shape. A fetch-stage failure (401 or a
/// transport error) aborts that stage only — results from stages already
/// run are kept, and synthesis still gets its turn.
pub async fn fix_license_errors(
    defective: &[PackageRecord],
    auth_token: Option<&str>,
    store: &TemplateStore,
    config: &Config,
    quiet: bool,
) -> Result<RepairOutcome> {
    let mut records: Vec<PackageRecord> = defective.to_vec();
    let mut log = FixLog::default();

    let extracted = extract::extract_licenses(&records)?;
    merge_fixed(&mut records, extracted, FixStatus::ExtractedFromText, &mut log);

    if let Some(token) = auth_token {
        let pending = still_unresolved(&records);
        let fetcher = github::RepoFetcher::new(config, token, quiet)?;
        match fetcher.fetch_licenses_from_repo(&pending).await {
            Ok(found) => merge_fixed(&mut records, found, FixStatus::FetchedRemote, &mut log),
            Err(err) => eprintln!("  {} repository lookup aborted: {:#}", "✗".red(), err),
        }
    }

    let pending = still_unresolved(&records);
    let developed = templates::develop_licenses(store, &pending)?;
    merge_fixed(&mut records, developed, FixStatus::Synthesized, &mut log);

    records.retain(|record| record.fix_status.is_fixed());
    Ok(RepairOutcome {
        fixed: records,
        log,
    })
}

/// Copy repaired license text back onto the full appendix list, and drop the
/// trailing guess marker from each repaired record's license identifier.
pub fn apply_fixes(records: &mut [PackageRecord], fixed: &[PackageRecord]) {
    for fix in fixed {
        if let Some(record) = records.iter_mut().find(|record| record.name == fix.name) {
            record.license_text = fix.license_text.clone();
            record.fix_status = fix.fix_status;
            record.licenses.strip_trailing_guess();
        }
    }
}

fn still_unresolved(records: &[PackageRecord]) -> Vec<PackageRecord> {
    records
        .iter()
        .filter(|record| !record.fix_status.is_fixed())
        .cloned()
        .collect()
}

/// Merge one stage's fixes back by package name. Every attribute of the fix
/// overwrites the original. A record an earlier stage already fixed is never
/// touched again.
fn merge_fixed(
    records: &mut [PackageRecord],
    fixes: Vec<PackageRecord>,
    status: FixStatus,
    log: &mut FixLog,
) {
    for fix in fixes {
        if let Some(record) = records
            .iter_mut()
            .find(|record| record.name == fix.name && !record.fix_status.is_fixed())
        {
            *record = fix;
            record.fix_status = status;
            log.record(status, record.key());
        }
    }
}

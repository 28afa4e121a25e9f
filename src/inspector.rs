//! Loads the package inspector's scan result.
//!
//! Dependency-tree walking itself is the inspector's job; this module only
//! consumes its JSON output — a mapping of `name@version` keys to per-package
//! license metadata — and normalizes missing fields to the sentinel strings
//! the repair pipeline keys on.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{
    FixStatus, LicenseField, PackageRecord, LICENSE_FILE_NOT_FOUND, LICENSE_TEXT_NOT_FOUND,
    REPOSITORY_NOT_FOUND,
};

const UNKNOWN_NAME: &str = "<<Unknown Name>>";
const UNKNOWN_VERSION: &str = "<<Unknown Version>>";
const UNKNOWN_DESCRIPTION: &str = "<<Unknown Description>>";

/// One entry of the inspector's JSON mapping. Every field is optional; the
/// inspector omits what it could not determine.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    licenses: Option<LicenseField>,
    license_file: Option<String>,
    license_text: Option<String>,
    repository: Option<String>,
}

/// Read the inspector output at `path` and produce normalized records,
/// ordered by package key.
pub fn load_records(path: &Path) -> Result<Vec<PackageRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read inspector output {}", path.display()))?;
    let raw: BTreeMap<String, RawRecord> = serde_json::from_str(&content)
        .with_context(|| format!("invalid inspector output {}", path.display()))?;

    Ok(raw
        .into_iter()
        .map(|(key, record)| normalize(&key, record))
        .collect())
}

fn normalize(key: &str, raw: RawRecord) -> PackageRecord {
    // Keys look like "name@1.0.0" or "@scope/name@1.0.0"; split at the last
    // '@' so scoped names survive.
    let (key_name, key_version) = key.rsplit_once('@').unwrap_or((key, ""));

    let name = raw
        .name
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| non_empty_or(key_name, UNKNOWN_NAME));
    let version = raw
        .version
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| non_empty_or(key_version, UNKNOWN_VERSION));
    let description = raw
        .description
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_DESCRIPTION.to_string());

    // The inspector reports a full path; the appendix only ever shows the basename.
    let license_file = match raw.license_file.filter(|s| !s.is_empty()) {
        Some(file) => Path::new(&file)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or(file),
        None => LICENSE_FILE_NOT_FOUND.to_string(),
    };

    let license_text = raw
        .license_text
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| LICENSE_TEXT_NOT_FOUND.to_string());
    let repository = raw
        .repository
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| REPOSITORY_NOT_FOUND.to_string());

    PackageRecord {
        name,
        version,
        description,
        licenses: raw
            .licenses
            .unwrap_or_else(|| LicenseField::One("UNKNOWN".to_string())),
        license_file,
        license_text,
        repository,
        fix_status: FixStatus::default(),
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

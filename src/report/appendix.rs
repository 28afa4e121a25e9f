use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::AppendixFormat;
use crate::models::{LicenseField, PackageRecord};

/// Write the appendix document for the full record set.
pub fn write(records: &[PackageRecord], path: &Path, format: &AppendixFormat) -> Result<()> {
    let content = match format {
        AppendixFormat::Text => render_text(records),
        AppendixFormat::Json => render_json(records)?,
    };
    std::fs::write(path, content)
        .with_context(|| format!("failed to write appendix {}", path.display()))
}

/// Plain-text appendix: a banner followed by one `#####`-delimited section
/// per package.
pub fn render_text(records: &[PackageRecord]) -> String {
    let mut out = String::from("####Appendix of packages and their licenses ####\n\n");

    for record in records {
        out.push_str("#####\n");
        out.push_str(&format!("name:\t{}\n", record.name));
        out.push_str(&format!("version:\t{}\n", record.version));
        out.push_str(&format!("description:\t{}\n", record.description));
        out.push_str(&format!("repository:\t{}\n", record.repository));
        out.push_str(&format!("license(s):\t{}\n", record.licenses));
        out.push_str(&format!("license file:\t{}\n", record.license_file));
        out.push_str(&format!("license text:\t{}\n", record.license_text));
        out.push_str("#####\n");
    }

    out
}

/// JSON appendix entry. License file and text move to snake_case keys, and
/// control characters inside the text are escaped literally so each entry
/// stays a single line when the document is consumed downstream.
#[derive(Serialize)]
struct AppendixEntry<'a> {
    name: &'a str,
    version: &'a str,
    description: &'a str,
    licenses: &'a LicenseField,
    repository: &'a str,
    license_file: &'a str,
    license_text: String,
}

pub fn render_json(records: &[PackageRecord]) -> Result<String> {
    let entries: Vec<AppendixEntry<'_>> = records
        .iter()
        .map(|record| AppendixEntry {
            name: &record.name,
            version: &record.version,
            description: &record.description,
            licenses: &record.licenses,
            repository: &record.repository,
            license_file: &record.license_file,
            license_text: record
                .license_text
                .replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t"),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FixStatus, REPOSITORY_NOT_FOUND};

    fn record() -> PackageRecord {
        PackageRecord {
            name: "widget".to_string(),
            version: "1.0.0".to_string(),
            description: "a widget".to_string(),
            licenses: LicenseField::One("MIT".to_string()),
            license_file: "LICENSE".to_string(),
            license_text: "line one\nline two".to_string(),
            repository: REPOSITORY_NOT_FOUND.to_string(),
            fix_status: FixStatus::default(),
        }
    }

    #[test]
    fn test_render_text_sections() {
        let text = render_text(&[record()]);
        assert!(text.starts_with("####Appendix of packages and their licenses ####\n\n"));
        assert!(text.contains("#####\nname:\twidget\n"));
        assert!(text.contains("license(s):\tMIT\n"));
        assert!(text.contains("license text:\tline one\nline two\n"));
    }

    #[test]
    fn test_render_text_joins_multiple_licenses() {
        let mut r = record();
        r.licenses = LicenseField::Many(vec!["MIT".to_string(), "ISC".to_string()]);
        let text = render_text(&[r]);
        assert!(text.contains("license(s):\tMIT,ISC\n"));
    }

    #[test]
    fn test_render_json_escapes_and_renames() {
        let mut r = record();
        r.license_text = "a\nb\tc\r".to_string();
        let json = render_json(&[r]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &parsed[0];

        assert_eq!(entry["license_file"], "LICENSE");
        assert_eq!(entry["license_text"], "a\\nb\\tc\\r");
        assert_eq!(entry["licenses"], "MIT");
        assert!(entry.get("licenseFile").is_none());
        assert!(entry.get("licenseText").is_none());
    }

    #[test]
    fn test_write_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appendix.txt");
        write(&[record()], &path, &AppendixFormat::Text).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("name:\twidget"));
    }
}

//! Heuristic recovery of license text and copyright info from README-style prose.

use anyhow::Result;
use regex::Regex;

use crate::models::{CopyrightInfo, PackageRecord};

/// Isolate the body of an embedded `# License` / `## Licence` markdown section.
///
/// Returns the trimmed text between the heading and the next heading, or an
/// empty string when no such heading exists.
pub fn extract_license_section(text: &str) -> Result<String> {
    let heading = Regex::new(r"(?i).*\n*#+\s*licen[cs]e\s+(.[^#]*)")?;
    Ok(heading
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim().to_string())
        .unwrap_or_default())
}

/// Recover a copyright year/author pair from license text.
///
/// Four candidate patterns are tried in a fixed order. The two patterns
/// anchored on the bare word "copyright" are discarded when they match no
/// year. Among the surviving matches, the one with the most non-empty
/// components wins; ties go to the earliest pattern. The ordering and
/// tie-break are load-bearing: synthesized license text must stay stable
/// across runs for the same input.
pub fn extract_copyright(text: &str) -> Result<CopyrightInfo> {
    struct Pattern {
        regex: Regex,
        year_group: usize,
        author_group: usize,
        // a match without a year is mostly wrong for these
        needs_year: bool,
    }

    let patterns = [
        Pattern {
            regex: Regex::new(r"(?i)(\(c\)|©)\s*([a-z&\-, ]*)\s*((\d*-)?\d*)")?,
            year_group: 3,
            author_group: 2,
            needs_year: false,
        },
        Pattern {
            regex: Regex::new(r"(?i)(\(c\)|©)\s*((\d*-)?\d*)\s*([a-z&\-, ]*)")?,
            year_group: 2,
            author_group: 4,
            needs_year: false,
        },
        Pattern {
            regex: Regex::new(r"(?i)copyright\s*([a-z&\-, ]*)\s*((\d*-)?\d*)")?,
            year_group: 2,
            author_group: 1,
            needs_year: true,
        },
        Pattern {
            regex: Regex::new(r"(?i)copyright\s*((\d*-)?\d*)\s*([a-z&\-, ]*)")?,
            year_group: 1,
            author_group: 3,
            needs_year: true,
        },
    ];

    // Candidates keep the [year, author] order but drop empty components, so
    // a year-only match beats nothing and an author can stand in for a year
    // when the year group came up empty.
    let mut candidates: Vec<Vec<String>> = Vec::new();
    for pattern in &patterns {
        let caps = match pattern.regex.captures(text) {
            Some(caps) => caps,
            None => continue,
        };
        let group = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };
        let year = group(pattern.year_group);
        let author = group(pattern.author_group);

        if pattern.needs_year && year.is_empty() {
            continue;
        }

        let components: Vec<String> = [year, author]
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();
        if !components.is_empty() {
            candidates.push(components);
        }
    }

    // Stable sort keeps pattern order among equally good matches.
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));
    let winner = candidates.into_iter().next().unwrap_or_default();

    Ok(CopyrightInfo {
        year: winner.first().map(|s| s.trim().to_string()).unwrap_or_default(),
        author: winner.get(1).map(|s| s.trim().to_string()).unwrap_or_default(),
    })
}

/// Extraction stage: for each record whose text embeds a license section,
/// produce a fix carrying that section as the new license text.
///
/// A candidate section is accepted only when it is non-empty, mentions
/// "copyright", and spans at least two lines — a bare "MIT License" mention
/// carries no legal body and must not count as repaired.
pub fn extract_licenses(records: &[PackageRecord]) -> Result<Vec<PackageRecord>> {
    let copyright = Regex::new(r"(?i)copyright")?;
    let mut extracted = Vec::new();

    for record in records {
        let section = extract_license_section(&record.license_text)?;
        if !section.is_empty() && copyright.is_match(&section) && section.lines().count() >= 2 {
            let mut fix = record.clone();
            fix.license_text = section;
            extracted.push(fix);
        }
    }

    Ok(extracted)
}

use serde::{Deserialize, Serialize};

/// Sentinel used when the inspector found no license file for a package.
pub const LICENSE_FILE_NOT_FOUND: &str = "<<License File Not Found>>";
/// Sentinel used when no license text could be read.
pub const LICENSE_TEXT_NOT_FOUND: &str = "<<License Text Not Found>>";
/// Sentinel used when the package declares no source repository.
pub const REPOSITORY_NOT_FOUND: &str = "<<License Repository Not Found>>";

/// One scanned dependency, as reported by the package inspector.
#[derive(Debug, Clone)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub description: String,
    pub licenses: LicenseField,
    pub license_file: String,
    pub license_text: String,
    pub repository: String,
    pub fix_status: FixStatus,
}

impl PackageRecord {
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// A record needs repair when its license file was never found or the
    /// only available text came from a README.
    pub fn is_defective(&self) -> bool {
        let license_file = self.license_file.to_lowercase();
        license_file.contains("not found") || license_file.contains("readme")
    }
}

/// License identifier(s) as declared by the inspector: a single identifier
/// or a list, each possibly suffixed with the inspector's `*` guess marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    One(String),
    Many(Vec<String>),
}

impl LicenseField {
    /// First identifier, used when synthesizing text for multi-license packages.
    pub fn first(&self) -> Option<&str> {
        match self {
            LicenseField::One(id) => Some(id),
            LicenseField::Many(ids) => ids.first().map(String::as_str),
        }
    }

    /// Remove every `*` guess marker.
    pub fn strip_guess_markers(&self) -> LicenseField {
        match self {
            LicenseField::One(id) => LicenseField::One(id.replace('*', "")),
            LicenseField::Many(ids) => {
                LicenseField::Many(ids.iter().map(|id| id.replace('*', "")).collect())
            }
        }
    }

    /// Strip a single trailing guess marker from a string-valued field.
    pub fn strip_trailing_guess(&mut self) {
        if let LicenseField::One(id) = self {
            if id.ends_with('*') {
                id.truncate(id.len() - 1);
            }
        }
    }

    /// Canonical form for comparing against a repository's declared license:
    /// guess markers stripped, lower-cased, multi-valued fields sorted and joined.
    pub fn normalized_key(&self) -> String {
        match self.strip_guess_markers() {
            LicenseField::One(id) => id.to_lowercase(),
            LicenseField::Many(ids) => {
                let mut ids: Vec<String> = ids.iter().map(|id| id.to_lowercase()).collect();
                ids.sort();
                ids.join(", ")
            }
        }
    }
}

impl std::fmt::Display for LicenseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseField::One(id) => write!(f, "{}", id),
            LicenseField::Many(ids) => write!(f, "{}", ids.join(",")),
        }
    }
}

/// Which repair stage produced a record's license text.
///
/// `Unresolved` means no stage has succeeded yet; a record leaves this state
/// at most once, and later stages never overwrite an earlier fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixStatus {
    #[default]
    Unresolved,
    ExtractedFromText,
    FetchedRemote,
    Synthesized,
}

impl FixStatus {
    pub fn is_fixed(self) -> bool {
        self != FixStatus::Unresolved
    }
}

impl std::fmt::Display for FixStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixStatus::Unresolved => write!(f, "unresolved"),
            FixStatus::ExtractedFromText => write!(f, "extracted from license text"),
            FixStatus::FetchedRemote => write!(f, "fetched from repository"),
            FixStatus::Synthesized => write!(f, "synthesized from template"),
        }
    }
}

/// Copyright year/author pair recovered from defective license text.
/// Either component may be empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CopyrightInfo {
    pub year: String,
    pub author: String,
}

/// Per-run record of which packages each repair stage fixed, as
/// `name@version` keys in stage order. Reporting only.
#[derive(Debug, Clone, Default)]
pub struct FixLog {
    pub extracted: Vec<String>,
    pub github: Vec<String>,
    pub generated: Vec<String>,
}

impl FixLog {
    pub fn record(&mut self, status: FixStatus, key: String) {
        match status {
            FixStatus::ExtractedFromText => self.extracted.push(key),
            FixStatus::FetchedRemote => self.github.push(key),
            FixStatus::Synthesized => self.generated.push(key),
            FixStatus::Unresolved => {}
        }
    }

    pub fn fixed_count(&self) -> usize {
        self.extracted.len() + self.github.len() + self.generated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(license_file: &str) -> PackageRecord {
        PackageRecord {
            name: "widget".to_string(),
            version: "1.0.0".to_string(),
            description: "a widget".to_string(),
            licenses: LicenseField::One("MIT".to_string()),
            license_file: license_file.to_string(),
            license_text: "text".to_string(),
            repository: REPOSITORY_NOT_FOUND.to_string(),
            fix_status: FixStatus::default(),
        }
    }

    #[test]
    fn test_defective_on_sentinel() {
        assert!(record(LICENSE_FILE_NOT_FOUND).is_defective());
    }

    #[test]
    fn test_defective_on_readme() {
        assert!(record("README.md").is_defective());
        assert!(record("readme.markdown").is_defective());
    }

    #[test]
    fn test_not_defective_on_real_license_file() {
        assert!(!record("LICENSE").is_defective());
        assert!(!record("LICENSE.txt").is_defective());
    }

    #[test]
    fn test_strip_guess_markers() {
        let field = LicenseField::One("MIT*".to_string());
        assert_eq!(
            field.strip_guess_markers(),
            LicenseField::One("MIT".to_string())
        );

        let field = LicenseField::Many(vec!["MIT*".to_string(), "ISC".to_string()]);
        assert_eq!(
            field.strip_guess_markers(),
            LicenseField::Many(vec!["MIT".to_string(), "ISC".to_string()])
        );
    }

    #[test]
    fn test_strip_trailing_guess_only_affects_strings() {
        let mut field = LicenseField::One("MIT*".to_string());
        field.strip_trailing_guess();
        assert_eq!(field, LicenseField::One("MIT".to_string()));

        let mut field = LicenseField::Many(vec!["MIT*".to_string()]);
        field.strip_trailing_guess();
        assert_eq!(field, LicenseField::Many(vec!["MIT*".to_string()]));
    }

    #[test]
    fn test_normalized_key_sorts_and_joins() {
        let field = LicenseField::Many(vec!["ISC".to_string(), "Apache-2.0*".to_string()]);
        assert_eq!(field.normalized_key(), "apache-2.0, isc");
        assert_eq!(LicenseField::One("MIT*".to_string()).normalized_key(), "mit");
    }

    #[test]
    fn test_license_field_deserializes_string_or_list() {
        let one: LicenseField = serde_json::from_str("\"MIT\"").unwrap();
        assert_eq!(one, LicenseField::One("MIT".to_string()));

        let many: LicenseField = serde_json::from_str("[\"MIT\", \"ISC\"]").unwrap();
        assert_eq!(
            many,
            LicenseField::Many(vec!["MIT".to_string(), "ISC".to_string()])
        );
    }
}

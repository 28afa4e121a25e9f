//! Remote lookup stage: some packages ship no license file to the registry
//! but do carry one at the root of their GitHub repository.

use anyhow::{bail, Result};
use base64::Engine as _;
use futures::future::try_join_all;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::Config;
use crate::models::PackageRecord;

const GITHUB_REPO_URL: &str = r"^https://github\.com/(\w.*)$";
const LICENSE_FILE_NAME: &str = r"(?i)^(license|licence)(\.txt)?$";

pub struct RepoFetcher {
    client: Client,
    repo_url: Regex,
    license_name: Regex,
    api_root: String,
    token: String,
    batch_size: usize,
    quiet: bool,
}

impl RepoFetcher {
    pub fn new(config: &Config, token: &str, quiet: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.github.timeout_secs))
            .build()?;

        Ok(RepoFetcher {
            client,
            repo_url: Regex::new(GITHUB_REPO_URL)?,
            license_name: Regex::new(LICENSE_FILE_NAME)?,
            api_root: config.github.api_root.trim_end_matches('/').to_string(),
            token: token.to_string(),
            batch_size: config.github.batch_size.max(1),
            quiet,
        })
    }

    /// Look up a root-level license file for every record hosted on GitHub.
    ///
    /// Lookups within a batch run concurrently and are joined together; the
    /// batch size caps simultaneous outbound requests. Records with no
    /// GitHub repository, no license file, or a contradicting declared
    /// license are omitted from the result. An HTTP 401 aborts the whole
    /// batch — the token is invalid or the request quota is exhausted.
    pub async fn fetch_licenses_from_repo(
        &self,
        records: &[PackageRecord],
    ) -> Result<Vec<PackageRecord>> {
        let candidates: Vec<(&PackageRecord, String)> = records
            .iter()
            .filter_map(|record| {
                self.repo_url
                    .captures(&record.repository)
                    .map(|caps| (record, caps[1].to_string()))
            })
            .collect();

        let pb = if !self.quiet && !candidates.is_empty() {
            let pb = ProgressBar::new(candidates.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut found = Vec::new();
        for batch in candidates.chunks(self.batch_size) {
            let futures: Vec<_> = batch
                .iter()
                .map(|(record, repo_path)| self.fetch_license(record, repo_path))
                .collect();

            let results = match try_join_all(futures).await {
                Ok(results) => results,
                Err(err) => {
                    if let Some(pb) = &pb {
                        pb.finish_and_clear();
                    }
                    return Err(err);
                }
            };

            for result in results {
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                if let Some(fix) = result {
                    found.push(fix);
                }
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }

        Ok(found)
    }

    async fn fetch_license(
        &self,
        record: &PackageRecord,
        repo_path: &str,
    ) -> Result<Option<PackageRecord>> {
        let contents_root = format!("{}/repos/{}/contents/", self.api_root, repo_path);

        let Some(file_url) = self.find_license_file_url(&contents_root).await? else {
            return Ok(None);
        };

        if !self.declared_license_matches(&contents_root, record).await? {
            return Ok(None);
        }

        let Some(text) = self.download(&file_url).await? else {
            return Ok(None);
        };

        let mut fix = record.clone();
        fix.license_text = text;
        Ok(Some(fix))
    }

    /// List the repository root and pick the first non-directory entry named
    /// like a license file.
    async fn find_license_file_url(&self, contents_root: &str) -> Result<Option<String>> {
        let Some(listing) = self.get_json(contents_root).await? else {
            return Ok(None);
        };
        let Some(entries) = listing.as_array() else {
            return Ok(None);
        };

        Ok(entries
            .iter()
            .find(|entry| {
                entry.get("type").and_then(Value::as_str) != Some("dir")
                    && entry
                        .get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|name| self.license_name.is_match(name))
            })
            .and_then(|entry| entry.get("url").and_then(Value::as_str).map(str::to_string)))
    }

    /// The repository's own `package.json` must not contradict the record's
    /// declared license. An absent or unreadable declaration satisfies the
    /// check — there is nothing to contradict.
    async fn declared_license_matches(
        &self,
        contents_root: &str,
        record: &PackageRecord,
    ) -> Result<bool> {
        let url = format!("{}package.json", contents_root);
        let Some(envelope) = self.get_json(&url).await? else {
            return Ok(true);
        };
        let Some(manifest_text) = decode_content(&envelope) else {
            return Ok(true);
        };
        let Ok(manifest) = serde_json::from_str::<Value>(&manifest_text) else {
            return Ok(true);
        };
        let Some(declared) = normalize_declared(manifest.get("license")) else {
            return Ok(true);
        };

        Ok(declared == record.licenses.normalized_key())
    }

    async fn download(&self, url: &str) -> Result<Option<String>> {
        let Some(envelope) = self.get_json(url).await? else {
            return Ok(None);
        };
        Ok(decode_content(&envelope))
    }

    /// Issue an authorized GET. A 401 is fatal for the whole batch; any other
    /// failure status skips just this package.
    async fn get_json(&self, url: &str) -> Result<Option<Value>> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("User-Agent", "license-fixr/0.1.0")
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            bail!("GitHub rejected the token (HTTP 401): invalid token or request quota exhausted");
        }
        if !response.status().is_success() {
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}

/// Decode a contents-API `{content, encoding}` envelope. GitHub wraps base64
/// payloads at 60 columns, so whitespace is stripped before decoding.
fn decode_content(envelope: &Value) -> Option<String> {
    let content = envelope.get("content")?.as_str()?;
    match envelope.get("encoding").and_then(Value::as_str) {
        Some("base64") | None => {
            let packed: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(packed)
                .ok()?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some(_) => Some(content.to_string()),
    }
}

/// Normalize a `package.json` `license` field the same way record licenses
/// are normalized: markers stripped, lower-cased, lists sorted and joined.
fn normalize_declared(license: Option<&Value>) -> Option<String> {
    match license? {
        Value::String(id) => Some(id.replace('*', "").to_lowercase()),
        Value::Array(ids) => {
            let mut ids: Vec<String> = ids
                .iter()
                .filter_map(Value::as_str)
                .map(|id| id.replace('*', "").to_lowercase())
                .collect();
            if ids.is_empty() {
                return None;
            }
            ids.sort();
            Some(ids.join(", "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repo_url_pattern() {
        let re = Regex::new(GITHUB_REPO_URL).unwrap();
        let caps = re.captures("https://github.com/acme/widget").unwrap();
        assert_eq!(&caps[1], "acme/widget");

        assert!(re.captures("http://github.com/acme/widget").is_none());
        assert!(re.captures("https://gitlab.com/acme/widget").is_none());
        assert!(re.captures("git+ssh://git@github.com/acme/widget").is_none());
    }

    #[test]
    fn test_license_file_name_pattern() {
        let re = Regex::new(LICENSE_FILE_NAME).unwrap();
        assert!(re.is_match("LICENSE"));
        assert!(re.is_match("LICENSE.txt"));
        assert!(re.is_match("licence"));
        assert!(re.is_match("License.TXT"));

        assert!(!re.is_match("LICENSE.md"));
        assert!(!re.is_match("UNLICENSE"));
        assert!(!re.is_match("licenses"));
    }

    #[test]
    fn test_decode_content_strips_base64_line_wrapping() {
        // "MIT License" encoded, wrapped the way the contents API wraps it
        let envelope = json!({"content": "TUlUIExp\nY2Vuc2U=\n", "encoding": "base64"});
        assert_eq!(decode_content(&envelope).as_deref(), Some("MIT License"));
    }

    #[test]
    fn test_decode_content_passes_through_other_encodings() {
        let envelope = json!({"content": "plain text", "encoding": "utf-8"});
        assert_eq!(decode_content(&envelope).as_deref(), Some("plain text"));
    }

    #[test]
    fn test_decode_content_invalid_base64() {
        let envelope = json!({"content": "!!!", "encoding": "base64"});
        assert_eq!(decode_content(&envelope), None);
    }

    #[test]
    fn test_declared_license_matches_record_after_marker_strip() {
        use crate::models::LicenseField;
        // a guessed "MIT*" record matches a repository declaring plain "MIT"
        let record_key = LicenseField::One("MIT*".to_string()).normalized_key();
        assert_eq!(
            normalize_declared(Some(&json!("MIT"))).as_deref(),
            Some(record_key.as_str())
        );
    }

    #[test]
    fn test_normalize_declared() {
        assert_eq!(
            normalize_declared(Some(&json!("MIT"))).as_deref(),
            Some("mit")
        );
        assert_eq!(
            normalize_declared(Some(&json!(["ISC", "Apache-2.0"]))).as_deref(),
            Some("apache-2.0, isc")
        );
        assert_eq!(normalize_declared(Some(&json!({}))), None);
        assert_eq!(normalize_declared(None), None);
    }
}

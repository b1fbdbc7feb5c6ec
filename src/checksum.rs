//! Checksums for generated documentation trees
//!
//! Every run writes a manifest listing the SHA256 of each generated file.
//! Its presence marks a target directory as owned by the generator.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{DocError, Result};

/// Manifest file name, written at the root of the target directory
pub const MANIFEST_FILE_NAME: &str = ".kcldoc.sha256";

/// SHA256 checksum of a generated document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that content matches this checksum
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::from_bytes(data) == *self
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checksums of every file of a generated tree, keyed by `/`-separated relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, Checksum>,
}

/// Result of re-checking a generated tree against its manifest
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub modified: Vec<String>,
    pub missing: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.missing.is_empty()
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, relative_path: impl Into<String>, content: &[u8]) {
        self.entries
            .insert(relative_path.into(), Checksum::from_bytes(content));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, relative_path: &str) -> Option<&Checksum> {
        self.entries.get(relative_path)
    }

    /// Parse `<hex>  <path>` lines
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let (hash, path) = line.split_once("  ").ok_or_else(|| {
                DocError::InvalidManifest(format!(
                    "line {} is not '<sha256>  <path>'",
                    idx + 1
                ))
            })?;
            entries.insert(path.to_string(), Checksum(hash.to_string()));
        }
        Ok(Self { entries })
    }

    /// Render in `sha256sum` format, sorted by path
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(path, hash)| format!("{}  {}\n", hash, path))
            .collect()
    }

    /// Load the manifest of `dir`, if it has one
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| DocError::io(&path, e))?;
        Self::parse(&content).map(Some)
    }

    /// Compare the files under `dir` with the recorded checksums
    pub fn verify(&self, dir: &Path) -> Result<VerifyReport> {
        let mut report = VerifyReport::default();
        for (relative, checksum) in &self.entries {
            let path = relative
                .split('/')
                .fold(dir.to_path_buf(), |path, segment| path.join(segment));
            match fs::read(&path) {
                Ok(content) if checksum.verify(&content) => {}
                Ok(_) => report.modified.push(relative.clone()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    report.missing.push(relative.clone())
                }
                Err(e) => return Err(DocError::io(path, e)),
            }
        }
        Ok(report)
    }
}

/// Verify a generated tree against the manifest at its root
pub fn verify_target(dir: &Path) -> Result<VerifyReport> {
    match Manifest::load(dir)? {
        Some(manifest) => manifest.verify(dir),
        None => Err(DocError::TargetNotOwned {
            path: dir.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_checksum_consistency() {
        let checksum1 = Checksum::from_bytes(b"## Schema Person\n");
        let checksum2 = Checksum::from_bytes(b"## Schema Person\n");
        assert_eq!(checksum1, checksum2);
        assert_ne!(checksum1, Checksum::from_bytes(b"## Schema Human\n"));
        assert_eq!(checksum1.as_str().len(), 64);
    }

    #[test]
    fn test_manifest_render_parse() {
        let mut manifest = Manifest::new();
        manifest.insert("models/Person.md", b"person");
        manifest.insert("app/App.md", b"app");

        let rendered = manifest.render();
        // sorted by path
        assert!(rendered.find("app/App.md").unwrap() < rendered.find("models/Person.md").unwrap());
        assert_eq!(Manifest::parse(&rendered).unwrap(), manifest);
    }

    #[test]
    fn test_manifest_parse_rejects_garbage() {
        assert!(Manifest::parse("not a manifest line\n").is_err());
    }

    #[test]
    fn test_verify_reports_modified_and_missing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("models")).unwrap();
        fs::write(dir.path().join("models/Person.md"), "person").unwrap();
        fs::write(dir.path().join("models/Address.md"), "edited").unwrap();

        let mut manifest = Manifest::new();
        manifest.insert("models/Person.md", b"person");
        manifest.insert("models/Address.md", b"address");
        manifest.insert("models/Gone.md", b"gone");
        fs::write(dir.path().join(MANIFEST_FILE_NAME), manifest.render()).unwrap();

        let report = verify_target(dir.path()).unwrap();
        assert_eq!(report.modified, vec!["models/Address.md"]);
        assert_eq!(report.missing, vec!["models/Gone.md"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_verify_without_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            verify_target(dir.path()),
            Err(DocError::TargetNotOwned { .. })
        ));
    }
}

//! Package Loading
//!
//! Reads the front-end's output for a KCL package: every directory is a
//! package, every `*.json` file inside it a definitions document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::error::{DocError, Result};
use crate::schema::{KclDefinitions, KclPackage};

/// Configuration for package loading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Skip packages whose relative path starts with one of these prefixes
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
}

fn default_skip_prefixes() -> Vec<String> {
    vec![
        "target/".to_string(),       // Rust build artifacts
        "node_modules/".to_string(), // Node.js dependencies
        "vendor/".to_string(),       // Vendored KCL modules
    ]
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: default_skip_prefixes(),
        }
    }
}

impl LoadConfig {
    fn skips(&self, segments: &[String]) -> bool {
        let relative = format!("{}/", segments.join("/"));
        self.skip_prefixes.iter().any(|p| relative.starts_with(p.as_str()))
    }
}

/// Load the package rooted at `package_dir` and all of its sub-packages
pub fn load_package(package_dir: &Path, config: &LoadConfig) -> Result<KclPackage> {
    if !package_dir.is_dir() {
        return Err(DocError::io(
            package_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "package path is not a directory"),
        ));
    }
    load_dir(package_dir, Vec::new(), config)
}

fn load_dir(dir: &Path, segments: Vec<String>, config: &LoadConfig) -> Result<KclPackage> {
    let mut package = KclPackage {
        path: segments,
        schema_list: Vec::new(),
        sub_package_list: Vec::new(),
    };

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in entries {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            DocError::io(path, e.into())
        })?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();

        if file_name.starts_with('.') {
            continue;
        }

        // symlinked directories are not followed; symlinked definition files are read
        if entry.path_is_symlink() && path.is_dir() {
            warn!(path = %path.display(), "Skipping symlinked package directory");
            continue;
        }

        if entry.file_type().is_dir() {
            let mut child = package.path.clone();
            child.push(file_name);
            if config.skips(&child) {
                trace!(path = %path.display(), "Skipping package");
                continue;
            }
            package.sub_package_list.push(load_dir(path, child, config)?);
        } else if path.extension().map(|ext| ext == "json").unwrap_or(false) {
            let content = fs::read_to_string(path).map_err(|e| DocError::io(path, e))?;
            let document: KclDefinitions =
                serde_json::from_str(&content).map_err(|source| DocError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            debug!(
                path = %path.display(),
                definitions = document.definitions.len(),
                "Loaded definitions"
            );
            package.schema_list.extend(document.definitions);
        }
    }

    Ok(package)
}

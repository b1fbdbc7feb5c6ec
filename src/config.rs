//! Configuration management for the documentation generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (kcldoc.toml)
//! - Environment variables (KCLDOC__*)
//!
//! ## Example config file (kcldoc.toml):
//! ```toml
//! [generate]
//! package_path = "./konfig"
//! target = "./docs/api"
//! format = "md"
//! ignore_deprecated = true
//!
//! [loader]
//! skip_prefixes = ["vendor/", "target/"]
//! ```

use std::path::PathBuf;

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::generate::{GenContext, TargetPolicy};
use crate::render::{Format, Platform};
use crate::tree::LoadConfig;

/// Main configuration for the documentation generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocConfig {
    /// Generation settings
    #[serde(default)]
    pub generate: GenerateConfig,

    /// Package loading settings
    #[serde(default)]
    pub loader: LoadConfig,
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Root of the package to document
    #[serde(default = "default_package_path")]
    pub package_path: PathBuf,

    /// Output directory
    #[serde(default = "default_target")]
    pub target: PathBuf,

    /// Output format (md or html)
    #[serde(default)]
    pub format: Format,

    /// Skip deprecated schemas and attributes
    #[serde(default)]
    pub ignore_deprecated: bool,

    /// Escape HTML in Markdown descriptions
    #[serde(default)]
    pub escape_html: bool,

    /// Replace the target even if it was not produced by a previous run
    #[serde(default)]
    pub force: bool,

    /// Override the host platform conventions (unix or windows)
    #[serde(default)]
    pub platform: Option<Platform>,
}

// Default value functions
fn default_package_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_target() -> PathBuf {
    PathBuf::from("docs")
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            package_path: default_package_path(),
            target: default_target(),
            format: Format::default(),
            ignore_deprecated: false,
            escape_html: false,
            force: false,
            platform: None,
        }
    }
}

impl DocConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with an optional explicit file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["kcldoc.toml", ".kcldoc.toml", "config/kcldoc.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("io", "kcl-lang", "kcldoc") {
            let xdg_config = config_dir.config_dir().join("kcldoc.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (KCLDOC__GENERATE__TARGET, ...)
        builder = builder.add_source(
            Environment::with_prefix("KCLDOC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Build the generation context described by this configuration
    pub fn gen_context(&self) -> GenContext {
        let generate = &self.generate;
        let mut ctx = GenContext::new(&generate.package_path, &generate.target);
        ctx.format = generate.format;
        ctx.ignore_deprecated = generate.ignore_deprecated;
        ctx.escape_html = generate.escape_html;
        ctx.platform = generate.platform.unwrap_or_else(Platform::host);
        ctx.target_policy = if generate.force {
            TargetPolicy::Force
        } else {
            TargetPolicy::RequireOwned
        };
        ctx.load_config = self.loader.clone();
        ctx
    }
}

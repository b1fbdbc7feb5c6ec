//! Render Configuration
//!
//! Everything that changes the bytes of a document lives here and is passed
//! in explicitly. Nothing in the renderer reads the environment, so output
//! for any target platform can be produced (and tested) on any host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Format
// =============================================================================

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Format {
    #[default]
    #[serde(rename = "md", alias = "markdown")]
    #[value(name = "md", alias = "markdown")]
    Markdown,
    #[serde(rename = "html")]
    #[value(name = "html")]
    Html,
}

impl Format {
    /// File extension for documents in this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Html => "html",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Format::Markdown),
            "html" => Ok(Format::Html),
            other => Err(format!("unsupported format '{}', expected md or html", other)),
        }
    }
}

// =============================================================================
// Platform
// =============================================================================

/// Target platform conventions for generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// `/` separators, `\n` line endings
    Unix,
    /// `\` separators, `\r\n` line endings
    Windows,
}

impl Platform {
    /// The platform this binary was built for
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn separator(&self) -> char {
        match self {
            Platform::Unix => '/',
            Platform::Windows => '\\',
        }
    }

    pub fn line_ending(&self) -> &'static str {
        match self {
            Platform::Unix => "\n",
            Platform::Windows => "\r\n",
        }
    }

    /// Join path segments with this platform's separator
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let separator = self.separator().to_string();
        segments
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(&separator)
    }

    /// Convert `\n`-terminated text to this platform's line endings
    pub fn apply_line_endings(&self, text: String) -> String {
        match self {
            Platform::Unix => text,
            Platform::Windows => text.replace('\n', "\r\n"),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::host()
    }
}

// =============================================================================
// Render Profile
// =============================================================================

/// Rendering configuration shared by every document of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderProfile {
    pub format: Format,
    pub platform: Platform,
    /// Skip deprecated schemas and attributes entirely
    pub ignore_deprecated: bool,
    /// Escape `<`, `>` and `&` in Markdown descriptions
    pub escape_html: bool,
}

impl RenderProfile {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_ignore_deprecated(mut self, ignore: bool) -> Self {
        self.ignore_deprecated = ignore;
        self
    }

    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }
}

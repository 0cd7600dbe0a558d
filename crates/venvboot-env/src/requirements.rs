//! Dependency specification: the ordered package list installed into a
//! freshly created environment. Read-only input, consumed once.

use std::path::Path;

use anyhow::{Context, Result};

/// Ordered package requirements parsed from a requirements file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub entries: Vec<String>,
}

impl DependencySpec {
    /// Parse a requirements file: one entry per line, trimmed, blank lines and
    /// `#` comments skipped, order preserved.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Read dependency specification {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

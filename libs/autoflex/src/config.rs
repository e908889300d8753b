use std::path::Path;

use serde::Deserialize;

use crate::error::FlexError;

/// Field names skipped unless configured otherwise. Tags are reconciled by
/// the resource layer, not copied field by field.
pub const DEFAULT_IGNORED_FIELDS: &[&str] = &["tags", "tags_all"];

/// Transcoder options, built in code or parsed from TOML.
///
/// ```toml
/// ignored_fields = ["tags", "tags_all", "timeouts"]
/// field_name_prefix = "cluster_"
/// strict = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Names never matched, on either side.
    pub ignored_fields: Vec<String>,

    /// Fallback correspondence: expand looks up `prefix + name` on the
    /// target, flatten looks up `name` without the prefix.
    pub field_name_prefix: Option<String>,

    /// Fail on source fields without a target counterpart instead of
    /// skipping them.
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ignored_fields: DEFAULT_IGNORED_FIELDS.iter().map(|s| s.to_string()).collect(),
            field_name_prefix: None,
            strict: false,
        }
    }
}

impl Options {
    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlexError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| FlexError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse options from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, FlexError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Replaces the ignored field names.
    pub fn with_ignored_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_fields = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_field_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.field_name_prefix = Some(prefix.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_fields.iter().any(|f| f == name)
    }
}

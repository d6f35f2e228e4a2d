//! Measurement Identifiers
//!
//! Identifiers name measurement scenarios such as `"AppLaunch"` or
//! `"Migrate250Records"`. The reserved value [`IGNORED_IDENTIFIER`] switches a
//! call into bypass mode: it always succeeds and never touches shared state,
//! so a start/stop pair can be disabled by swapping its identifier constant.

use crate::error::MeasureError;

/// Reserved identifier that activates bypass semantics
pub const IGNORED_IDENTIFIER: &str = "ignoredIdentifier";

/// A validated identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identifier<'a> {
    /// The bypass identifier
    Ignored,
    /// A regular, non-empty identifier
    Named(&'a str),
}

impl<'a> Identifier<'a> {
    /// Validate a raw identifier string
    pub fn parse(raw: &'a str) -> Result<Self, MeasureError> {
        if raw.is_empty() {
            return Err(MeasureError::EmptyIdentifier);
        }
        if raw == IGNORED_IDENTIFIER {
            return Ok(Identifier::Ignored);
        }
        Ok(Identifier::Named(raw))
    }

    /// Validate an identifier that may be absent
    pub fn parse_optional(raw: Option<&'a str>) -> Result<Self, MeasureError> {
        raw.ok_or(MeasureError::EmptyIdentifier).and_then(Self::parse)
    }

    /// Whether this is the bypass identifier
    pub fn is_ignored(&self) -> bool {
        matches!(self, Identifier::Ignored)
    }

    /// The identifier text
    pub fn as_str(&self) -> &'a str {
        match self {
            Identifier::Ignored => IGNORED_IDENTIFIER,
            Identifier::Named(name) => name,
        }
    }
}

impl std::fmt::Display for Identifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Validated identifier types.
//!
//! Tenant and channel ids and project names are interpolated into dotted
//! field paths by the store backend, so anything that could alter a
//! document's shape (a `$` operator sigil, nested-object braces, a `.` path
//! delimiter) is rejected before a value of these types can exist. Parse once
//! at the boundary; everything downstream takes the typed value.

use std::fmt;

use crate::error::InvalidIdentifier;

/// Maximum length of a platform identifier.
const MAX_IDENTIFIER_LEN: usize = 256;

/// Maximum length of a project name.
const MAX_PROJECT_NAME_LEN: usize = 128;

/// Name of the implicit project used when a channel has no binding.
pub const DEFAULT_PROJECT: &str = "default";

fn validate_identifier(raw: &str, role: &'static str) -> Result<String, InvalidIdentifier> {
    let value = raw.trim();

    if value.is_empty() {
        return Err(InvalidIdentifier::new(role, "must not be empty"));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(InvalidIdentifier::new(
            role,
            format!("must be at most {MAX_IDENTIFIER_LEN} characters"),
        ));
    }
    if value.starts_with('$') {
        return Err(InvalidIdentifier::new(role, "must not start with '$'"));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(InvalidIdentifier::new(
            role,
            format!("contains disallowed character {bad:?}"),
        ));
    }

    Ok(value.to_string())
}

/// A validated tenant (Slack team) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamId(String);

impl TeamId {
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        validate_identifier(raw, "team_id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        validate_identifier(raw, "channel_id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated project name.
///
/// Looser than the platform ids (names are typed by humans, spaces and
/// punctuation are fine) but strict about everything that carries meaning in
/// a field path: a `.` anywhere would let the name address an unrelated
/// field, and `$`/braces spell store operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(InvalidIdentifier::new("project name", "must not be empty"));
        }
        if value.len() > MAX_PROJECT_NAME_LEN {
            return Err(InvalidIdentifier::new(
                "project name",
                format!("must be at most {MAX_PROJECT_NAME_LEN} characters"),
            ));
        }
        if value.contains('.') {
            return Err(InvalidIdentifier::new(
                "project name",
                "must not contain '.'",
            ));
        }
        if value.contains('$') {
            return Err(InvalidIdentifier::new(
                "project name",
                "must not contain '$'",
            ));
        }
        if value.contains('{') || value.contains('}') {
            return Err(InvalidIdentifier::new(
                "project name",
                "must not contain braces",
            ));
        }
        if value.chars().any(char::is_control) {
            return Err(InvalidIdentifier::new(
                "project name",
                "must not contain control characters",
            ));
        }

        Ok(Self(value.to_string()))
    }

    /// The implicit project written to when a channel has no binding.
    pub fn default_project() -> Self {
        Self(DEFAULT_PROJECT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_id_accepts_platform_ids() {
        assert_eq!(TeamId::parse("T0123ABC").unwrap().as_str(), "T0123ABC");
        assert_eq!(TeamId::parse("  T0123ABC  ").unwrap().as_str(), "T0123ABC");
        assert!(TeamId::parse("team_4-dev").is_ok());
    }

    #[test]
    fn test_team_id_rejects_injection_shapes() {
        assert!(TeamId::parse("").is_err());
        assert!(TeamId::parse("   ").is_err());
        assert!(TeamId::parse("$where").is_err());
        assert!(TeamId::parse("{\"$gt\":\"\"}").is_err());
        assert!(TeamId::parse("a.b").is_err());
        assert!(TeamId::parse("a b").is_err());
        assert!(TeamId::parse(&"x".repeat(257)).is_err());
    }

    #[test]
    fn test_project_name_accepts_human_names() {
        assert_eq!(
            ProjectName::parse("Mobile app").unwrap().as_str(),
            "Mobile app"
        );
        assert!(ProjectName::parse("web-v2 (beta)").is_ok());
    }

    #[test]
    fn test_project_name_rejects_path_and_operator_chars() {
        assert!(ProjectName::parse("a.b").is_err());
        assert!(ProjectName::parse("$set").is_err());
        assert!(ProjectName::parse("mid$dle").is_err());
        assert!(ProjectName::parse("{nested}").is_err());
        assert!(ProjectName::parse("").is_err());
        assert!(ProjectName::parse(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_default_project_is_valid() {
        assert_eq!(ProjectName::default_project().as_str(), "default");
        assert!(ProjectName::parse(DEFAULT_PROJECT).is_ok());
    }
}

//! Jira REST API payload shapes (the subset this client reads).

use serde::Deserialize;

/// Response from `/rest/api/2/myself`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CurrentUser {
    /// Best human-readable identity available.
    pub fn identity(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .or(self.email_address.as_deref())
            .or(self.name.as_deref())
    }
}

/// Response from `/rest/api/2/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub key: String,
    pub fields: RawIssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIssueFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: Option<NamedField>,
    #[serde(default)]
    pub issuetype: Option<NamedField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedField {
    pub name: String,
}

/// A search hit, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub issue_type: String,
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Self {
            key: raw.key,
            summary: raw.fields.summary,
            status: raw
                .fields
                .status
                .map(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            issue_type: raw
                .fields
                .issuetype
                .map(|t| t.name)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

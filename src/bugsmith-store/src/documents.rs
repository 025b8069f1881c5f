//! Stored document shapes.
//!
//! These structs mirror what actually lives in the store, including legacy
//! shapes written by earlier versions of the service. Legacy variants are
//! absorbed here with untagged enums and canonicalized before they leave this
//! crate; domain code never branches on representation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Collection holding one document per organization.
pub const ORGANIZATIONS_COLLECTION: &str = "organizations";

/// Collection holding one document per (operation, organization) limiter key.
pub const RATE_LIMITS_COLLECTION: &str = "rate_limits";

/// Field names of a project settings record.
///
/// These are the only strings ever interpolated as the final segment of a
/// `projects.<name>.<field>` path, so a malformed field path is
/// unrepresentable.
pub mod fields {
    pub const USE_PROJECT_CONTEXT: &str = "use_project_context";
    pub const PROJECT_CONTEXT: &str = "project_context";
    pub const BUG_REPORT_TEMPLATE: &str = "bug_report_template";
    pub const JIRA_TOKEN: &str = "jira_token";
    pub const JIRA_URL: &str = "jira_url";
    pub const JIRA_EMAIL: &str = "jira_email";
    pub const JIRA_BUG_QUERY: &str = "jira_bug_query";
    pub const JIRA_DEFAULTS: &str = "jira_defaults";
}

/// One organization document, keyed by `team_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrgDocument {
    pub team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_date: Option<JoinedDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_projects: Option<HashMap<String, ChannelBindingShape>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<HashMap<String, ProjectSettingsDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_invocations_total: Option<i64>,
}

impl OrgDocument {
    /// Look up the canonical binding for a channel, absorbing legacy shapes.
    pub fn channel_binding(&self, channel_id: &str) -> Option<ChannelBinding> {
        self.channel_projects
            .as_ref()
            .and_then(|m| m.get(channel_id))
            .map(ChannelBindingShape::canonical)
    }

    /// Stored settings for a project, if any.
    pub fn project(&self, name: &str) -> Option<&ProjectSettingsDoc> {
        self.projects.as_ref().and_then(|m| m.get(name))
    }
}

/// `joined_date` as found in the wild: the current text form, or the native
/// date type written by an early version. Native values are migrated to text
/// by the settings resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JoinedDate {
    Text(String),
    Native(bson::DateTime),
}

impl JoinedDate {
    /// The text form, if already migrated.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            JoinedDate::Text(s) => Some(s),
            JoinedDate::Native(_) => None,
        }
    }

    /// Render as an RFC 3339 UTC string, converting native dates.
    pub fn to_rfc3339(&self) -> String {
        match self {
            JoinedDate::Text(s) => s.clone(),
            JoinedDate::Native(dt) => format_joined_date(dt.to_chrono()),
        }
    }
}

/// Render a timestamp in the persisted `joined_date` format.
pub fn format_joined_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A channel binding as stored: either the structured record, or the legacy
/// bare project-name string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelBindingShape {
    Record(ChannelBinding),
    Legacy(String),
}

impl ChannelBindingShape {
    /// Resolve to the canonical structured form.
    pub fn canonical(&self) -> ChannelBinding {
        match self {
            ChannelBindingShape::Record(binding) => binding.clone(),
            ChannelBindingShape::Legacy(name) => ChannelBinding {
                project: Some(name.clone()),
                welcome_shown: None,
            },
        }
    }
}

/// Canonical channel binding record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// Name of the bound project, absent if the channel is unbound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Whether the onboarding hint has been shown in this channel. Absent
    /// means "never set"; rebinding must not reset a present value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_shown: Option<bool>,
}

/// Stored project settings. Every field is optional so the resolver can tell
/// which keys a record written by an older version is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettingsDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_project_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bug_report_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_bug_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_defaults: Option<BTreeMap<String, String>>,
}

impl ProjectSettingsDoc {
    /// True when every key is present and no heal write is needed.
    pub fn is_complete(&self) -> bool {
        self.use_project_context.is_some()
            && self.project_context.is_some()
            && self.bug_report_template.is_some()
            && self.jira_token.is_some()
            && self.jira_url.is_some()
            && self.jira_email.is_some()
            && self.jira_bug_query.is_some()
            && self.jira_defaults.is_some()
    }

    /// Apply a single field write. Used by the in-memory backend to mirror
    /// the field-scoped `$set` the MongoDB backend issues.
    pub fn apply(&mut self, field: &str, value: &FieldValue) {
        match (field, value) {
            (fields::USE_PROJECT_CONTEXT, FieldValue::Bool(v)) => {
                self.use_project_context = Some(*v);
            }
            (fields::PROJECT_CONTEXT, FieldValue::Text(v)) => {
                self.project_context = Some(v.clone());
            }
            (fields::BUG_REPORT_TEMPLATE, FieldValue::Text(v)) => {
                self.bug_report_template = Some(v.clone());
            }
            (fields::JIRA_TOKEN, FieldValue::Text(v)) => self.jira_token = Some(v.clone()),
            (fields::JIRA_URL, FieldValue::Text(v)) => self.jira_url = Some(v.clone()),
            (fields::JIRA_EMAIL, FieldValue::Text(v)) => self.jira_email = Some(v.clone()),
            (fields::JIRA_BUG_QUERY, FieldValue::Text(v)) => self.jira_bug_query = Some(v.clone()),
            (fields::JIRA_DEFAULTS, FieldValue::Map(v)) => self.jira_defaults = Some(v.clone()),
            _ => {
                tracing::warn!(field, "ignoring project field write with mismatched value type");
            }
        }
    }
}

/// Value of a single project settings field write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    Map(BTreeMap<String, String>),
}

/// One rate-limit document per limiter key (`<operation>:<team_id>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitDocument {
    pub rate_limit_key: String,
    pub team_id: String,
    #[serde(default)]
    pub requests: Vec<RequestStamp>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// A request timestamp as stored: native date, or a string written by an
/// earlier version. Unparsable strings are dropped during pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestStamp {
    Native(bson::DateTime),
    Text(String),
}

impl RequestStamp {
    /// Parse to a UTC timestamp; `None` for unparsable text entries.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            RequestStamp::Native(dt) => Some(dt.to_chrono()),
            RequestStamp::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<DateTime<Utc>> for RequestStamp {
    fn from(at: DateTime<Utc>) -> Self {
        RequestStamp::Native(bson::DateTime::from_chrono(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_binding_canonicalizes_to_record() {
        let legacy = ChannelBindingShape::Legacy("Mobile app".to_string());
        let binding = legacy.canonical();
        assert_eq!(binding.project.as_deref(), Some("Mobile app"));
        assert_eq!(binding.welcome_shown, None);
    }

    #[test]
    fn test_binding_shape_deserializes_both_forms() {
        let legacy: ChannelBindingShape = serde_json::from_str("\"Mobile app\"").unwrap();
        assert_eq!(legacy.canonical().project.as_deref(), Some("Mobile app"));

        let record: ChannelBindingShape =
            serde_json::from_str(r#"{"project": "Web", "welcome_shown": true}"#).unwrap();
        let binding = record.canonical();
        assert_eq!(binding.project.as_deref(), Some("Web"));
        assert_eq!(binding.welcome_shown, Some(true));
    }

    #[test]
    fn test_incomplete_doc_detection() {
        let empty = ProjectSettingsDoc::default();
        assert!(!empty.is_complete());

        let full = ProjectSettingsDoc {
            use_project_context: Some(false),
            project_context: Some(String::new()),
            bug_report_template: Some("template".to_string()),
            jira_token: Some(String::new()),
            jira_url: Some(String::new()),
            jira_email: Some(String::new()),
            jira_bug_query: Some(String::new()),
            jira_defaults: Some(BTreeMap::new()),
        };
        assert!(full.is_complete());
    }

    #[test]
    fn test_apply_field_write() {
        let mut doc = ProjectSettingsDoc::default();
        doc.apply(fields::PROJECT_CONTEXT, &FieldValue::Text("docs".to_string()));
        assert_eq!(doc.project_context.as_deref(), Some("docs"));
        // Sibling fields stay untouched.
        assert_eq!(doc.bug_report_template, None);

        // Mismatched value types are ignored rather than corrupting the record.
        doc.apply(fields::USE_PROJECT_CONTEXT, &FieldValue::Text("yes".to_string()));
        assert_eq!(doc.use_project_context, None);
    }

    #[test]
    fn test_request_stamp_parsing() {
        let text = RequestStamp::Text("2025-11-02T10:00:00Z".to_string());
        assert!(text.to_utc().is_some());

        let junk = RequestStamp::Text("not a date".to_string());
        assert!(junk.to_utc().is_none());
    }
}

//! Resolved project settings and typed field writes.

use std::collections::BTreeMap;

use bugsmith_store::{FieldValue, ProjectSettingsDoc, fields};

/// Default bug report template.
pub const DEFAULT_BUG_REPORT_TEMPLATE: &str = "\nBug name:\nSteps:\nActual result:\nExpected:\n";

/// Fully-resolved settings for one project. Unlike the stored form, every
/// field is populated; readers never see a partial record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSettings {
    pub use_project_context: bool,
    pub project_context: String,
    pub bug_report_template: String,
    pub jira_token: String,
    pub jira_url: String,
    pub jira_email: String,
    pub jira_bug_query: String,
    pub jira_defaults: BTreeMap<String, String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            use_project_context: false,
            project_context: String::new(),
            bug_report_template: DEFAULT_BUG_REPORT_TEMPLATE.to_string(),
            jira_token: String::new(),
            jira_url: String::new(),
            jira_email: String::new(),
            jira_bug_query: String::new(),
            jira_defaults: BTreeMap::new(),
        }
    }
}

impl ProjectSettings {
    /// Merge a stored record over the defaults. Stored values win; missing
    /// keys are filled in.
    pub fn from_doc(doc: &ProjectSettingsDoc) -> Self {
        let defaults = Self::default();
        Self {
            use_project_context: doc
                .use_project_context
                .unwrap_or(defaults.use_project_context),
            project_context: doc
                .project_context
                .clone()
                .unwrap_or(defaults.project_context),
            bug_report_template: doc
                .bug_report_template
                .clone()
                .unwrap_or(defaults.bug_report_template),
            jira_token: doc.jira_token.clone().unwrap_or(defaults.jira_token),
            jira_url: doc.jira_url.clone().unwrap_or(defaults.jira_url),
            jira_email: doc.jira_email.clone().unwrap_or(defaults.jira_email),
            jira_bug_query: doc
                .jira_bug_query
                .clone()
                .unwrap_or(defaults.jira_bug_query),
            jira_defaults: doc.jira_defaults.clone().unwrap_or(defaults.jira_defaults),
        }
    }

    /// The complete stored form of this record.
    pub fn to_doc(&self) -> ProjectSettingsDoc {
        ProjectSettingsDoc {
            use_project_context: Some(self.use_project_context),
            project_context: Some(self.project_context.clone()),
            bug_report_template: Some(self.bug_report_template.clone()),
            jira_token: Some(self.jira_token.clone()),
            jira_url: Some(self.jira_url.clone()),
            jira_email: Some(self.jira_email.clone()),
            jira_bug_query: Some(self.jira_bug_query.clone()),
            jira_defaults: Some(self.jira_defaults.clone()),
        }
    }
}

/// A single typed field write. Field names are static strings, so an empty
/// or attacker-shaped field path cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectField {
    UseProjectContext(bool),
    ProjectContext(String),
    BugReportTemplate(String),
    JiraToken(String),
    JiraUrl(String),
    JiraEmail(String),
    JiraBugQuery(String),
    JiraDefaults(BTreeMap<String, String>),
}

impl ProjectField {
    /// The stored field name.
    pub fn name(&self) -> &'static str {
        match self {
            ProjectField::UseProjectContext(_) => fields::USE_PROJECT_CONTEXT,
            ProjectField::ProjectContext(_) => fields::PROJECT_CONTEXT,
            ProjectField::BugReportTemplate(_) => fields::BUG_REPORT_TEMPLATE,
            ProjectField::JiraToken(_) => fields::JIRA_TOKEN,
            ProjectField::JiraUrl(_) => fields::JIRA_URL,
            ProjectField::JiraEmail(_) => fields::JIRA_EMAIL,
            ProjectField::JiraBugQuery(_) => fields::JIRA_BUG_QUERY,
            ProjectField::JiraDefaults(_) => fields::JIRA_DEFAULTS,
        }
    }

    /// The stored value.
    pub fn into_value(self) -> FieldValue {
        match self {
            ProjectField::UseProjectContext(v) => FieldValue::Bool(v),
            ProjectField::ProjectContext(v)
            | ProjectField::BugReportTemplate(v)
            | ProjectField::JiraToken(v)
            | ProjectField::JiraUrl(v)
            | ProjectField::JiraEmail(v)
            | ProjectField::JiraBugQuery(v) => FieldValue::Text(v),
            ProjectField::JiraDefaults(v) => FieldValue::Map(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_four_line_template() {
        let settings = ProjectSettings::default();
        let lines: Vec<&str> = settings
            .bug_report_template
            .lines()
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(lines, ["Bug name:", "Steps:", "Actual result:", "Expected:"]);
        assert!(!settings.use_project_context);
        assert!(settings.jira_defaults.is_empty());
    }

    #[test]
    fn test_merge_stored_values_win() {
        let doc = ProjectSettingsDoc {
            project_context: Some("release notes".to_string()),
            ..ProjectSettingsDoc::default()
        };
        let merged = ProjectSettings::from_doc(&doc);
        assert_eq!(merged.project_context, "release notes");
        assert_eq!(merged.bug_report_template, DEFAULT_BUG_REPORT_TEMPLATE);
    }

    #[test]
    fn test_round_trip_is_complete() {
        let merged = ProjectSettings::from_doc(&ProjectSettingsDoc::default());
        assert!(merged.to_doc().is_complete());
    }

    #[test]
    fn test_field_names_match_store_constants() {
        assert_eq!(
            ProjectField::BugReportTemplate(String::new()).name(),
            "bug_report_template"
        );
        assert_eq!(
            ProjectField::JiraDefaults(BTreeMap::new()).name(),
            "jira_defaults"
        );
    }
}

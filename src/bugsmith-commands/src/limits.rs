//! Input limits and client timeouts.

use std::time::Duration;

/// Longest message accepted for bug report generation.
pub const MAX_BUG_REPORT_INPUT_LENGTH: usize = 4000;

pub const MIN_JIRA_TOKEN_LENGTH: usize = 10;
pub const MAX_JIRA_TOKEN_LENGTH: usize = 500;

pub const MAX_JIRA_URL_LENGTH: usize = 2000;

pub const MIN_JIRA_QUERY_LENGTH: usize = 5;
pub const MAX_JIRA_QUERY_LENGTH: usize = 1000;

pub const MAX_JIRA_EMAIL_LENGTH: usize = 254;

pub const MAX_JIRA_FIELD_NAME_LENGTH: usize = 100;
pub const MAX_JIRA_FIELD_VALUE_LENGTH: usize = 500;

/// Cap on issues returned by `get bugs`.
pub const MAX_JIRA_ISSUES_LIMIT: u32 = 20;

/// Timeout for Jira API calls.
pub const JIRA_CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

//! Command handlers, grouped by area.

pub mod bug_report;
pub mod general;
pub mod jira;
pub mod project;

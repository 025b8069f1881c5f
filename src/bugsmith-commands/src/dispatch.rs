//! Keyword-containment command dispatch.
//!
//! Matching is case-insensitive substring containment, one command per
//! message. Order matters: specific phrases come before generic words like
//! `status` or `help` so free text around a command cannot shadow it.

/// Commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    UseProject,
    ListProjects,
    ShowBugTemplate,
    EditBugTemplate,
    CreateBugReport,
    ShowProject,
    UpdateDocs,
    EnableDocs,
    DisableDocs,
    SetJiraToken,
    SetJiraUrl,
    SetJiraEmail,
    SetJiraQuery,
    ShowJiraQuery,
    SetJiraDefaults,
    ShowJiraDefaults,
    ClearJiraDefault,
    TestJira,
    GetBugs,
    Status,
    Help,
    Unknown,
}

/// Dispatch table, most specific first.
const KEYWORDS: &[(&str, Command)] = &[
    ("use project", Command::UseProject),
    ("list projects", Command::ListProjects),
    ("show bug template", Command::ShowBugTemplate),
    ("edit bug template", Command::EditBugTemplate),
    ("create bug report", Command::CreateBugReport),
    ("show project", Command::ShowProject),
    ("update docs", Command::UpdateDocs),
    ("enable docs", Command::EnableDocs),
    ("disable docs", Command::DisableDocs),
    ("set jira token", Command::SetJiraToken),
    ("set jira url", Command::SetJiraUrl),
    ("set jira email", Command::SetJiraEmail),
    ("set jira query", Command::SetJiraQuery),
    ("show jira query", Command::ShowJiraQuery),
    ("set jira defaults", Command::SetJiraDefaults),
    ("show jira defaults", Command::ShowJiraDefaults),
    ("clear jira default", Command::ClearJiraDefault),
    ("test jira", Command::TestJira),
    ("get bugs", Command::GetBugs),
    ("status", Command::Status),
    ("help", Command::Help),
];

/// True if the text contains any of the keywords, case-insensitively.
pub fn contains(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_ascii_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

/// Match a message to a command.
pub fn match_command(text: &str) -> Command {
    let lowered = text.to_ascii_lowercase();
    KEYWORDS
        .iter()
        .find(|(phrase, _)| lowered.contains(phrase))
        .map(|(_, command)| *command)
        .unwrap_or(Command::Unknown)
}

/// Remove the first case-insensitive occurrence of the command phrase from
/// the text, returning the trimmed remainder (the command's payload).
///
/// ASCII lowercasing keeps byte offsets aligned with the original text, so
/// the payload keeps its casing even around non-ASCII content.
pub fn strip_command(text: &str, phrase: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let phrase = phrase.to_ascii_lowercase();
    match lowered.find(&phrase) {
        Some(idx) => {
            let mut cleaned = String::with_capacity(text.len());
            cleaned.push_str(&text[..idx]);
            cleaned.push_str(&text[idx + phrase.len()..]);
            cleaned.trim().to_string()
        }
        None => text.trim().to_string(),
    }
}

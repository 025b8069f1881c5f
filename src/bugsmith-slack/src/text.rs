//! Slack text cleanup helpers.

/// Strip user mentions from a message, leaving the command text.
///
/// Patterns: `<@USER_ID>` or `<@USER_ID|username>`.
pub fn strip_mentions(text: &str) -> String {
    let mut result = text.to_string();

    while let Some(start) = result.find("<@") {
        if let Some(end) = result[start..].find('>') {
            result = format!("{}{}", &result[..start], &result[start + end + 1..]);
        } else {
            break;
        }
    }

    result.trim().to_string()
}

/// Unwrap Slack link formatting: `<https://x|label>` or `<https://x>`.
pub fn unwrap_link(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(inner) = trimmed.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        match inner.split_once('|') {
            Some((url, _label)) => url,
            None => inner,
        }
    } else {
        trimmed
    }
}

/// Remove invisible characters that smuggle into pasted URLs (zero-width
/// spaces/joiners, BOM) and replace non-breaking spaces with plain spaces.
pub fn clean_invisible(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .map(|c| if c == '\u{00a0}' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mentions_simple() {
        assert_eq!(strip_mentions("<@U12345> review this"), "review this");
    }

    #[test]
    fn test_strip_mentions_with_username() {
        assert_eq!(strip_mentions("<@U12345|bugsmith> help me"), "help me");
    }

    #[test]
    fn test_strip_mentions_multiple() {
        assert_eq!(strip_mentions("<@U1> <@U2> check this"), "check this");
    }

    #[test]
    fn test_strip_mentions_none() {
        assert_eq!(strip_mentions("just a message"), "just a message");
    }

    #[test]
    fn test_unwrap_link_forms() {
        assert_eq!(
            unwrap_link("<https://example.atlassian.net|example.atlassian.net>"),
            "https://example.atlassian.net"
        );
        assert_eq!(unwrap_link("<https://example.com>"), "https://example.com");
        assert_eq!(unwrap_link("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_clean_invisible_characters() {
        assert_eq!(
            clean_invisible("\u{feff}https://x\u{200b}.net\u{00a0}"),
            "https://x.net"
        );
    }
}

use crate::{Config, Record};

/// Decide whether a record matches the active keyword/account policy.
///
/// Case-insensitive substring test over the record's content. An account
/// matches with its leading `@` stripped. An empty policy matches nothing.
pub fn is_relevant(record: &Record, config: &Config) -> bool {
    let text = record.content.to_lowercase();
    mentions_account(&text, &config.monitored_accounts) || contains_keyword(&text, &config.keywords)
}

fn mentions_account(text: &str, accounts: &[String]) -> bool {
    accounts.iter().any(|account| {
        let handle = account.trim();
        let handle = handle.strip_prefix('@').unwrap_or(handle);
        matches_needle(text, handle)
    })
}

fn contains_keyword(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| matches_needle(text, keyword.trim()))
}

// A blank needle would match every record.
fn matches_needle(text: &str, needle: &str) -> bool {
    !needle.is_empty() && text.contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::is_relevant;
    use crate::{Config, Record};

    fn record(content: &str) -> Record {
        Record {
            item_id: "1".to_string(),
            content: content.to_string(),
            author_handle: "someone".to_string(),
            author_display_name: "Someone".to_string(),
            created_at: String::new(),
            source_url: String::new(),
            captured_at: String::new(),
        }
    }

    fn policy(keywords: &[&str], accounts: &[&str]) -> Config {
        Config {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            monitored_accounts: accounts.iter().map(|a| a.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn empty_policy_fails_closed() {
        let config = policy(&[], &[]);
        for text in ["", "bug", "anything at all", "@acme is broken"] {
            assert!(!is_relevant(&record(text), &config), "{text:?}");
        }
    }

    #[test]
    fn keyword_match_ignores_case() {
        let config = policy(&["bug"], &[]);
        assert!(is_relevant(&record("Found a BUG today"), &config));
        assert!(!is_relevant(&record("all good"), &config));
    }

    #[test]
    fn keyword_matches_as_substring() {
        let config = policy(&["crash"], &[]);
        assert!(is_relevant(&record("it keeps crashing"), &config));
    }

    #[test]
    fn account_match_strips_marker() {
        let config = policy(&[], &["@AcmeApp"]);
        assert!(is_relevant(&record("hey @acmeapp this is neat"), &config));
        assert!(is_relevant(&record("acmeapp without the at sign"), &config));
        assert!(!is_relevant(&record("unrelated"), &config));
    }

    #[test]
    fn blank_entries_never_match() {
        let config = policy(&["  "], &["@", ""]);
        assert!(!is_relevant(&record("any text"), &config));
    }

    #[test]
    fn author_handle_alone_is_not_matched() {
        let mut item = record("nothing interesting");
        item.author_handle = "acmeapp".to_string();
        let config = policy(&[], &["@acmeapp"]);
        assert!(!is_relevant(&item, &config));
    }
}

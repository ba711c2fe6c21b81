//! Workspace credential lookup.
//!
//! The credential lives in a `.env` file at the workspace root and is
//! re-read on every request — no caching, so an edited key takes effect on
//! the next lookup.

use std::path::Path;

/// File probed at the workspace root.
pub const ENV_FILE: &str = ".env";
/// The single key the preview reads out of it.
pub const CREDENTIAL_KEY: &str = "PINNACLE_API_KEY";

/// Read `key` from `<root>/.env`. Any failure — file absent, unreadable,
/// key missing — yields an empty string rather than an error.
pub async fn read_credential(root: &Path, key: &str) -> String {
    match tokio::fs::read_to_string(root.join(ENV_FILE)).await {
        Ok(content) => lookup(&content, key).unwrap_or_default(),
        Err(e) => {
            tracing::debug!("credential file not readable: {e}");
            String::new()
        }
    }
}

/// Line-oriented `KEY=VALUE` scan. The first `=` splits key from value;
/// later occurrences of the same key win.
fn lookup(content: &str, key: &str) -> Option<String> {
    let mut found = None;
    for line in content.lines() {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if k.trim() == key {
            found = Some(strip_quotes(v.trim()).to_string());
        }
    }
    found
}

/// Strip one layer of matching surrounding quotes.
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extracts_named_key_and_strips_quotes() {
        let content = "PINNACLE_API_KEY=\"secret123\"\nOTHER=x";
        assert_eq!(
            lookup(content, "PINNACLE_API_KEY").as_deref(),
            Some("secret123")
        );
    }

    #[test]
    fn single_quotes_stripped_too() {
        assert_eq!(lookup("K='abc'", "K").as_deref(), Some("abc"));
    }

    #[test]
    fn mismatched_quotes_left_alone() {
        assert_eq!(lookup("K=\"abc'", "K").as_deref(), Some("\"abc'"));
    }

    #[test]
    fn value_split_at_first_equals() {
        assert_eq!(lookup("K=a=b=c", "K").as_deref(), Some("a=b=c"));
    }

    #[test]
    fn later_duplicate_wins() {
        assert_eq!(lookup("K=first\nK=second", "K").as_deref(), Some("second"));
    }

    #[test]
    fn missing_key_is_none() {
        assert_eq!(lookup("OTHER=x", "PINNACLE_API_KEY"), None);
        assert_eq!(lookup("", "PINNACLE_API_KEY"), None);
    }

    #[test]
    fn whitespace_around_key_and_value_trimmed() {
        assert_eq!(lookup("  K  =  v  ", "K").as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn missing_file_yields_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_credential(dir.path(), CREDENTIAL_KEY).await, "");
    }

    #[tokio::test]
    async fn reads_key_from_env_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(ENV_FILE),
            "PINNACLE_API_KEY=\"secret123\"\nOTHER=x\n",
        )
        .unwrap();
        assert_eq!(
            read_credential(dir.path(), CREDENTIAL_KEY).await,
            "secret123"
        );
    }

    #[tokio::test]
    async fn edits_are_visible_on_next_read() {
        let dir = TempDir::new().unwrap();
        let env = dir.path().join(ENV_FILE);
        std::fs::write(&env, "PINNACLE_API_KEY=old").unwrap();
        assert_eq!(read_credential(dir.path(), CREDENTIAL_KEY).await, "old");
        std::fs::write(&env, "PINNACLE_API_KEY=new").unwrap();
        assert_eq!(read_credential(dir.path(), CREDENTIAL_KEY).await, "new");
    }
}

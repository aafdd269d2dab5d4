use std::fs;
use std::path::Path;

use anyhow::Context;

/// Loads the username list. The file must hold a JSON array of strings;
/// anything else halts the batch before any browser work starts.
pub fn load_usernames(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read usernames file '{}'", path.display()))?;

    let usernames: Vec<String> = serde_json::from_str(&raw).with_context(|| {
        format!(
            "usernames file '{}' must contain a JSON list of strings",
            path.display()
        )
    })?;

    Ok(usernames)
}

use std::fs;
use std::path::PathBuf;

use crate::configuration::BatchSettings;
use crate::domain::QuestRecord;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize quest records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Maps a display name onto something safe to embed in a filename: every
/// character outside [A-Za-z0-9_-] becomes an underscore.
pub fn sanitize_username(username: &str) -> String {
    username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes one user's records as a pretty-printed JSON array. An empty record
/// list produces no artifact and is not an error.
pub fn write_user_result(
    settings: &BatchSettings,
    username: &str,
    records: &[QuestRecord],
) -> Result<Option<PathBuf>, PersistenceError> {
    if records.is_empty() {
        log::info!("No data to save for user '{}'", username);
        return Ok(None);
    }

    let filename = settings
        .output_filename_template
        .replace("{username}", &sanitize_username(username));
    let path = settings.output_dir.join(filename);

    let json = serde_json::to_string_pretty(records)?;

    fs::create_dir_all(&settings.output_dir).map_err(|source| PersistenceError::Io {
        path: settings.output_dir.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| PersistenceError::Io {
        path: path.clone(),
        source,
    })?;

    log::info!("Data successfully saved to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestStatus;

    fn settings(dir: &std::path::Path) -> BatchSettings {
        BatchSettings {
            usernames_file: dir.join("usernames.json"),
            output_dir: dir.to_path_buf(),
            output_filename_template: "{username}_quest_status.json".to_string(),
            error_log_file: dir.join("errors.log"),
            pause_between_users_secs: 2,
        }
    }

    #[test]
    fn sanitizes_disallowed_characters() {
        assert_eq!(sanitize_username("Zezima!"), "Zezima_");
        assert_eq!(sanitize_username("Iron Man 99"), "Iron_Man_99");
        assert_eq!(sanitize_username("ok-name_123"), "ok-name_123");
    }

    #[test]
    fn empty_records_produce_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        let written = write_user_result(&settings, "Zezima", &[]).unwrap();

        assert!(written.is_none());
        assert!(!dir.path().join("Zezima_quest_status.json").exists());
    }

    #[test]
    fn writes_records_under_the_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let records = vec![QuestRecord {
            title: "Cook's Assistant".to_string(),
            status: QuestStatus::Complete,
        }];

        let written = write_user_result(&settings, "Zezima!", &records)
            .unwrap()
            .unwrap();

        assert_eq!(written, dir.path().join("Zezima__quest_status.json"));

        let contents = std::fs::read_to_string(&written).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed[0]["title"], "Cook's Assistant");
        assert_eq!(parsed[0]["status"], "complete");
    }
}

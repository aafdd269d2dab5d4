use std::path::PathBuf;

use serde_aux::field_attributes::deserialize_number_from_string;
use url::Url;

const DEFAULT_TARGET_URL: &str = "https://oldschool.runescape.wiki/w/RuneScape:WikiSync/Tracker";

// The tracker renders differently for ancient browsers; this UA is known good.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub tracker: TrackerSettings,
    pub batch: BatchSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TrackerSettings {
    pub target_url: String,
    pub webdriver_url: String,
    pub user_agent: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub attempts: u32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct BatchSettings {
    pub usernames_file: PathBuf,
    pub output_dir: PathBuf,
    pub output_filename_template: String,
    pub error_log_file: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub pause_between_users_secs: u64,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("tracker.target_url", DEFAULT_TARGET_URL)?
        .set_default("tracker.webdriver_url", "http://localhost:9515")?
        .set_default("tracker.user_agent", DEFAULT_USER_AGENT)?
        .set_default("tracker.attempts", 3)?
        .set_default("batch.usernames_file", "usernames.json")?
        .set_default("batch.output_dir", ".")?
        .set_default(
            "batch.output_filename_template",
            "{username}_quest_status.json",
        )?
        .set_default("batch.error_log_file", "scraping_errors.log")?
        .set_default("batch.pause_between_users_secs", 2)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;

    Url::parse(&settings.tracker.target_url)
        .map_err(|e| config::ConfigError::Message(format!("invalid tracker.target_url: {}", e)))?;
    Url::parse(&settings.tracker.webdriver_url).map_err(|e| {
        config::ConfigError::Message(format!("invalid tracker.webdriver_url: {}", e))
    })?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::get_configuration;

    #[test]
    fn defaults_load_without_file_or_env() {
        let settings = get_configuration().unwrap();

        assert_eq!(
            settings.tracker.target_url,
            "https://oldschool.runescape.wiki/w/RuneScape:WikiSync/Tracker"
        );
        assert_eq!(settings.tracker.attempts, 3);
        assert_eq!(settings.batch.pause_between_users_secs, 2);
        assert!(settings
            .batch
            .output_filename_template
            .contains("{username}"));
    }
}

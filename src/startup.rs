use std::time::Duration;

use crate::configuration::Settings;
use crate::error_log::ErrorLog;
use crate::services::{
    extract_quests, fetch_quest_page, write_user_result, BrowserSession, FetchOutcome,
};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub saved: usize,
    pub failed: usize,
}

/// Runs the whole batch: one browser session, one user at a time. Per-user
/// failures are absorbed; the only fatal error after startup is failing to
/// acquire the session.
pub async fn run(settings: Settings, usernames: Vec<String>) -> anyhow::Result<BatchSummary> {
    let error_log = ErrorLog::new(settings.batch.error_log_file.clone());

    let mut summary = BatchSummary::default();
    if usernames.is_empty() {
        log::info!("No usernames to process, exiting");
        return Ok(summary);
    }

    let session = match BrowserSession::acquire(&settings.tracker).await {
        Ok(session) => session,
        Err(e) => {
            error_log.append(&format!("WebDriver setup failed: {}", e));
            return Err(e.into());
        }
    };

    // No `?` below this point: the session must be released exactly once,
    // however many users fail.
    let pause = Duration::from_secs(settings.batch.pause_between_users_secs);
    for (i, username) in usernames.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(pause).await;
        }
        process_user(&session, &settings, username, &error_log, &mut summary).await;
    }

    log::info!("Finished processing all usernames");
    session.release().await;

    Ok(summary)
}

async fn process_user(
    session: &BrowserSession,
    settings: &Settings,
    username: &str,
    error_log: &ErrorLog,
    summary: &mut BatchSummary,
) {
    log::info!("========== Processing user: {} ==========", username);
    summary.processed += 1;

    let outcome = fetch_quest_page(
        session.driver(),
        &settings.tracker.target_url,
        username,
        settings.tracker.attempts,
        error_log,
    )
    .await;

    let page_source = match outcome {
        FetchOutcome::Success { page_source } => page_source,
        FetchOutcome::Failure {
            attempts,
            last_error,
        } => {
            summary.failed += 1;
            log::error!(
                "Giving up on user '{}' after {} attempt(s): {}",
                username,
                attempts,
                last_error
            );
            error_log.append(&format!(
                "Fetch/interaction failed for user '{}'. Data processing skipped.",
                username
            ));
            return;
        }
    };

    let records = extract_quests(&page_source, username, error_log);

    match write_user_result(&settings.batch, username, &records) {
        Ok(Some(_)) => summary.saved += 1,
        Ok(None) => {}
        Err(e) => {
            log::error!("Could not persist results for user '{}': {}", username, e);
            error_log.append(&format!(
                "Error writing output for user '{}': {}",
                username, e
            ));
        }
    }
}

use std::future::Future;
use std::time::Duration;

use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::ElementQueryable;
use thirtyfour::{By, WebDriver};

use crate::error_log::ErrorLog;

const USERNAME_INPUT: &str = "//input[@placeholder='Display name']";
const LOOKUP_BUTTON: &str = "//button[contains(., 'Look up')]";
const RESULTS_CONTAINER: &str = "div.div-col";

const LONG_WAIT: Duration = Duration::from_secs(45);
const SHORT_WAIT: Duration = Duration::from_secs(20);
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const INPUT_SETTLE: Duration = Duration::from_millis(500);
const RESULTS_SETTLE: Duration = Duration::from_secs(5);
const RETRY_PAUSE: Duration = Duration::from_secs(2);

/// Result of driving the lookup form for one username, after retries.
pub enum FetchOutcome {
    Success {
        page_source: String,
    },
    Failure {
        attempts: u32,
        last_error: InteractionError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("timed out after {limit_secs}s waiting for {step}: {detail}")]
    Timeout {
        step: &'static str,
        limit_secs: u64,
        detail: String,
    },
    #[error("username input verification failed: field reads '{actual}', expected '{expected}'")]
    Verification { expected: String, actual: String },
    #[error(transparent)]
    WebDriver(#[from] WebDriverError),
}

/// Drives one full lookup round-trip for `username`, retrying the whole
/// sequence up to `attempts` times. Never panics and never aborts the batch;
/// the caller decides what a `Failure` means.
pub async fn fetch_quest_page(
    driver: &WebDriver,
    url: &str,
    username: &str,
    attempts: u32,
    error_log: &ErrorLog,
) -> FetchOutcome {
    run_with_retries(username, attempts, error_log, || {
        run_attempt(driver, url, username)
    })
    .await
}

async fn run_with_retries<F, Fut>(
    username: &str,
    attempts: u32,
    error_log: &ErrorLog,
    mut attempt_fn: F,
) -> FetchOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, InteractionError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        log::info!(
            "--- Attempt {}/{} for user: {} ---",
            attempt,
            attempts,
            username
        );

        match attempt_fn().await {
            Ok(page_source) => return FetchOutcome::Success { page_source },
            Err(e) => {
                log::error!("Attempt {} failed for user '{}': {}", attempt, username, e);
                error_log.append(&format!(
                    "Attempt {} failed for user '{}'. Error: {}",
                    attempt, username, e
                ));

                if attempt >= attempts {
                    log::error!("Max attempts reached for user '{}'. Skipping.", username);
                    return FetchOutcome::Failure {
                        attempts,
                        last_error: e,
                    };
                }
                attempt += 1;
                tokio::time::sleep(RETRY_PAUSE).await;
            }
        }
    }
}

async fn run_attempt(
    driver: &WebDriver,
    url: &str,
    username: &str,
) -> Result<String, InteractionError> {
    log::info!("Navigating to: {}", url);
    driver.goto(url).await?;

    let input = driver
        .query(By::XPath(USERNAME_INPUT))
        .wait(LONG_WAIT, POLL_INTERVAL)
        .and_displayed()
        .first()
        .await
        .map_err(|e| step_timeout("username input", LONG_WAIT, e))?;

    input.clear().await?;
    tokio::time::sleep(INPUT_SETTLE).await;
    input.send_keys(username).await?;
    tokio::time::sleep(INPUT_SETTLE).await;

    // A half-typed name silently yields the wrong player's results, so read
    // the field back before submitting.
    let entered = input.value().await?.unwrap_or_default();
    if entered != username {
        return Err(InteractionError::Verification {
            expected: username.to_string(),
            actual: entered,
        });
    }
    log::info!("Sent keys and verified: {}", username);

    let button = driver
        .query(By::XPath(LOOKUP_BUTTON))
        .wait(SHORT_WAIT, POLL_INTERVAL)
        .and_clickable()
        .first()
        .await
        .map_err(|e| step_timeout("lookup button", SHORT_WAIT, e))?;

    if let Err(e) = button.click().await {
        if matches!(e, WebDriverError::ElementClickIntercepted(..)) {
            log::info!("Standard click intercepted, trying JavaScript click");
            driver
                .execute("arguments[0].click();", vec![button.to_json()?])
                .await?;
        } else {
            return Err(e.into());
        }
    }

    // Presence only: the container appears before all of its rows render.
    driver
        .query(By::Css(RESULTS_CONTAINER))
        .wait(LONG_WAIT, POLL_INTERVAL)
        .first()
        .await
        .map_err(|e| step_timeout("results container", LONG_WAIT, e))?;

    // The page exposes no "fully loaded" signal once the container exists.
    // TODO: replace with a DOM-quiescence poll, keeping this as the ceiling.
    tokio::time::sleep(RESULTS_SETTLE).await;

    Ok(driver.source().await?)
}

fn step_timeout(step: &'static str, limit: Duration, source: WebDriverError) -> InteractionError {
    InteractionError::Timeout {
        step,
        limit_secs: limit.as_secs(),
        detail: source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn entry_count(log: &ErrorLog) -> usize {
        match std::fs::read_to_string(log.path()) {
            Ok(contents) => contents.lines().filter(|l| l.starts_with('[')).count(),
            Err(_) => 0,
        }
    }

    fn timeout_error() -> InteractionError {
        InteractionError::Timeout {
            step: "results container",
            limit_secs: 45,
            detail: "no element found matching css selector 'div.div-col'".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn three_timeouts_exhaust_attempts_and_log_each_one() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"));
        let calls = Cell::new(0u32);

        let outcome = run_with_retries("Alice", 3, &log, || {
            calls.set(calls.get() + 1);
            async { Err(timeout_error()) }
        })
        .await;

        assert_eq!(calls.get(), 3);
        match outcome {
            FetchOutcome::Failure {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last_error, InteractionError::Timeout { .. }));
            }
            FetchOutcome::Success { .. } => panic!("expected a failure outcome"),
        }

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(entry_count(&log), 3);
        assert_eq!(contents.matches("user 'Alice'").count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_a_later_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"));
        let calls = Cell::new(0u32);

        let outcome = run_with_retries("Bob", 3, &log, || {
            calls.set(calls.get() + 1);
            let succeed = calls.get() == 2;
            async move {
                if succeed {
                    Ok("<html></html>".to_string())
                } else {
                    Err(timeout_error())
                }
            }
        })
        .await;

        assert_eq!(calls.get(), 2);
        assert!(matches!(outcome, FetchOutcome::Success { .. }));
        assert_eq!(entry_count(&log), 1);
    }

    #[tokio::test]
    async fn first_try_success_writes_nothing_to_the_error_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"));

        let outcome = run_with_retries("Carol", 3, &log, || async {
            Ok("<html></html>".to_string())
        })
        .await;

        match outcome {
            FetchOutcome::Success { page_source } => assert_eq!(page_source, "<html></html>"),
            FetchOutcome::Failure { .. } => panic!("expected success"),
        }
        assert_eq!(entry_count(&log), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"));
        let calls = Cell::new(0u32);

        let outcome = run_with_retries("Dave", 0, &log, || {
            calls.set(calls.get() + 1);
            async { Err(timeout_error()) }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(outcome, FetchOutcome::Failure { attempts: 1, .. }));
    }
}

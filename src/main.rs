use anyhow::Context;
use env_logger::Env;
use wikisync_scraper::{
    configuration::get_configuration, error_log::ErrorLog, services::load_usernames, startup::run,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = get_configuration().context("Failed to read configuration")?;
    let error_log = ErrorLog::new(settings.batch.error_log_file.clone());

    let usernames = match load_usernames(&settings.batch.usernames_file) {
        Ok(usernames) => usernames,
        Err(e) => {
            error_log.append(&format!("{:#}", e));
            return Err(e);
        }
    };
    log::info!(
        "Successfully loaded {} usernames from '{}'",
        usernames.len(),
        settings.batch.usernames_file.display()
    );

    let summary = run(settings, usernames).await?;
    log::info!(
        "Done: {} processed, {} saved, {} failed",
        summary.processed,
        summary.saved,
        summary.failed
    );

    Ok(())
}

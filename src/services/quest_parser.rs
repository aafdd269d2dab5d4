use scraper::{ElementRef, Html, Selector};

use crate::domain::{QuestRecord, QuestStatus};
use crate::error_log::ErrorLog;

const CONTAINER_SELECTOR: &str = "div.div-col";
const ANCHOR_SELECTOR: &str = "a[href][title]";
const ICON_SELECTOR: &str = "span.rs-qc-icon";
const IMG_SELECTOR: &str = "img";

// Only wiki article links are quest entries; everything else in the results
// area is navigation chrome.
const ARTICLE_PATH_PREFIX: &str = "/w/";

const COMPLETE_CLASS: &str = "qc-complete";
const NOT_STARTED_CLASS: &str = "qc-not-started";

#[derive(Debug, thiserror::Error)]
pub enum ElementParseError {
    #[error("quest link has no resolvable title")]
    MissingTitle,
}

/// Extracts quest-title/status pairs from a captured tracker page. Never
/// fails outright: a malformed entry is logged and skipped, and markup with
/// no recognizable results area yields an empty vector.
pub fn extract_quests(html: &str, username: &str, error_log: &ErrorLog) -> Vec<QuestRecord> {
    let container_selector = Selector::parse(CONTAINER_SELECTOR).unwrap();
    let anchor_selector = Selector::parse(ANCHOR_SELECTOR).unwrap();
    let icon_selector = Selector::parse(ICON_SELECTOR).unwrap();
    let img_selector = Selector::parse(IMG_SELECTOR).unwrap();

    let document = Html::parse_document(html);

    let containers: Vec<ElementRef> = document.select(&container_selector).collect();
    if containers.is_empty() {
        let warning = format!(
            "Warning (User: {}): Could not find any quest containers with class 'div-col'. \
             Parsing cannot proceed.",
            username
        );
        log::warn!("{}", warning);
        error_log.append(&warning);
        return vec![];
    }

    let mut records = vec![];
    let mut links_seen = 0;
    let mut parse_errors = 0;

    for container in &containers {
        for anchor in container.select(&anchor_selector) {
            let is_article_link = anchor
                .value()
                .attr("href")
                .is_some_and(|href| href.starts_with(ARTICLE_PATH_PREFIX));
            if !is_article_link {
                continue;
            }
            links_seen += 1;

            match parse_quest_anchor(anchor, &icon_selector, &img_selector) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    parse_errors += 1;
                    log::error!("Error parsing one link for user '{}': {}", username, e);
                    error_log.append(&format!(
                        "Error parsing individual quest link (User: {}). Error: {}\n\
                         Problematic link HTML:\n{}",
                        username,
                        e,
                        anchor.html()
                    ));
                }
            }
        }
    }

    log::info!(
        "Analyzed {} quest links across {} container(s) for user '{}': {} with status, {} errors",
        links_seen,
        containers.len(),
        username,
        records.len(),
        parse_errors
    );

    records
}

fn parse_quest_anchor(
    anchor: ElementRef,
    icon_selector: &Selector,
    img_selector: &Selector,
) -> Result<Option<QuestRecord>, ElementParseError> {
    let Some(icon) = anchor.select(icon_selector).next() else {
        return Ok(None);
    };
    let Some(img) = icon.select(img_selector).next() else {
        return Ok(None);
    };

    let img = img.value();
    let status = if img.classes().any(|c| c == COMPLETE_CLASS) {
        QuestStatus::Complete
    } else if img.classes().any(|c| c == NOT_STARTED_CLASS) {
        QuestStatus::NotStarted
    } else {
        // Unrecognized icon class: drop the entry rather than persist a
        // made-up status.
        return Ok(None);
    };

    let title = resolve_title(&anchor).ok_or(ElementParseError::MissingTitle)?;
    Ok(Some(QuestRecord { title, status }))
}

fn resolve_title(anchor: &ElementRef) -> Option<String> {
    let from_attr = anchor.value().attr("title").map(str::trim).unwrap_or("");
    if !from_attr.is_empty() {
        return Some(from_attr.to_string());
    }

    if let Some(first) = anchor.text().next() {
        let first = first.trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }

    let full = anchor.text().collect::<String>().trim().to_string();
    (!full.is_empty()).then_some(full)
}

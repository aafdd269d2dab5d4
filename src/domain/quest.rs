use serde::Serialize;

/// Completion state as shown by the tracker's status icons. The page only
/// ever renders these two; anything else is discarded during extraction and
/// never reaches a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuestStatus {
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "not started")]
    NotStarted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestRecord {
    pub title: String,
    pub status: QuestStatus,
}

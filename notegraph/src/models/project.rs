use chrono::NaiveDate;

use super::DatedEntry;

/// One `.md` document found beneath a project folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDocument {
    pub file_path: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub entries: Vec<DatedEntry>,
    pub links: Vec<String>,
}

/// A project folder aggregated over all of its documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Folder name as found on disk (NFC), the project's natural key.
    pub folder_name: String,

    /// Display name, with any date prefix removed.
    pub name: String,

    pub start_date: Option<NaiveDate>,
    pub archived: bool,

    /// Folder path relative to the vault root.
    pub file_path: String,

    /// Summary of the first document that declares one.
    pub summary: Option<String>,

    /// Tags of every document, first-seen order, deduplicated.
    pub tags: Vec<String>,

    /// Dated entries of every document, in document order.
    pub entries: Vec<DatedEntry>,

    pub links: Vec<String>,
}

use chrono::NaiveDate;

/// A date-stamped span of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedEntry {
    pub date: NaiveDate,

    /// Trimmed text following the date marker. May be empty.
    pub excerpt: String,
}

impl DatedEntry {
    pub fn new(date: NaiveDate, excerpt: impl Into<String>) -> Self {
        Self {
            date,
            excerpt: excerpt.into(),
        }
    }
}

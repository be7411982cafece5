use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::DatedEntry;

/// Contact channels recognized under a person's `contact:` header mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactKind {
    Phone,
    Email,
    LinkedIn,
    Slack,
    Discord,
    Kakao,
    Instagram,
    Twitter,
    GitHub,
    Website,
}

impl ContactKind {
    pub const ALL: [ContactKind; 10] = [
        ContactKind::Phone,
        ContactKind::Email,
        ContactKind::LinkedIn,
        ContactKind::Slack,
        ContactKind::Discord,
        ContactKind::Kakao,
        ContactKind::Instagram,
        ContactKind::Twitter,
        ContactKind::GitHub,
        ContactKind::Website,
    ];

    /// Key used in the document header.
    pub fn header_key(&self) -> &'static str {
        match self {
            ContactKind::Phone => "phone",
            ContactKind::Email => "email",
            ContactKind::LinkedIn => "linkedin",
            ContactKind::Slack => "slack",
            ContactKind::Discord => "discord",
            ContactKind::Kakao => "kakao",
            ContactKind::Instagram => "instagram",
            ContactKind::Twitter => "twitter",
            ContactKind::GitHub => "github",
            ContactKind::Website => "website",
        }
    }
}

/// Everything the entity builder learned from one person document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    /// Identity name, after the header title override.
    pub name: String,

    /// Name portion of the filename, used as an extra cross-reference key.
    pub file_name: String,

    /// Path relative to the vault root.
    pub file_path: String,

    pub affiliation: Option<String>,
    pub position: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub contacts: BTreeMap<ContactKind, String>,
    pub last_contact: Option<NaiveDate>,
    pub entries: Vec<DatedEntry>,

    /// Cross-reference targets found in the body, first-seen order.
    pub links: Vec<String>,
}

impl PersonRecord {
    pub fn email(&self) -> Option<&str> {
        self.contacts.get(&ContactKind::Email).map(String::as_str)
    }
}

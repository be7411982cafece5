use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::frontmatter::split_header;
use super::relations::{dedup_ordered, RelationExtractor};
use super::temporal::TemporalExtractor;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::models::{ContactKind, PersonRecord, ProjectDocument, ProjectRecord};

/// Turns single documents into typed records.
///
/// Building is a pure function of (path, content): nothing is read from disk
/// and nothing outside the returned record is touched. The only failure is a
/// document whose header block cannot be delimited.
pub struct EntityBuilder {
    temporal: TemporalExtractor,
    relations: RelationExtractor,
    title_noise: Vec<Regex>,
    affiliation_cleanup: Vec<Regex>,
    work_field: Regex,
    project_folder: Regex,
    position_suffixes: Vec<String>,
    title_position_suffixes: Vec<String>,
    name_separators: Vec<String>,
    excluded_affiliations: Vec<String>,
    email_domains: HashMap<String, String>,
    personal_email_domains: HashSet<String>,
}

impl EntityBuilder {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| Regex::new(p).map_err(Into::into))
                .collect()
        };

        Ok(Self {
            temporal: TemporalExtractor::new()?,
            relations: RelationExtractor::new(config.topic_categories.clone())?,
            title_noise: compile(&config.title_noise_patterns)?,
            affiliation_cleanup: compile(&config.affiliation_cleanup_patterns)?,
            work_field: Regex::new(r"(?m)\*\*직장\*\*\s*:\s*(.+?)\s*$")?,
            project_folder: Regex::new(r"^(\d{2})(\d{2})(\d{2})?\s+(.*\S)\s*$")?,
            position_suffixes: longest_first(&config.position_suffixes),
            title_position_suffixes: longest_first(&config.title_position_suffixes),
            name_separators: config.name_separators.clone(),
            excluded_affiliations: config
                .excluded_affiliations
                .iter()
                .map(|a| a.to_lowercase())
                .collect(),
            email_domains: config
                .email_domains
                .iter()
                .map(|m| (m.domain.to_lowercase(), m.organization.clone()))
                .collect(),
            personal_email_domains: config
                .personal_email_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
        })
    }

    /// Build a person from a `name_affiliation.md` document.
    pub fn build_person(&self, relative_path: &Path, content: &str) -> Result<PersonRecord> {
        let doc = split_header(content)?;
        let header = &doc.header;

        let stem = file_stem(relative_path);
        let (file_name, filename_affiliation) = match stem.rsplit_once('_') {
            Some((name, affiliation)) if !name.trim().is_empty() => {
                (name.trim().to_string(), Some(affiliation.trim()))
            }
            _ => (stem.trim().to_string(), None),
        };

        let (affiliation, mut position) = match filename_affiliation {
            Some(raw) => split_suffix(raw, &self.position_suffixes),
            None => (None, None),
        };

        let mut name = file_name.clone();
        if let Some(title) = header.get_str("title") {
            let (cleaned, title_position) = self.clean_title(&title);
            if let Some(cleaned) = cleaned {
                name = cleaned;
                if position.is_none() {
                    position = title_position;
                }
            }
        }

        let contacts = contact_channels(&header.get_map("contact"));

        let affiliation = affiliation
            .filter(|a| {
                let excluded = self.is_excluded(a);
                if excluded {
                    tracing::debug!(person = %name, affiliation = %a, "Affiliation is not an organization");
                }
                !excluded
            })
            .or_else(|| self.affiliation_from_body(&doc.body))
            .or_else(|| {
                contacts
                    .get(&ContactKind::Email)
                    .and_then(|email| self.organization_for_email(email))
            });

        let last_contact = header.get_str("last_contact").and_then(|raw| {
            let parsed = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok();
            if parsed.is_none() {
                tracing::debug!(person = %name, value = %raw, "Ignoring malformed last_contact");
            }
            parsed
        });

        Ok(PersonRecord {
            name,
            file_name,
            file_path: path_string(relative_path),
            affiliation,
            position,
            summary: header.get_str("summary"),
            tags: dedup_ordered(header.get_list("tags").into_iter()),
            contacts,
            last_contact,
            entries: self.temporal.extract(&doc.body),
            links: self.relations.links(&doc.body),
        })
    }

    /// Build one document of a project folder.
    pub fn build_project_document(
        &self,
        relative_path: &Path,
        content: &str,
    ) -> Result<ProjectDocument> {
        let doc = split_header(content)?;
        Ok(ProjectDocument {
            file_path: path_string(relative_path),
            summary: doc.header.get_str("summary"),
            tags: doc.header.get_list("tags"),
            entries: self.temporal.extract(&doc.body),
            links: self.relations.links(&doc.body),
        })
    }

    /// Aggregate the documents of one project folder, in the order given.
    pub fn build_project(
        &self,
        folder_name: &str,
        relative_path: &Path,
        archived: bool,
        documents: Vec<ProjectDocument>,
    ) -> ProjectRecord {
        let folder_name: String = folder_name.nfc().collect();
        let (name, start_date) = self.parse_project_folder(&folder_name);

        let summary = documents.iter().find_map(|d| d.summary.clone());
        let tags = dedup_ordered(documents.iter().flat_map(|d| d.tags.iter().cloned()));
        let links = dedup_ordered(documents.iter().flat_map(|d| d.links.iter().cloned()));
        let entries = documents.into_iter().flat_map(|d| d.entries).collect();

        ProjectRecord {
            folder_name,
            name,
            start_date,
            archived,
            file_path: path_string(relative_path),
            summary,
            tags,
            entries,
            links,
        }
    }

    /// Split `YYMMDD name` or `YYMM name` folder names into name and start
    /// date. A prefix that is not a calendar date stays part of the name.
    pub fn parse_project_folder(&self, folder_name: &str) -> (String, Option<NaiveDate>) {
        let parsed = self.project_folder.captures(folder_name).and_then(|caps| {
            let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            let day = caps.get(3).map_or(Some(1), |_| field(3))?;
            let date = NaiveDate::from_ymd_opt(2000 + field(1)? as i32, field(2)?, day)?;
            Some((caps[4].to_string(), date))
        });
        match parsed {
            Some((name, date)) => (name, Some(date)),
            None => (folder_name.trim().to_string(), None),
        }
    }

    /// Strip conversation suffixes, parentheticals and name lists from a
    /// header title, then split off a trailing role.
    fn clean_title(&self, title: &str) -> (Option<String>, Option<String>) {
        let mut cleaned = title.to_string();
        for pattern in &self.title_noise {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
        for separator in &self.name_separators {
            if let Some((first, _)) = cleaned.split_once(separator.as_str()) {
                cleaned = first.to_string();
            }
        }
        split_suffix(cleaned.trim(), &self.title_position_suffixes)
    }

    fn is_excluded(&self, affiliation: &str) -> bool {
        let lowered = affiliation.to_lowercase();
        self.excluded_affiliations
            .iter()
            .any(|excluded| lowered.contains(excluded.as_str()))
    }

    /// `**직장**: X` field in the body, cleaned of regional qualifiers.
    fn affiliation_from_body(&self, body: &str) -> Option<String> {
        let raw = self.work_field.captures(body)?.get(1)?.as_str();
        let mut cleaned = raw.to_string();
        for pattern in &self.affiliation_cleanup {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
        let cleaned = cleaned.trim();
        (!cleaned.is_empty() && !self.is_excluded(cleaned)).then(|| cleaned.to_string())
    }

    fn organization_for_email(&self, email: &str) -> Option<String> {
        let domain = email.rsplit_once('@')?.1.trim().to_lowercase();
        if self.personal_email_domains.contains(&domain) {
            return None;
        }
        if let Some(org) = self.email_domains.get(&domain) {
            return Some(org.clone());
        }
        // mail.company.com -> company.com
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() > 2 {
            let parent = labels[labels.len() - 2..].join(".");
            return self.email_domains.get(&parent).cloned();
        }
        None
    }
}

/// Split a trailing suffix off `text`. Returns `(remainder, suffix)`; an empty
/// remainder reads as `None`.
fn split_suffix(text: &str, suffixes: &[String]) -> (Option<String>, Option<String>) {
    let text = text.trim();
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    for suffix in suffixes {
        if let Some(rest) = text.strip_suffix(suffix.as_str()) {
            return (non_empty(rest.trim()), Some(suffix.clone()));
        }
    }
    (non_empty(text), None)
}

fn longest_first(items: &[String]) -> Vec<String> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
    sorted
}

fn contact_channels(raw: &BTreeMap<String, String>) -> BTreeMap<ContactKind, String> {
    let lowered: HashMap<String, &String> =
        raw.iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
    ContactKind::ALL
        .iter()
        .filter_map(|kind| {
            lowered
                .get(kind.header_key())
                .map(|value| (*kind, value.to_string()))
        })
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().nfc().collect())
        .unwrap_or_default()
}

fn path_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .nfc()
        .collect()
}

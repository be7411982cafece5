use std::collections::{HashMap, HashSet};

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use super::relations::RelationExtractor;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::graph::{
    date_literal, entity_iri, iri, lang_literal, meeting_iri, plain, vocab, EntityKind,
    KnowledgeGraph, Literal,
};
use crate::models::{DatedEntry, PersonRecord, ProjectRecord};

/// Entity counts of one build, logged at the end of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub persons: usize,
    pub projects: usize,
    pub meetings: usize,
    pub organizations: usize,
    pub topics: usize,
    pub documents_skipped: usize,
    pub triples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Person,
    Project,
}

struct PendingLinks {
    owner: Owner,
    subject: String,
    links: Vec<String>,
}

/// Collects records into one graph.
///
/// Entities are added in a first pass; organization, topic and meeting nodes
/// are created on demand while doing so. Cross-references are only
/// remembered, and resolved in [`GraphAssembler::finish`] once every person
/// and project is known.
pub struct GraphAssembler {
    graph: KnowledgeGraph,
    relations: RelationExtractor,
    language: String,
    excerpt_chars: usize,
    org_boilerplate: Vec<String>,
    organizations: HashMap<String, String>,
    topics: HashMap<String, String>,
    entities: HashSet<String>,
    person_index: HashMap<String, String>,
    project_index: HashMap<String, String>,
    pending: Vec<PendingLinks>,
    stats: BuildStats,
}

impl GraphAssembler {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            graph: KnowledgeGraph::new(),
            relations: RelationExtractor::new(config.topic_categories.clone())?,
            language: config.language.clone(),
            excerpt_chars: config.excerpt_chars,
            org_boilerplate: longest_first_lowercase(&config.org_boilerplate),
            organizations: HashMap::new(),
            topics: HashMap::new(),
            entities: HashSet::new(),
            person_index: HashMap::new(),
            project_index: HashMap::new(),
            pending: Vec::new(),
            stats: BuildStats::default(),
        })
    }

    /// Add a person. Returns `false` when a person with the same identifier
    /// was already added; the later record is ignored.
    pub fn add_person(&mut self, person: &PersonRecord) -> bool {
        let subject = entity_iri(EntityKind::Person, &person.name);
        if !self.entities.insert(subject.clone()) {
            tracing::warn!(
                name = %person.name,
                path = %person.file_path,
                "Duplicate person identifier, skipping document"
            );
            return false;
        }

        self.graph.add(&subject, vocab::RDF_TYPE, iri(vocab::PERSON));
        self.graph.add(&subject, vocab::NAME, self.text(&person.name));
        self.graph
            .add(&subject, vocab::FILE_PATH, plain(&person.file_path));
        if let Some(position) = &person.position {
            self.graph.add(&subject, vocab::POSITION, self.text(position));
        }
        if let Some(summary) = &person.summary {
            self.graph.add(&subject, vocab::SUMMARY, self.text(summary));
        }
        for tag in &person.tags {
            self.graph.add(&subject, vocab::TAG, self.text(tag));
        }
        for (kind, value) in &person.contacts {
            self.graph
                .add(&subject, vocab::contact_predicate(*kind), plain(value));
        }
        if let Some(date) = person.last_contact {
            self.graph
                .add(&subject, vocab::HAS_LAST_CONTACT, date_literal(date));
        }
        if let Some(affiliation) = &person.affiliation {
            if let Some(org) = self.organization(affiliation) {
                self.graph.add(&subject, vocab::AFFILIATED_WITH, iri(org));
            }
        }

        self.add_meetings(&subject, Owner::Person, &person.entries);

        for key in [&person.name, &person.file_name] {
            self.person_index
                .entry(name_key(key))
                .or_insert_with(|| subject.clone());
        }
        self.pending.push(PendingLinks {
            owner: Owner::Person,
            subject,
            links: person.links.clone(),
        });
        self.stats.persons += 1;
        true
    }

    /// Add a project. Returns `false` for a repeated folder name.
    pub fn add_project(&mut self, project: &ProjectRecord) -> bool {
        let subject = entity_iri(EntityKind::Project, &project.folder_name);
        if !self.entities.insert(subject.clone()) {
            tracing::warn!(
                folder = %project.folder_name,
                path = %project.file_path,
                "Duplicate project folder, skipping"
            );
            return false;
        }

        self.graph.add(&subject, vocab::RDF_TYPE, iri(vocab::PROJECT));
        self.graph.add(&subject, vocab::NAME, self.text(&project.name));
        self.graph
            .add(&subject, vocab::FILE_PATH, plain(&project.file_path));
        if let Some(date) = project.start_date {
            self.graph.add(&subject, vocab::DATE, date_literal(date));
        }
        if project.archived {
            self.graph
                .add(&subject, vocab::TAG, lang_literal("archived", "en"));
        }
        if let Some(summary) = &project.summary {
            self.graph.add(&subject, vocab::SUMMARY, self.text(summary));
        }
        for tag in &project.tags {
            self.graph.add(&subject, vocab::TAG, self.text(tag));
        }

        self.add_meetings(&subject, Owner::Project, &project.entries);

        for key in [&project.folder_name, &project.name] {
            self.project_index
                .entry(name_key(key))
                .or_insert_with(|| subject.clone());
        }
        self.pending.push(PendingLinks {
            owner: Owner::Project,
            subject,
            links: project.links.clone(),
        });
        self.stats.projects += 1;
        true
    }

    pub fn record_skipped(&mut self) {
        self.stats.documents_skipped += 1;
    }

    /// Resolve cross-references and hand out the finished graph.
    pub fn finish(mut self) -> (KnowledgeGraph, BuildStats) {
        let pending = std::mem::take(&mut self.pending);
        let mut unresolved = 0usize;

        for PendingLinks { owner, subject, links } in &pending {
            for link in links {
                let key = name_key(link);
                match owner {
                    Owner::Person => {
                        if let Some(other) = self.person_index.get(&key) {
                            if other != subject {
                                self.graph.add(subject, vocab::KNOWS, iri(other));
                            }
                        } else if let Some(project) = self.project_index.get(&key) {
                            self.graph
                                .add(subject, vocab::INVOLVED_IN, iri(project));
                        } else {
                            unresolved += 1;
                        }
                    }
                    Owner::Project => {
                        if let Some(person) = self.person_index.get(&key) {
                            self.graph
                                .add(person, vocab::INVOLVED_IN, iri(subject));
                        } else {
                            unresolved += 1;
                        }
                    }
                }
            }
        }
        if unresolved > 0 {
            tracing::debug!(unresolved, "Dropped cross-references with no known target");
        }

        self.stats.organizations = self.organizations.len();
        self.stats.topics = self.topics.len();
        self.stats.triples = self.graph.len();
        (self.graph, self.stats)
    }

    fn add_meetings(&mut self, owner_iri: &str, owner: Owner, entries: &[DatedEntry]) {
        let link = match owner {
            Owner::Person => vocab::PARTICIPANT,
            Owner::Project => vocab::RELATED_TO,
        };
        for (i, entry) in entries.iter().enumerate() {
            let meeting = meeting_iri(owner_iri, i + 1);
            self.graph
                .add(&meeting, vocab::RDF_TYPE, iri(vocab::MEETING));
            self.graph.add(&meeting, vocab::DATE, date_literal(entry.date));
            self.graph.add(&meeting, link, iri(owner_iri));

            if !entry.excerpt.is_empty() {
                let excerpt = truncate_graphemes(&entry.excerpt, self.excerpt_chars);
                self.graph.add(&meeting, vocab::SUMMARY, self.text(&excerpt));
                for topic in self.relations.topics(&entry.excerpt) {
                    if let Some(topic_iri) = self.topic(&topic) {
                        self.graph
                            .add(&meeting, vocab::HAS_TOPIC, iri(topic_iri));
                    }
                }
            }
            self.stats.meetings += 1;
        }
    }

    /// Get or create the organization for an affiliation string.
    fn organization(&mut self, affiliation: &str) -> Option<String> {
        let key = normalize_org(affiliation, &self.org_boilerplate);
        if key.is_empty() {
            return None;
        }
        if let Some(subject) = self.organizations.get(&key) {
            return Some(subject.clone());
        }

        let subject = entity_iri(EntityKind::Organization, &key);
        let name: String = affiliation.trim().nfc().collect();
        tracing::trace!(organization = %name, key = %key, "New organization");
        self.graph
            .add(&subject, vocab::RDF_TYPE, iri(vocab::ORGANIZATION));
        self.graph.add(&subject, vocab::NAME, self.text(&name));
        self.organizations.insert(key, subject.clone());
        Some(subject)
    }

    fn topic(&mut self, topic: &str) -> Option<String> {
        let key = name_key(topic);
        if key.is_empty() {
            return None;
        }
        if let Some(subject) = self.topics.get(&key) {
            return Some(subject.clone());
        }

        let subject = entity_iri(EntityKind::Topic, &key);
        self.graph.add(&subject, vocab::RDF_TYPE, iri(vocab::TOPIC));
        self.graph.add(&subject, vocab::NAME, self.text(topic.trim()));
        self.topics.insert(key, subject.clone());
        Some(subject)
    }

    fn text(&self, value: &str) -> Literal {
        lang_literal(value, &self.language)
    }
}

/// Identity key for persons, projects and topics.
fn name_key(name: &str) -> String {
    name.nfc().collect::<String>().trim().to_lowercase()
}

/// Identity key for organizations: case-folded, legal-entity boilerplate
/// removed, whitespace dropped. `(주)앤틀러`, `앤틀러 주식회사` and `앤틀러`
/// share a key.
pub fn normalize_org(name: &str, boilerplate: &[String]) -> String {
    let lowered = name.nfc().collect::<String>().to_lowercase();
    let mut stripped = lowered.clone();

    for token in boilerplate {
        let symbolic = !token.is_ascii() || token.chars().any(|c| !c.is_alphanumeric());
        if symbolic {
            stripped = stripped.replace(token.as_str(), " ");
            continue;
        }
        // plain ASCII words only count as a leading or trailing word
        let trimmed = stripped.trim();
        if let Some(rest) = trimmed.strip_suffix(token.as_str()) {
            if rest.ends_with(|c: char| !c.is_alphanumeric()) {
                stripped = rest.to_string();
                continue;
            }
        }
        if let Some(rest) = trimmed.strip_prefix(token.as_str()) {
            if rest.starts_with(|c: char| !c.is_alphanumeric()) {
                stripped = rest.to_string();
            }
        }
    }

    let key: String = stripped
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim_matches(|c: char| c == ',' || c == '.')
        .to_string();
    if key.is_empty() {
        lowered.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        key
    }
}

fn truncate_graphemes(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect::<String>().trim_end().to_string()
}

fn longest_first_lowercase(items: &[String]) -> Vec<String> {
    let mut sorted: Vec<String> = items.iter().map(|s| s.to_lowercase()).collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
    sorted
}

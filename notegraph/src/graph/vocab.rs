//! Fixed vocabulary of the persisted graph.
//!
//! Predicate and class IRIs are part of the hand-off format between
//! `notegraph build` and `notegraph query`; renaming any of them breaks
//! graphs written by earlier builds.

use crate::models::ContactKind;

pub const ONTOLOGY: &str = "http://notegraph.local/ontology#";
pub const DATA: &str = "http://notegraph.local/data#";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Prefixes written at the top of every graph file and implicitly
/// declared in every query.
pub const PREFIXES: [(&str, &str); 5] = [
    ("", ONTOLOGY),
    ("data", DATA),
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("xsd", XSD),
];

macro_rules! ontology_terms {
    ($($const_name:ident => $local:literal),* $(,)?) => {
        $(pub const $const_name: &str = concat!("http://notegraph.local/ontology#", $local);)*
    };
}

ontology_terms! {
    PERSON => "Person",
    ORGANIZATION => "Organization",
    PROJECT => "Project",
    MEETING => "Meeting",
    TOPIC => "Topic",

    NAME => "name",
    SUMMARY => "summary",
    TAG => "tag",
    FILE_PATH => "filePath",
    POSITION => "position",
    HAS_PHONE => "hasPhone",
    HAS_EMAIL => "hasEmail",
    HAS_LINKEDIN => "hasLinkedIn",
    HAS_SLACK => "hasSlack",
    HAS_DISCORD => "hasDiscord",
    HAS_KAKAO => "hasKakao",
    HAS_INSTAGRAM => "hasInstagram",
    HAS_TWITTER => "hasTwitter",
    HAS_GITHUB => "hasGitHub",
    HAS_WEBSITE => "hasWebsite",
    HAS_LAST_CONTACT => "hasLastContact",
    AFFILIATED_WITH => "affiliatedWith",
    DATE => "date",
    HAS_TOPIC => "hasTopic",
    PARTICIPANT => "participant",
    RELATED_TO => "relatedTo",
    KNOWS => "knows",
    INVOLVED_IN => "involvedIn",
}

pub fn contact_predicate(kind: ContactKind) -> &'static str {
    match kind {
        ContactKind::Phone => HAS_PHONE,
        ContactKind::Email => HAS_EMAIL,
        ContactKind::LinkedIn => HAS_LINKEDIN,
        ContactKind::Slack => HAS_SLACK,
        ContactKind::Discord => HAS_DISCORD,
        ContactKind::Kakao => HAS_KAKAO,
        ContactKind::Instagram => HAS_INSTAGRAM,
        ContactKind::Twitter => HAS_TWITTER,
        ContactKind::GitHub => HAS_GITHUB,
        ContactKind::Website => HAS_WEBSITE,
    }
}

/// Shorten an IRI to `prefix:local` for display when a known prefix
/// covers it.
pub fn compact(iri: &str) -> Option<String> {
    PREFIXES.iter().find_map(|(prefix, namespace)| {
        let local = iri.strip_prefix(namespace)?;
        let plain = !local.is_empty()
            && local
                .chars()
                .all(|c| c.is_alphabetic() || c.is_ascii_digit() || c == '_');
        plain.then(|| format!("{prefix}:{local}"))
    })
}

/// `PREFIX` lines declaring [`PREFIXES`], prepended to every query.
pub fn sparql_prologue() -> String {
    PREFIXES
        .iter()
        .map(|(prefix, namespace)| format!("PREFIX {prefix}: <{namespace}>\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ontology_terms_expand_namespace() {
        assert_eq!(PERSON, "http://notegraph.local/ontology#Person");
        assert_eq!(HAS_GITHUB, "http://notegraph.local/ontology#hasGitHub");
        assert!(KNOWS.starts_with(ONTOLOGY));
    }

    #[test]
    fn test_compact_known_namespaces() {
        assert_eq!(compact(PERSON).as_deref(), Some(":Person"));
        assert_eq!(
            compact("http://notegraph.local/data#person_조쉬김").as_deref(),
            Some("data:person_조쉬김")
        );
        assert_eq!(
            compact("http://www.w3.org/2001/XMLSchema#date").as_deref(),
            Some("xsd:date")
        );
        assert_eq!(compact("http://example.org/x"), None);
        assert_eq!(compact("http://notegraph.local/data#a b"), None);
    }

    #[test]
    fn test_prologue_declares_default_prefix() {
        let prologue = sparql_prologue();
        assert!(prologue.starts_with("PREFIX : <http://notegraph.local/ontology#>\n"));
        assert_eq!(prologue.lines().count(), PREFIXES.len());
    }
}

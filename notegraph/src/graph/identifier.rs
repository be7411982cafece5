use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use super::vocab;

/// Entity kinds that get an identifier derived from a natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Organization,
    Project,
    Topic,
}

impl EntityKind {
    fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Organization => "org",
            EntityKind::Project => "project",
            EntityKind::Topic => "topic",
        }
    }
}

/// Turn a natural key into an identifier token.
///
/// Letters, ASCII digits and `_` are kept; anything else becomes `_`, so
/// the token is always a valid Turtle local name. When that replacement
/// changed the key, a short SHA-256 prefix of the key is appended so that
/// `a b` and `a.b` do not collide.
pub fn sanitize_token(key: &str) -> String {
    let key: String = key.nfc().collect();
    let mut lossy = key.is_empty();
    let token: String = key
        .chars()
        .map(|c| {
            if c.is_alphabetic() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                lossy = true;
                '_'
            }
        })
        .collect();

    if lossy {
        format!("{token}_{}", short_hash(&key))
    } else {
        token
    }
}

fn short_hash(key: &str) -> String {
    Sha256::digest(key.as_bytes())[..4]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub fn entity_iri(kind: EntityKind, key: &str) -> String {
    format!("{}{}_{}", vocab::DATA, kind.prefix(), sanitize_token(key))
}

/// Meetings are numbered per owner: `meeting_<owner local name>_<seq>`.
pub fn meeting_iri(owner_iri: &str, sequence: usize) -> String {
    let owner = owner_iri.strip_prefix(vocab::DATA).unwrap_or(owner_iri);
    format!("{}meeting_{}_{}", vocab::DATA, owner, sequence)
}

//! Constructors for the terms a build emits, and their display form.

use chrono::NaiveDate;
use oxigraph::model::vocab::xsd;
use oxigraph::model::{Literal, NamedNode, Term, Triple};

use super::vocab;

/// Named node for an IRI assembled from the vocabulary constants and
/// sanitized identifier tokens. Neither contains characters IRIs forbid.
pub fn iri(value: impl Into<String>) -> NamedNode {
    NamedNode::new_unchecked(value)
}

pub fn plain(value: impl Into<String>) -> Literal {
    Literal::new_simple_literal(value)
}

/// Language-tagged string. The tag is validated once, when the
/// configuration is loaded.
pub fn lang_literal(value: impl Into<String>, language: &str) -> Literal {
    Literal::new_language_tagged_literal_unchecked(value, language.to_ascii_lowercase())
}

pub fn date_literal(date: NaiveDate) -> Literal {
    Literal::new_typed_literal(date.format("%Y-%m-%d").to_string(), xsd::DATE)
}

pub fn triple(subject: &str, predicate: &str, object: impl Into<Term>) -> Triple {
    Triple::new(iri(subject), iri(predicate), object)
}

/// Human-facing rendering: prefixed names for IRIs, bare lexical forms for
/// literals.
pub fn display_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => {
            vocab::compact(node.as_str()).unwrap_or_else(|| node.as_str().to_string())
        }
        Term::Literal(literal) => literal.value().to_string(),
        other => other.to_string(),
    }
}

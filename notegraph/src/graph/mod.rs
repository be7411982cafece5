mod identifier;
mod store;
mod term;
pub mod vocab;

pub use identifier::{entity_iri, meeting_iri, sanitize_token, EntityKind};
pub use oxigraph::model::{Literal, NamedNode, Subject, Term, Triple};
pub use store::KnowledgeGraph;
pub use term::{date_literal, display_value, iri, lang_literal, plain, triple};

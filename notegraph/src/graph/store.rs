use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{Subject, Term, Triple};
use tempfile::NamedTempFile;

use super::term::triple;
use super::vocab;
use crate::error::{NotegraphError, Result};

/// The triple set produced by a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeGraph {
    triples: HashSet<Triple>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn add(&mut self, subject: &str, predicate: &str, object: impl Into<Term>) -> bool {
        self.insert(triple(subject, predicate, object))
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Objects of `subject predicate ?o`, in display order.
    pub fn objects(&self, subject: &str, predicate: &str) -> Vec<&Term> {
        let mut objects: Vec<&Term> = self
            .triples
            .iter()
            .filter(|t| is_iri(&t.subject, subject) && t.predicate.as_str() == predicate)
            .map(|t| &t.object)
            .collect();
        objects.sort_by_cached_key(|term| term.to_string());
        objects
    }

    /// Number of subjects typed with the given class IRI.
    pub fn count_instances(&self, class: &str) -> usize {
        self.triples
            .iter()
            .filter(|t| {
                t.predicate.as_str() == vocab::RDF_TYPE
                    && matches!(&t.object, Term::NamedNode(node) if node.as_str() == class)
            })
            .count()
    }

    /// Triples grouped by subject with `rdf:type` first. The order only
    /// depends on the triple set, so an unchanged vault serializes to the
    /// same bytes.
    pub fn sorted(&self) -> Vec<&Triple> {
        let mut triples: Vec<&Triple> = self.triples.iter().collect();
        triples.sort_by_cached_key(|t| {
            (
                t.subject.to_string(),
                t.predicate.as_str() != vocab::RDF_TYPE,
                t.predicate.as_str().to_string(),
                t.object.to_string(),
            )
        });
        triples
    }

    pub fn write_turtle<W: Write>(&self, writer: W) -> Result<W> {
        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
        for (prefix, namespace) in vocab::PREFIXES {
            serializer = serializer
                .with_prefix(prefix, namespace)
                .map_err(|e| NotegraphError::Rdf(e.to_string()))?;
        }

        let mut writer = serializer.for_writer(writer);
        for triple in self.sorted() {
            writer.serialize_triple(triple)?;
        }
        Ok(writer.finish()?)
    }

    pub fn to_turtle(&self) -> Result<String> {
        let bytes = self.write_turtle(Vec::new())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn read_turtle(reader: impl Read) -> Result<Self> {
        let mut graph = Self::new();
        for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(reader) {
            let quad = quad.map_err(|e| NotegraphError::Rdf(e.to_string()))?;
            graph.insert(Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(graph)
    }

    /// Read a graph file. A missing file is reported before any parsing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(NotegraphError::InvalidPath(path.to_path_buf()));
        }
        let graph = Self::read_turtle(BufReader::new(File::open(path)?))?;
        tracing::debug!(path = %path.display(), triples = graph.len(), "Loaded graph");
        Ok(graph)
    }

    /// Write the graph next to `path` and rename it into place, so readers
    /// never observe a half-written file.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        {
            let mut buffered = self.write_turtle(BufWriter::new(file.as_file_mut()))?;
            buffered.flush()?;
        }
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl FromIterator<Triple> for KnowledgeGraph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

fn is_iri(subject: &Subject, iri: &str) -> bool {
    matches!(subject, Subject::NamedNode(node) if node.as_str() == iri)
}

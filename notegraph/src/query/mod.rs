mod output;
mod session;
mod templates;

use std::path::Path;

use oxigraph::model::GraphName;
use oxigraph::sparql::{Query, QueryResults};
use oxigraph::store::Store;
use thiserror::Error;

use crate::graph::{vocab, KnowledgeGraph, Term};

pub use output::{render_table, to_json, JsonResults, NO_RESULTS};
pub use session::{run_interactive, Session, SessionReply};
pub use templates::{find as find_template, Template, TEMPLATES};

/// Deepest bracket nesting a query may use. The SPARQL parser recurses per
/// level, so deeper input is refused before parsing.
pub const MAX_NESTING: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),
}

/// Ordered result table. `None` cells are unbound variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub variables: Vec<String>,
    pub rows: Vec<Vec<Option<Term>>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_table(&self, max_width: usize) -> String {
        render_table(self, max_width)
    }

    pub fn to_json(&self) -> JsonResults {
        to_json(self)
    }
}

/// Read-only query access to a built graph, held in an in-memory store.
pub struct QueryEngine {
    store: Store,
    triples: usize,
}

impl QueryEngine {
    pub fn new(graph: KnowledgeGraph) -> crate::error::Result<Self> {
        let store = Store::new()?;
        let triples = graph.len();
        store.extend(
            graph
                .iter()
                .map(|triple| triple.clone().in_graph(GraphName::DefaultGraph)),
        )?;
        Ok(Self { store, triples })
    }

    /// Load a graph file written by the build stage.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let graph = KnowledgeGraph::load(path)?;
        tracing::info!(path = %path.display(), triples = graph.len(), "Graph loaded");
        Self::new(graph)
    }

    pub fn triple_count(&self) -> usize {
        self.triples
    }

    /// Run a SELECT query. The graph's prefixes are declared up front, so
    /// `:Person` and `data:` names resolve without a prologue.
    pub fn execute(&self, query: &str) -> Result<QueryResult, QueryError> {
        check_nesting(query)?;
        let text = format!("{}{}", vocab::sparql_prologue(), query);
        let parsed = Query::parse(&text, None).map_err(|e| QueryError::Syntax(e.to_string()))?;

        let results = self
            .store
            .query(parsed)
            .map_err(|e| QueryError::Evaluation(e.to_string()))?;
        let QueryResults::Solutions(solutions) = results else {
            return Err(QueryError::Evaluation(
                "only SELECT queries are supported".to_string(),
            ));
        };

        let variables: Vec<String> = solutions
            .variables()
            .iter()
            .map(|variable| variable.as_str().to_string())
            .collect();
        let mut rows = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| QueryError::Evaluation(e.to_string()))?;
            rows.push((0..variables.len()).map(|i| solution.get(i).cloned()).collect());
        }

        let result = QueryResult { variables, rows };
        tracing::debug!(rows = result.len(), "Query evaluated");
        Ok(result)
    }

    /// Run a named template. A parameter that matches nothing yields an
    /// empty result.
    pub fn run_template(&self, name: &str, param: &str) -> Result<QueryResult, QueryError> {
        let template =
            find_template(name).ok_or_else(|| QueryError::UnknownTemplate(name.to_string()))?;
        if template.takes_param && param.is_empty() {
            tracing::debug!(template = name, "Template run with an empty parameter");
        }
        self.execute(&template.render(param))
    }
}

/// Reject queries whose brackets nest deeper than [`MAX_NESTING`]. Brackets
/// inside string literals are not counted.
fn check_nesting(query: &str) -> Result<(), QueryError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in query.chars() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(QueryError::Syntax(format!(
                        "query nests deeper than {MAX_NESTING} levels"
                    )));
                }
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{display_value, iri, lang_literal};

    fn empty_engine() -> QueryEngine {
        QueryEngine::new(KnowledgeGraph::new()).unwrap()
    }

    #[test]
    fn test_unknown_template() {
        assert_eq!(
            empty_engine().run_template("nope", "").unwrap_err(),
            QueryError::UnknownTemplate("nope".to_string())
        );
    }

    #[test]
    fn test_stats_on_empty_graph_is_one_zero_row() {
        let result = empty_engine().run_template("stats", "").unwrap();
        assert_eq!(
            result.variables,
            vec!["persons", "projects", "meetings", "organizations", "topics"]
        );
        assert_eq!(result.len(), 1);
        let counts: Vec<String> = result.rows[0]
            .iter()
            .map(|cell| cell.as_ref().map(display_value).unwrap_or_default())
            .collect();
        assert_eq!(counts, vec!["0"; 5]);
    }

    #[test]
    fn test_parameter_that_matches_nothing_is_empty() {
        let mut graph = KnowledgeGraph::new();
        let person = format!("{}person_a", vocab::DATA);
        graph.add(&person, vocab::RDF_TYPE, iri(vocab::PERSON));
        graph.add(&person, vocab::NAME, lang_literal("a", "ko"));
        let engine = QueryEngine::new(graph).unwrap();
        assert_eq!(engine.triple_count(), 2);
        assert!(engine.run_template("person_meetings", "zzz").unwrap().is_empty());
    }

    #[test]
    fn test_deep_nesting_is_a_syntax_error() {
        let depth = 3000;
        let query = format!(
            "SELECT ?x WHERE {{ ?x ?p ?o FILTER({}1{}) }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        assert!(matches!(
            empty_engine().execute(&query),
            Err(QueryError::Syntax(message)) if message.contains("nests deeper")
        ));
    }

    #[test]
    fn test_brackets_in_strings_are_not_counted() {
        let literal = "(".repeat(MAX_NESTING * 2);
        let query = format!("SELECT ?x WHERE {{ ?x :name \"{literal}\" }}");
        assert!(empty_engine().execute(&query).unwrap().is_empty());
    }

    #[test]
    fn test_only_select_is_supported() {
        assert!(matches!(
            empty_engine().execute("ASK { ?s ?p ?o }"),
            Err(QueryError::Evaluation(_))
        ));
    }
}

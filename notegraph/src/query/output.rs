use std::collections::BTreeMap;

use serde::Serialize;

use oxigraph::model::vocab::xsd;

use super::QueryResult;
use crate::graph::{display_value, Term};

pub const NO_RESULTS: &str = "No results.";

const ELLIPSIS: &str = "...";

/// Plain-text table: a ` | ` separated header, a dashed rule, one line per
/// row. Unbound cells show `-`; cells wider than `max_width` characters are
/// cut and end in `...`.
pub fn render_table(result: &QueryResult, max_width: usize) -> String {
    if result.rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let header = result.variables.join(" | ");
    let mut lines = vec![header.clone(), "-".repeat(header.chars().count())];
    for row in &result.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(term) => truncate(&display_value(term), max_width),
                None => "-".to_string(),
            })
            .collect();
        lines.push(cells.join(" | "));
    }
    lines.join("\n")
}

fn truncate(value: &str, max_width: usize) -> String {
    let value = value.replace('\n', " ");
    if value.chars().count() <= max_width {
        return value;
    }
    let keep = max_width.saturating_sub(ELLIPSIS.len());
    let mut cut: String = value.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// SPARQL 1.1 query results JSON document.
#[derive(Debug, Serialize)]
pub struct JsonResults {
    head: JsonHead,
    results: JsonBindings,
}

#[derive(Debug, Serialize)]
struct JsonHead {
    vars: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JsonBindings {
    bindings: Vec<BTreeMap<String, JsonTerm>>,
}

#[derive(Debug, Serialize)]
struct JsonTerm {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
    #[serde(rename = "xml:lang", skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
}

impl From<&Term> for JsonTerm {
    fn from(term: &Term) -> Self {
        match term {
            Term::NamedNode(node) => JsonTerm {
                kind: "uri",
                value: node.as_str().to_string(),
                language: None,
                datatype: None,
            },
            Term::BlankNode(node) => JsonTerm {
                kind: "bnode",
                value: node.as_str().to_string(),
                language: None,
                datatype: None,
            },
            Term::Literal(literal) => {
                let language = literal.language().map(str::to_string);
                let datatype = (language.is_none() && literal.datatype() != xsd::STRING)
                    .then(|| literal.datatype().as_str().to_string());
                JsonTerm {
                    kind: "literal",
                    value: literal.value().to_string(),
                    language,
                    datatype,
                }
            }
            other => JsonTerm {
                kind: "literal",
                value: other.to_string(),
                language: None,
                datatype: None,
            },
        }
    }
}

pub fn to_json(result: &QueryResult) -> JsonResults {
    let bindings = result
        .rows
        .iter()
        .map(|row| {
            result
                .variables
                .iter()
                .zip(row)
                .filter_map(|(variable, cell)| {
                    cell.as_ref()
                        .map(|term| (variable.clone(), JsonTerm::from(term)))
                })
                .collect()
        })
        .collect();

    JsonResults {
        head: JsonHead {
            vars: result.variables.clone(),
        },
        results: JsonBindings { bindings },
    }
}

use std::io::{self, BufRead, Write};

use super::templates::TEMPLATES;
use super::{QueryEngine, QueryResult};

const PROMPT: &str = "notegraph> ";

/// Outcome of one interactive input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    /// Text to show before the next prompt.
    Output(String),
    /// Blank input.
    Nothing,
    Quit,
}

/// Interactive query loop over one loaded graph.
///
/// Input lines are `query <text>` for a raw query, `<template> [param]` for
/// a named template, `help`, or `exit`/`quit`. Every line is handled on its
/// own; a failing query is reported and the session carries on.
pub struct Session<'a> {
    engine: &'a QueryEngine,
    max_cell_width: usize,
}

impl<'a> Session<'a> {
    pub fn new(engine: &'a QueryEngine, max_cell_width: usize) -> Self {
        Self {
            engine,
            max_cell_width,
        }
    }

    pub fn handle_line(&self, line: &str) -> SessionReply {
        let line = line.trim();
        if line.is_empty() {
            return SessionReply::Nothing;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let result = match command.to_lowercase().as_str() {
            "exit" | "quit" => return SessionReply::Quit,
            "help" | "templates" => return SessionReply::Output(help_text()),
            "query" => {
                if rest.is_empty() {
                    return SessionReply::Output("Usage: query <SPARQL>".to_string());
                }
                self.engine.execute(rest)
            }
            _ => self.engine.run_template(command, rest),
        };

        SessionReply::Output(match result {
            Ok(result) => self.render(&result),
            Err(e) => {
                tracing::debug!("Interactive query failed: {}", e);
                format!("Query error: {e}")
            }
        })
    }

    fn render(&self, result: &QueryResult) -> String {
        if result.is_empty() {
            return result.to_table(self.max_cell_width);
        }
        format!(
            "{}\n({} row{})",
            result.to_table(self.max_cell_width),
            result.len(),
            if result.len() == 1 { "" } else { "s" }
        )
    }
}

pub fn help_text() -> String {
    let mut text = String::from("Templates:\n");
    for template in TEMPLATES {
        let param = if template.takes_param { " [param]" } else { "" };
        text.push_str(&format!(
            "  {}{} - {}\n",
            template.name, param, template.description
        ));
    }
    text.push_str("\nquery <SPARQL>   run a raw query\nexit | quit      leave the session");
    text
}

/// Drive a session from `input` until end of input or `exit`.
pub fn run_interactive<R: BufRead, W: Write>(
    session: &Session<'_>,
    input: R,
    output: &mut W,
) -> io::Result<()> {
    writeln!(
        output,
        "Loaded {} triples. Type 'help' for templates, 'exit' to leave.",
        session.engine.triple_count()
    )?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        match session.handle_line(&line?) {
            SessionReply::Quit => break,
            SessionReply::Output(text) => writeln!(output, "{text}\n")?,
            SessionReply::Nothing => {}
        }
        write!(output, "{PROMPT}")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{iri, lang_literal, vocab, KnowledgeGraph};

    fn engine() -> QueryEngine {
        let mut graph = KnowledgeGraph::new();
        let person = format!("{}person_a", vocab::DATA);
        graph.add(&person, vocab::RDF_TYPE, iri(vocab::PERSON));
        graph.add(&person, vocab::NAME, lang_literal("Alice", "ko"));
        QueryEngine::new(graph).unwrap()
    }

    #[test]
    fn test_commands() {
        let engine = engine();
        let session = Session::new(&engine, 80);
        assert_eq!(session.handle_line("  "), SessionReply::Nothing);
        assert_eq!(session.handle_line("QUIT"), SessionReply::Quit);
        assert!(matches!(session.handle_line("help"), SessionReply::Output(text) if text.contains("person_meetings")));
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let engine = engine();
        let session = Session::new(&engine, 80);
        let SessionReply::Output(text) = session.handle_line("query SELECT ?x WHERE {") else {
            panic!("expected output");
        };
        assert!(text.starts_with("Query error:"));
        let SessionReply::Output(text) = session.handle_line("no_such_template") else {
            panic!("expected output");
        };
        assert!(text.contains("unknown template"));

        let SessionReply::Output(text) = session.handle_line("all_persons") else {
            panic!("expected output");
        };
        assert!(text.contains("Alice"));
        assert!(text.ends_with("(1 row)"));
    }

    #[test]
    fn test_run_interactive_transcript() {
        let engine = engine();
        let session = Session::new(&engine, 80);
        let input = "query SELECT ?n WHERE { ?p :name ?n }\nbroken(\nexit\nall_persons\n";
        let mut output = Vec::new();
        run_interactive(&session, input.as_bytes(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Alice"));
        assert!(text.contains("Query error:"));
        // nothing after exit is evaluated
        assert_eq!(text.matches("Alice").count(), 1);
    }

    #[test]
    fn test_deeply_nested_line_is_reported() {
        let engine = engine();
        let session = Session::new(&engine, 80);
        let depth = 3000;
        let line = format!(
            "query SELECT ?x WHERE {{ ?x ?p ?o FILTER({}1{}) }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let SessionReply::Output(text) = session.handle_line(&line) else {
            panic!("expected output");
        };
        assert!(text.starts_with("Query error: syntax error"));

        let SessionReply::Output(text) = session.handle_line("all_persons") else {
            panic!("expected output");
        };
        assert!(text.contains("Alice"));
    }
}

//! Personal-notes vault to entity graph, and queries over that graph.
//!
//! The build stage reads person documents and project folders from a vault,
//! extracts dated entries, cross-references and topic cues, and assembles a
//! graph of persons, organizations, projects, meetings and topics that is
//! written as a Turtle file. The query stage loads that file and answers
//! SELECT queries or named templates against it.

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod processing;
pub mod query;

pub use config::Config;
pub use error::{NotegraphError, Result};
pub use graph::KnowledgeGraph;
pub use processing::{BuildPipeline, BuildStats};
pub use query::{QueryEngine, QueryError, QueryResult};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotegraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid regex in configuration: {0}")]
    Regex(#[from] regex::Error),

    #[error("Header block opened but never closed")]
    UnterminatedHeader,

    #[error("Path does not exist: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("RDF error: {0}")]
    Rdf(String),

    #[error("Graph store error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, NotegraphError>;

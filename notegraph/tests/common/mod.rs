#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use notegraph::processing::BuildStats;
use notegraph::{BuildPipeline, Config, KnowledgeGraph, QueryEngine};
use tempfile::TempDir;

pub const PERSON_DIR: &str = "04_Networking/00_인물사전";
pub const ACTIVE_DIR: &str = "00_A_Projects/Active";
pub const ARCHIVE_DIR: &str = "90_Archives";

/// Throwaway vault laid out like the default configuration expects.
pub struct TestVault {
    dir: TempDir,
}

impl TestVault {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp vault");
        fs::create_dir_all(dir.path().join(PERSON_DIR)).expect("Failed to create person dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).unwrap_or_else(|e| panic!("Failed to write '{relative}': {e}"));
        self
    }

    pub fn person(&self, file_name: &str, content: &str) -> &Self {
        self.write(&format!("{PERSON_DIR}/{file_name}"), content)
    }

    pub fn project(&self, base: &str, folder: &str, file: &str, content: &str) -> &Self {
        self.write(&format!("{base}/{folder}/{file}"), content)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("knowledge.ttl")
    }
}

pub fn pipeline() -> BuildPipeline {
    BuildPipeline::new(Config::default()).expect("Default configuration is valid")
}

pub fn build(vault: &TestVault) -> (KnowledgeGraph, BuildStats) {
    pipeline().run(vault.path()).expect("Build failed")
}

pub fn engine(vault: &TestVault) -> QueryEngine {
    let (graph, _) = build(vault);
    QueryEngine::new(graph).expect("Failed to load graph into the store")
}

/// One column of a result, rendered the way table output shows cells.
pub fn column(result: &notegraph::QueryResult, name: &str) -> Vec<String> {
    let index = result
        .variables
        .iter()
        .position(|v| v == name)
        .unwrap_or_else(|| panic!("No column '{name}' in {:?}", result.variables));
    result
        .rows
        .iter()
        .map(|row| {
            row[index]
                .as_ref()
                .map_or_else(|| "-".to_string(), notegraph::graph::display_value)
        })
        .collect()
}

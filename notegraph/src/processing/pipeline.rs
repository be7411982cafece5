use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

use super::assembler::{BuildStats, GraphAssembler};
use super::builder::EntityBuilder;
use crate::config::Config;
use crate::error::{NotegraphError, Result};
use crate::graph::KnowledgeGraph;
use crate::models::ProjectDocument;

/// Vault-to-graph batch build.
///
/// Documents are visited in sorted path order so that meeting sequence
/// numbers, first-seen organization names and therefore the written file
/// are the same on every run over an unchanged vault.
pub struct BuildPipeline {
    config: Config,
    builder: EntityBuilder,
}

impl BuildPipeline {
    pub fn new(config: Config) -> Result<Self> {
        let builder = EntityBuilder::new(&config.extraction)?;
        Ok(Self { config, builder })
    }

    /// Build the graph of a vault in memory.
    pub fn run(&self, vault: &Path) -> Result<(KnowledgeGraph, BuildStats)> {
        if !vault.is_dir() {
            return Err(NotegraphError::InvalidPath(vault.to_path_buf()));
        }

        let mut assembler = GraphAssembler::new(&self.config.extraction)?;
        self.add_persons(vault, &mut assembler);
        self.add_projects(vault, &mut assembler);

        Ok(assembler.finish())
    }

    /// Build the graph of a vault and write it to `output`. The file is only
    /// replaced once the whole build succeeded.
    pub fn build_to_file(&self, vault: &Path, output: &Path) -> Result<BuildStats> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(NotegraphError::InvalidPath(parent.to_path_buf()));
            }
        }

        tracing::info!(vault = %vault.display(), "Building knowledge graph");
        let (graph, stats) = self.run(vault)?;
        graph.write_atomic(output)?;

        tracing::info!(
            output = %output.display(),
            triples = stats.triples,
            persons = stats.persons,
            projects = stats.projects,
            meetings = stats.meetings,
            organizations = stats.organizations,
            topics = stats.topics,
            skipped = stats.documents_skipped,
            "Knowledge graph written"
        );
        Ok(stats)
    }

    fn add_persons(&self, vault: &Path, assembler: &mut GraphAssembler) {
        let dir = vault.join(&self.config.vault.person_dir);
        if !dir.is_dir() {
            tracing::warn!(path = %dir.display(), "Person directory not found");
            return;
        }

        for path in markdown_files(&dir, Some(1)) {
            let relative = relative_to(vault, &path);
            let record = read_document(&path)
                .and_then(|content| self.builder.build_person(&relative, &content));
            match record {
                Ok(person) => {
                    tracing::debug!(name = %person.name, path = %person.file_path, "Person");
                    if !assembler.add_person(&person) {
                        assembler.record_skipped();
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %relative.display(), "Skipping document: {}", e);
                    assembler.record_skipped();
                }
            }
        }
    }

    fn add_projects(&self, vault: &Path, assembler: &mut GraphAssembler) {
        for project_dir in &self.config.vault.project_dirs {
            let base = vault.join(&project_dir.path);
            if !base.is_dir() {
                tracing::debug!(path = %base.display(), "Project directory not found");
                continue;
            }

            let folders = WalkDir::new(&base)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!("Unreadable entry under {}: {}", base.display(), e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_dir() && !is_hidden(entry.path()));

            for folder in folders {
                let folder_name: String = folder.file_name().to_string_lossy().nfc().collect();
                let mut documents: Vec<ProjectDocument> = Vec::new();

                for path in markdown_files(folder.path(), None) {
                    let relative = relative_to(vault, &path);
                    let document = read_document(&path).and_then(|content| {
                        self.builder.build_project_document(&relative, &content)
                    });
                    match document {
                        Ok(document) => documents.push(document),
                        Err(e) => {
                            tracing::warn!(path = %relative.display(), "Skipping document: {}", e);
                            assembler.record_skipped();
                        }
                    }
                }

                let project = self.builder.build_project(
                    &folder_name,
                    &relative_to(vault, folder.path()),
                    project_dir.archived,
                    documents,
                );
                tracing::debug!(name = %project.name, archived = project.archived, "Project");
                assembler.add_project(&project);
            }
        }
    }
}

fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Markdown files below `dir` in sorted order, hidden entries excluded.
fn markdown_files(dir: &Path, max_depth: Option<usize>) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }
    walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_markdown_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.md", "");
        write(dir.path(), "a.md", "");
        write(dir.path(), "notes.txt", "");
        write(dir.path(), ".hidden.md", "");
        write(dir.path(), "sub/c.md", "");

        let shallow: Vec<String> = markdown_files(dir.path(), Some(1))
            .iter()
            .map(|p| relative_to(dir.path(), p).display().to_string())
            .collect();
        assert_eq!(shallow, vec!["a.md", "b.md"]);
        assert_eq!(markdown_files(dir.path(), None).len(), 3);
    }

    #[test]
    fn test_missing_vault_is_reported() {
        let pipeline = BuildPipeline::new(Config::default()).unwrap();
        let result = pipeline.run(Path::new("/no/such/vault"));
        assert!(matches!(result, Err(NotegraphError::InvalidPath(_))));
    }

    #[test]
    fn test_missing_output_directory_is_reported_before_build() {
        let vault = TempDir::new().unwrap();
        let pipeline = BuildPipeline::new(Config::default()).unwrap();
        let output = vault.path().join("missing/dir/knowledge.ttl");
        let result = pipeline.build_to_file(vault.path(), &output);
        assert!(matches!(result, Err(NotegraphError::InvalidPath(_))));
        assert!(!output.exists());
    }
}

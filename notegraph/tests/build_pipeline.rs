mod common;

use std::fs;

use chrono::NaiveDate;
use common::{build, pipeline, TestVault, ACTIVE_DIR, ARCHIVE_DIR};
use notegraph::graph::{
    date_literal, entity_iri, iri, lang_literal, meeting_iri, plain, triple, vocab, EntityKind,
    Literal, Subject, Term,
};
use notegraph::NotegraphError;
use pretty_assertions::assert_eq;
use unicode_normalization::UnicodeNormalization;

fn date(y: i32, m: u32, d: u32) -> Literal {
    date_literal(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn meetings_of(graph: &notegraph::KnowledgeGraph, owner: &str) -> Vec<String> {
    graph
        .iter()
        .filter(|t| {
            t.object == Term::from(iri(owner))
                && (t.predicate.as_str() == vocab::PARTICIPANT
                    || t.predicate.as_str() == vocab::RELATED_TO)
        })
        .filter_map(|t| match &t.subject {
            Subject::NamedNode(node) => Some(node.as_str().to_string()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_heading_entry_becomes_one_meeting() {
    let vault = TestVault::new();
    vault.person("조쉬김_앤틀러.md", "## 2024.11.21\n커피챗\n");

    let (graph, stats) = build(&vault);
    let josh = entity_iri(EntityKind::Person, "조쉬김");
    let meeting = meeting_iri(&josh, 1);

    assert_eq!(stats.meetings, 1);
    assert_eq!(meetings_of(&graph, &josh), vec![meeting.clone()]);
    assert!(graph.contains(&triple(&meeting, vocab::DATE, date(2024, 11, 21))));
    assert!(graph.contains(&triple(
        &meeting,
        vocab::SUMMARY,
        lang_literal("커피챗", "ko")
    )));
}

#[test]
fn test_same_date_heading_and_bullet_give_one_meeting() {
    let vault = TestVault::new();
    vault.person(
        "조쉬김_앤틀러.md",
        "## 2024.11.21\n첫 만남\n\n---\n- 2024.11.21 같은 날 메모\n",
    );

    let (graph, stats) = build(&vault);
    let josh = entity_iri(EntityKind::Person, "조쉬김");
    assert_eq!(stats.meetings, 1);
    assert!(graph.contains(&triple(
        &meeting_iri(&josh, 1),
        vocab::SUMMARY,
        lang_literal("첫 만남", "ko")
    )));
}

#[test]
fn test_equivalent_affiliations_share_one_organization() {
    let vault = TestVault::new();
    vault
        .person("가_(주)앤틀러.md", "")
        .person("나_앤틀러 주식회사.md", "")
        .person("다_앤틀러.md", "");

    let (graph, stats) = build(&vault);
    assert_eq!(stats.organizations, 1);
    assert_eq!(graph.count_instances(vocab::ORGANIZATION), 1);

    let org = Term::from(iri(entity_iri(EntityKind::Organization, "앤틀러")));
    let members = graph
        .iter()
        .filter(|t| t.predicate.as_str() == vocab::AFFILIATED_WITH && t.object == org)
        .count();
    assert_eq!(members, 3);
}

#[test]
fn test_unterminated_header_document_is_skipped() {
    let vault = TestVault::new();
    vault
        .person("깨짐_앤틀러.md", "---\ntitle: 깨짐\n## 2024.01.01\n내용\n")
        .person("정상_앤틀러.md", "## 2024.01.01\n내용\n");

    let (graph, stats) = build(&vault);
    assert_eq!(stats.persons, 1);
    assert_eq!(stats.documents_skipped, 1);
    assert!(!graph
        .iter()
        .any(|t| t.object == Term::from(lang_literal("깨짐", "ko"))
            || t.subject.to_string().contains("깨짐")));
}

#[test]
fn test_build_is_byte_identical_across_runs() {
    let vault = TestVault::new();
    vault
        .person(
            "조쉬김_앤틀러.md",
            "---\nsummary: 투자 심사역\ntags: [vc, 투자]\ncontact:\n  email: josh@antler.co\n---\n## 2024.11.21\n커피챗 #투자\n- 2024.12.01 [[이영희]] 소개\n",
        )
        .person("이영희_친구.md", "- 2024.12.02 점심 [[볼드 해커톤]]\n")
        .project(ACTIVE_DIR, "251218 볼드 해커톤", "README.md", "## 2025.12.18\n킥오프 [[조쉬김]]\n")
        .project(ARCHIVE_DIR, "2309 Mr.Trend", "notes/log.md", "## 2023.09.05\n정리\n");

    let first = vault.path().join("first.ttl");
    let second = vault.path().join("second.ttl");
    pipeline().build_to_file(vault.path(), &first).unwrap();
    pipeline().build_to_file(vault.path(), &second).unwrap();

    let a = fs::read(&first).unwrap();
    let b = fs::read(&second).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_cross_references_and_projects() {
    let vault = TestVault::new();
    vault
        .person("조쉬김_앤틀러.md", "- 2024.12.01 [[이영희_친구|영희]] 소개, [[조쉬김]]\n")
        .person("이영희_친구.md", "- 2024.12.02 점심 [[볼드 해커톤]]\n")
        .project(
            ACTIVE_DIR,
            "251218 볼드 해커톤",
            "README.md",
            "---\nsummary: 해커톤 준비\n---\n## 2025.12.18\n킥오프 [[조쉬김]]\n",
        )
        .project(ACTIVE_DIR, ".obsidian", "ignored.md", "## 2025.01.01\nx\n")
        .project(ARCHIVE_DIR, "2309 Mr.Trend", "log.md", "## 2023.09.05\n정리\n");

    let (graph, stats) = build(&vault);
    let josh = entity_iri(EntityKind::Person, "조쉬김");
    let lee = entity_iri(EntityKind::Person, "이영희");
    let hackathon = entity_iri(EntityKind::Project, "251218 볼드 해커톤");
    let trend = entity_iri(EntityKind::Project, "2309 Mr.Trend");

    assert_eq!(stats.projects, 2);
    assert!(graph.contains(&triple(&josh, vocab::KNOWS, iri(&lee))));
    assert!(!graph.contains(&triple(&josh, vocab::KNOWS, iri(&josh))));
    assert!(graph.contains(&triple(&lee, vocab::INVOLVED_IN, iri(&hackathon))));
    assert!(graph.contains(&triple(&josh, vocab::INVOLVED_IN, iri(&hackathon))));

    assert!(graph.contains(&triple(&hackathon, vocab::DATE, date(2025, 12, 18))));
    assert!(graph.contains(&triple(
        &hackathon,
        vocab::NAME,
        lang_literal("볼드 해커톤", "ko")
    )));
    assert!(graph.contains(&triple(
        &hackathon,
        vocab::FILE_PATH,
        plain("00_A_Projects/Active/251218 볼드 해커톤")
    )));
    assert!(graph.contains(&triple(
        &trend,
        vocab::TAG,
        lang_literal("archived", "en")
    )));
    assert_eq!(meetings_of(&graph, &trend), vec![meeting_iri(&trend, 1)]);
}

#[test]
fn test_decomposed_filenames_are_normalized() {
    let vault = TestVault::new();
    let nfd: String = "조쉬김_앤틀러.md".nfd().collect();
    vault.person(&nfd, "");

    let (graph, _) = build(&vault);
    let josh = entity_iri(EntityKind::Person, "조쉬김");
    assert!(graph.contains(&triple(
        &josh,
        vocab::NAME,
        lang_literal("조쉬김", "ko")
    )));
}

#[test]
fn test_missing_vault_fails_before_writing() {
    let vault = TestVault::new();
    let output = vault.output_path();
    let result = pipeline().build_to_file(&vault.path().join("nope"), &output);
    assert!(matches!(result, Err(NotegraphError::InvalidPath(_))));
    assert!(!output.exists());
}

#[test]
fn test_written_graph_loads_back() {
    let vault = TestVault::new();
    vault.person("조쉬김_앤틀러.md", "---\nlast_contact: 2024-11-21\n---\n## 2024.11.21\n커피챗\n");
    let output = vault.output_path();
    let stats = pipeline().build_to_file(vault.path(), &output).unwrap();

    let loaded = notegraph::KnowledgeGraph::load(&output).unwrap();
    assert_eq!(loaded.len(), stats.triples);
    let (built, _) = build(&vault);
    assert_eq!(loaded, built);
}

#[test]
fn test_names_with_non_ascii_digits_write_loadable_turtle() {
    let vault = TestVault::new();
    vault.person("김²철_앤틀러.md", "## 2024.11.21
커피챗
");
    let output = vault.output_path();
    let stats = pipeline().build_to_file(vault.path(), &output).unwrap();
    assert_eq!(stats.persons, 1);

    let loaded = notegraph::KnowledgeGraph::load(&output).unwrap();
    let person = entity_iri(EntityKind::Person, "김²철");
    assert!(person.contains("person_김_철_"));
    assert!(loaded.contains(&triple(&person, vocab::NAME, lang_literal("김²철", "ko"))));
    assert_eq!(loaded.len(), stats.triples);
}

#[test]
fn test_build_stats_serialize_as_json() {
    let vault = TestVault::new();
    vault.person("조쉬김_앤틀러.md", "## 2024.11.21\n커피챗\n");
    let (_, stats) = build(&vault);
    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["persons"], 1);
    assert_eq!(json["meetings"], 1);
    assert_eq!(json["organizations"], 1);
    assert_eq!(json["triples"], stats.triples);
}

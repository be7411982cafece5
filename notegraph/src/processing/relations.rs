//! Cross-reference and topic extraction.
//!
//! - **Cross-references**: `[[target]]`, `[[target|alias]]`, `[[target#section]]`
//!   and `[[folder/target]]` links. A `name_qualifier` target keeps only the
//!   name portion.
//! - **Topics**: `#hashtag` tokens plus, for each configured keyword category,
//!   the earliest keyword occurring in the text.

use regex::Regex;

use crate::config::KeywordCategory;
use crate::error::Result;

/// Everything the relation extractor found in one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    pub links: Vec<String>,
    pub topics: Vec<String>,
}

pub struct RelationExtractor {
    link_pattern: Regex,
    hashtag_pattern: Regex,
    categories: Vec<KeywordCategory>,
}

impl RelationExtractor {
    pub fn new(categories: Vec<KeywordCategory>) -> Result<Self> {
        Ok(Self {
            link_pattern: Regex::new(r"\[\[([^\[\]]+)\]\]")?,
            hashtag_pattern: Regex::new(r"(?:^|\s)#([\p{L}\p{N}_]+)")?,
            categories,
        })
    }

    pub fn extract(&self, text: &str) -> Relations {
        Relations {
            links: self.links(text),
            topics: self.topics(text),
        }
    }

    /// Cross-reference targets, deduplicated in first-seen order.
    pub fn links(&self, text: &str) -> Vec<String> {
        let targets = self
            .link_pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| link_name(m.as_str()));
        dedup_ordered(targets)
    }

    /// Hashtags first, then one keyword per matching category.
    pub fn topics(&self, text: &str) -> Vec<String> {
        let hashtags = self
            .hashtag_pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|tag| tag.chars().any(char::is_alphabetic))
            .map(str::to_string);

        let tokens: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let keywords = self
            .categories
            .iter()
            .filter_map(|category| first_keyword(&tokens, &category.keywords));

        dedup_ordered(hashtags.chain(keywords))
    }
}

fn link_name(raw: &str) -> Option<String> {
    let target = raw.split('|').next().unwrap_or(raw);
    let target = target.split('#').next().unwrap_or(target);
    let target = target.rsplit('/').next().unwrap_or(target);
    let target = target.trim().trim_end_matches(".md");
    let name = match target.rsplit_once('_') {
        Some((name, _qualifier)) if !name.trim().is_empty() => name,
        _ => target,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Earliest token matching any keyword of the category. ASCII keywords must
/// equal the token (ignoring case); other keywords must start it, so that
/// Korean particles such as `투자를` still count.
fn first_keyword(tokens: &[&str], keywords: &[String]) -> Option<String> {
    tokens.iter().find_map(|token| {
        let lowered = token.to_lowercase();
        keywords
            .iter()
            .find(|keyword| {
                let keyword_lower = keyword.to_lowercase();
                if keyword.is_ascii() {
                    lowered == keyword_lower
                } else {
                    lowered.starts_with(&keyword_lower)
                }
            })
            .cloned()
    })
}

pub(crate) fn dedup_ordered(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}

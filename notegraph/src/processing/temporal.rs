use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::Result;
use crate::models::DatedEntry;

/// Date notations accepted after a heading or bullet marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notation {
    /// `YYYY.MM.DD` or `YYYY-MM-DD`
    Full,
    /// `YYMMDD`, century 20xx
    Compact,
    /// `YYYY.MM` or `YYYY-MM`, day defaults to the 1st
    Month,
}

/// Finds date-stamped entries in a document body.
///
/// Recognized forms:
/// - `## 2024.11.21 title` / `### 2024-11-21`: heading entries whose excerpt
///   runs until the next level 1-3 heading, a `---` rule, or end of text
/// - `## 241121` (`YYMMDD`) and `## 2024.12 title` (month granularity)
/// - `- 2024.11.21 text` / `- 2024.12 text`: bullet entries whose excerpt is
///   the rest of the line
///
/// Invalid calendar dates are skipped. Only the first entry per date is kept,
/// scanning in document order.
#[derive(Debug, Clone)]
pub struct TemporalExtractor {
    full: Regex,
    month: Regex,
    compact: Regex,
}

impl TemporalExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            full: Regex::new(r"^(\d{4})([.-])(\d{2})([.-])(\d{2})(\D.*)?$")?,
            month: Regex::new(r"^(\d{4})[.-](\d{2})(\s.*)?$")?,
            compact: Regex::new(r"^(\d{2})(\d{2})(\d{2})(\D.*)?$")?,
        })
    }

    pub fn extract(&self, body: &str) -> Vec<DatedEntry> {
        let lines: Vec<&str> = body.lines().collect();
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let entry = if let Some(rest) = heading_text(line) {
                self.parse_date_prefix(rest, true).map(|(date, title)| {
                    let mut excerpt = vec![title.trim()];
                    excerpt.extend(
                        lines[i + 1..]
                            .iter()
                            .take_while(|l| !ends_heading_span(l))
                            .copied(),
                    );
                    DatedEntry::new(date, excerpt.join("\n").trim())
                })
            } else if let Some(rest) = line.strip_prefix('-') {
                self.parse_date_prefix(rest.trim_start(), false)
                    .filter(|(_, text)| text.starts_with(char::is_whitespace))
                    .map(|(date, text)| DatedEntry::new(date, text.trim()))
                    .filter(|entry| !entry.excerpt.is_empty())
            } else {
                None
            };

            if let Some(entry) = entry {
                if seen.insert(entry.date) {
                    entries.push(entry);
                } else {
                    tracing::trace!(date = %entry.date, "Dropping repeated date");
                }
            }
        }

        entries
    }

    /// Parse a leading date, returning it with the remaining text.
    fn parse_date_prefix<'t>(
        &self,
        text: &'t str,
        allow_compact: bool,
    ) -> Option<(NaiveDate, &'t str)> {
        let (notation, caps) = if let Some(caps) = self.full.captures(text) {
            if caps[2] != caps[4] {
                return None;
            }
            (Notation::Full, caps)
        } else if let Some(caps) = self.month.captures(text) {
            (Notation::Month, caps)
        } else if allow_compact {
            (Notation::Compact, self.compact.captures(text)?)
        } else {
            return None;
        };

        let field = |i: usize| caps.get(i).map(|m| m.as_str());
        let (year, month, day, rest) = match notation {
            Notation::Full => (field(1)?.parse().ok()?, field(3)?, field(5)?, field(6)),
            Notation::Month => (field(1)?.parse().ok()?, field(2)?, "01", field(3)),
            Notation::Compact => {
                let year = 2000 + field(1)?.parse::<i32>().ok()?;
                (year, field(2)?, field(3)?, field(4))
            }
        };

        let date = NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?);
        if date.is_none() {
            tracing::debug!(?notation, "Skipping invalid calendar date in '{}'", text);
        }
        Some((date?, rest.unwrap_or("")))
    }
}

/// Text after a `##` or `###` marker.
fn heading_text(line: &str) -> Option<&str> {
    let level = line.chars().take_while(|&c| c == '#').count();
    matches!(level, 2 | 3).then(|| line[level..].trim_start())
}

fn ends_heading_span(line: &str) -> bool {
    if line.starts_with("---") {
        return true;
    }
    let level = line.chars().take_while(|&c| c == '#').count();
    (1..=3).contains(&level) && line[level..].starts_with(char::is_whitespace)
}

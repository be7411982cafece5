use std::collections::BTreeMap;

use serde_yaml::Value;
use unicode_normalization::UnicodeNormalization;

use crate::error::{NotegraphError, Result};

const DELIMITER: &str = "---";

/// Structured header block of a document. Lookups never fail: absent or
/// mistyped keys read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    fields: BTreeMap<String, Value>,
}

impl Header {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Scalar value as a trimmed string. Numbers and booleans are rendered;
    /// empty strings, sequences and mappings read as `None`.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(scalar_to_string)
            .filter(|s| !s.is_empty())
    }

    /// List value. A lone scalar is a one-element list; empty items are dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(scalar_to_string)
                .filter(|s| !s.is_empty())
                .collect(),
            Some(value) => scalar_to_string(value)
                .filter(|s| !s.is_empty())
                .into_iter()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Mapping of scalar values, e.g. `contact:`. Non-scalar entries are skipped.
    pub fn get_map(&self, key: &str) -> BTreeMap<String, String> {
        let Some(Value::Mapping(mapping)) = self.fields.get(key) else {
            return BTreeMap::new();
        };
        mapping
            .iter()
            .filter_map(|(k, v)| {
                let key = scalar_to_string(k)?;
                let value = scalar_to_string(v).filter(|s| !s.is_empty())?;
                Some((key, value))
            })
            .collect()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// A document separated into header block and free-text body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitDocument {
    pub header: Header,
    pub body: String,
}

/// Split a document into its `---` delimited header block and body.
///
/// Text that does not open with `---` has no header. A header that is not
/// a YAML mapping is treated as empty. A header that is opened but never
/// closed is an error, since its extent cannot be known.
pub fn split_header(text: &str) -> Result<SplitDocument> {
    let text: String = text.trim_start_matches('\u{feff}').nfc().collect();

    let mut lines = text.split_inclusive('\n');
    let opens_header = lines
        .next()
        .is_some_and(|first| first.trim_end() == DELIMITER);
    if !opens_header {
        return Ok(SplitDocument {
            header: Header::default(),
            body: text,
        });
    }

    let mut offset = text.find('\n').map_or(text.len(), |i| i + 1);
    let header_start = offset;
    let mut header_end = None;
    for line in lines {
        if line.trim_end() == DELIMITER {
            header_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_end, body_start)) = header_end else {
        return Err(NotegraphError::UnterminatedHeader);
    };

    let header = parse_header(&text[header_start..yaml_end]);
    Ok(SplitDocument {
        header,
        body: text[body_start..].trim().to_string(),
    })
}

fn parse_header(yaml: &str) -> Header {
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => Header {
            fields: mapping
                .into_iter()
                .filter_map(|(k, v)| Some((scalar_to_string(&k)?, v)))
                .collect(),
        },
        Ok(Value::Null) => Header::default(),
        Ok(_) => {
            tracing::debug!("Header block is not a mapping, ignoring it");
            Header::default()
        }
        Err(e) => {
            tracing::debug!("Malformed header block, ignoring it: {}", e);
            Header::default()
        }
    }
}

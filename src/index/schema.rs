//! Field declarations for a dataset's index.
//!
//! Each dataset declares which extracted fields are searchable, how they are
//! analyzed, how strongly they weigh in ranking, and which ones come back in
//! search results.

use crate::utils::{extract_tokens, word_ngrams};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a field's value is turned into index terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// The whole value is a single term
    Keyword { lowercase: bool },
    /// camelCase / snake_case aware word tokens
    Text,
    /// Every character n-gram of every word, sizes `min..=max`
    NgramWords { min: usize, max: usize },
    /// Not searchable, only returned with results
    Stored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub stored: bool,
    pub boost: f32,
}

impl Field {
    pub fn keyword(name: &str) -> Self {
        Self::new(name, FieldKind::Keyword { lowercase: true })
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn ngram_words(name: &str, min: usize, max: usize) -> Self {
        Self::new(name, FieldKind::NgramWords { min, max })
    }

    pub fn stored(name: &str) -> Self {
        Self::new(name, FieldKind::Stored)
    }

    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            stored: true,
            boost: 1.0,
        }
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Searchable but not returned with results
    pub fn unstored(mut self) -> Self {
        self.stored = false;
        self
    }

    pub fn is_indexed(&self) -> bool {
        !matches!(self.kind, FieldKind::Stored)
    }

    /// Terms written to the postings for this field's value
    pub fn index_terms(&self, value: &str) -> HashSet<String> {
        match self.kind {
            FieldKind::Keyword { lowercase } => {
                let value = value.trim();
                let mut terms = HashSet::new();
                if !value.is_empty() {
                    terms.insert(if lowercase { value.to_lowercase() } else { value.to_string() });
                }
                terms
            }
            FieldKind::Text => extract_tokens(value).into_iter().collect(),
            FieldKind::NgramWords { min, max } => word_ngrams(value, min, max),
            FieldKind::Stored => HashSet::new(),
        }
    }

    /// Terms that must all be present in this field for a query term to match it.
    /// `None` means the field can never match the term.
    pub fn query_terms(&self, term: &str) -> Option<Vec<String>> {
        match self.kind {
            FieldKind::Keyword { .. } | FieldKind::Text => Some(vec![term.to_string()]),
            FieldKind::NgramWords { min, max } => {
                let chars: Vec<char> = term.chars().collect();
                if chars.len() < min {
                    None
                } else if chars.len() <= max {
                    Some(vec![term.to_string()])
                } else {
                    let mut windows: Vec<String> =
                        chars.windows(max).map(|w| w.iter().collect()).collect();
                    windows.dedup();
                    Some(windows)
                }
            }
            FieldKind::Stored => None,
        }
    }
}

/// Ordered field declarations of one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn indexed_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_indexed())
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

use crate::utils::extract_query_tokens;

/// Sub-query standing for "every document"
pub const MATCH_ALL: &str = "*";

/// The raw input line and its whitespace-split views.
/// Rebuilt from scratch for every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    /// Split on single whitespace characters of the left-trimmed input;
    /// a trailing separator yields a trailing empty part
    pub parts: Vec<String>,
    /// Non-empty parts only
    pub trimmed_parts: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<String> = raw
            .trim_start()
            .split(char::is_whitespace)
            .map(str::to_string)
            .collect();
        let trimmed_parts = parts.iter().filter(|p| !p.is_empty()).cloned().collect();

        Self {
            raw: raw.to_string(),
            parts,
            trimmed_parts,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed_parts.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.trimmed_parts.first().map(String::as_str)
    }

    /// True once the user typed a separator after the first token
    pub fn has_separator_after_first(&self) -> bool {
        self.parts.len() > 1
    }

    /// Tokens after the first, joined by single spaces
    pub fn rest(&self) -> String {
        self.trimmed_parts.get(1..).unwrap_or_default().join(" ")
    }

    /// The trimmed input as a selection filter
    pub fn filter(&self) -> String {
        self.trimmed_parts.join(" ")
    }
}

/// An in-dataset query as the index understands it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    MatchAll,
    /// Lowercase terms, all of which must match
    Terms(Vec<String>),
}

impl SearchQuery {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == MATCH_ALL {
            return SearchQuery::MatchAll;
        }

        // Text without any word (e.g. "!!") matches nothing
        SearchQuery::Terms(extract_query_tokens(text))
    }
}

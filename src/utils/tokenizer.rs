use std::collections::HashSet;

/// Maximum token length to store in the index.
/// Longer runs are URL fragments or hashes, not something a user types.
const MAX_TOKEN_LENGTH: usize = 64;

/// Extract lowercase tokens from a field value for indexing.
/// Handles: snake_case splits, camelCase splits, words, digits.
/// Tokens come back in first-seen order without duplicates.
pub fn extract_tokens(content: &str) -> Vec<String> {
    tokenize(content, MAX_TOKEN_LENGTH)
}

/// Like [`extract_tokens`] but keeps tokens of any length, so an overlong
/// query word still has to match instead of vanishing
pub fn extract_query_tokens(content: &str) -> Vec<String> {
    tokenize(content, usize::MAX)
}

fn tokenize(content: &str, max_len: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    let mut current_token = String::new();
    let mut prev_char_type = CharType::Other;

    for ch in content.chars() {
        let char_type = classify_char(ch);

        match char_type {
            CharType::Lower | CharType::Digit => {
                current_token.push(ch);
            }
            CharType::Upper => {
                if prev_char_type == CharType::Lower && !current_token.is_empty() {
                    add_token(&mut tokens, &mut seen, &current_token, max_len);
                    current_token.clear();
                }
                current_token.extend(ch.to_lowercase());
            }
            CharType::Other => {
                if !current_token.is_empty() {
                    add_token(&mut tokens, &mut seen, &current_token, max_len);
                    current_token.clear();
                }
            }
        }

        prev_char_type = char_type;
    }

    if !current_token.is_empty() {
        add_token(&mut tokens, &mut seen, &current_token, max_len);
    }

    tokens
}

/// Split on anything that is not alphanumeric, lowercasing every word.
/// Unlike [`extract_tokens`] this keeps camelCase words whole.
pub fn extract_words(content: &str) -> Vec<String> {
    content
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// All character n-grams of every word, for sizes `min..=max`
pub fn word_ngrams(content: &str, min: usize, max: usize) -> HashSet<String> {
    let mut grams = HashSet::new();

    for word in extract_words(content) {
        let chars: Vec<char> = word.chars().collect();
        for size in min.max(1)..=max {
            if size > chars.len() {
                break;
            }
            for window in chars.windows(size) {
                grams.insert(window.iter().collect());
            }
        }
    }

    grams
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CharType {
    Upper,
    Lower,
    Digit,
    Other,
}

fn classify_char(ch: char) -> CharType {
    if ch.is_uppercase() {
        CharType::Upper
    } else if ch.is_lowercase() {
        CharType::Lower
    } else if ch.is_numeric() {
        CharType::Digit
    } else {
        // '_' lands here too, so snake_case splits
        CharType::Other
    }
}

fn add_token(tokens: &mut Vec<String>, seen: &mut HashSet<String>, token: &str, max_len: usize) {
    if token.chars().count() > max_len {
        return;
    }
    let token = token.to_lowercase();
    if seen.insert(token.clone()) {
        tokens.push(token);
    }
}

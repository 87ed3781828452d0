//! Utility functions shared throughout findref.
//!
//! ## Modules
//!
//! - [`app_data`] - Config file and data directory management (XDG-compliant)
//! - [`logging`] - Tracing subscriber setup (log file for the TUI, stderr otherwise)
//! - [`progress`] - Spinners that compile away without the `progress` feature
//! - [`tokenizer`] - Token, word and n-gram extraction for indexing and querying
//!
//! ## Key Functions
//!
//! ```no_run
//! use findref::utils::{extract_tokens, word_ngrams};
//!
//! // Tokens for text fields and query terms
//! let tokens = extract_tokens("createRole");
//! // Returns: ["create", "role"]
//!
//! // N-grams for partial-word matching
//! let grams = word_ngrams("role", 2, 6);
//! ```

pub mod app_data;
pub mod logging;
pub mod progress;
pub mod tokenizer;

pub use app_data::*;
pub use logging::*;
pub use tokenizer::*;

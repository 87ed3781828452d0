#![no_main]

use findref::utils::{extract_tokens, word_ngrams};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    for token in extract_tokens(data) {
        assert!(!token.is_empty());
    }
    let _ = word_ngrams(data, 2, 6);
});

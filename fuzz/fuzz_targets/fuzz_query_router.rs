#![no_main]

use findref::query::{BufferEdit, Query, SearchQuery};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let query = Query::parse(data);
    assert!(query.trimmed_parts.iter().all(|p| !p.is_empty()));
    assert!(query.trimmed_parts.len() <= query.parts.len());

    let _ = SearchQuery::parse(&query.rest());

    // Must never split a multi-byte character
    let _ = BufferEdit::StripEscape.apply(data);
});

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use perspective::language;
use perspective::resolver::{resolve, AttributeSelection};

#[derive(Arbitrary, Debug)]
struct Input {
    tokens: Vec<String>,
    joined: String,
    language: String,
    skip_on_unknown: bool,
}

fuzz_target!(|input: Input| {
    let many = AttributeSelection::Many(input.tokens);
    if let Ok(resolved) = resolve(&many, input.skip_on_unknown) {
        let mut seen = resolved.clone();
        seen.sort_by_key(|a| a.as_str());
        seen.dedup();
        assert_eq!(seen.len(), resolved.len(), "resolved attributes must be unique");
    }

    let _ = resolve(&AttributeSelection::Single(input.joined), input.skip_on_unknown);

    if let Some(lang) = language::lookup(&input.language) {
        assert_eq!(language::language_code(lang.code), Some(lang.code));
    }
});

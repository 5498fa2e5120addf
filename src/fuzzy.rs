// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Closest-name matching for attribute and language lookups

/// Minimum similarity for a candidate to count as a close match
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Similarity in `[0, 1]`: one minus the Levenshtein distance over the
/// length of the longer string. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Best candidate scoring at least `cutoff`.
///
/// Ties keep the earliest candidate, so callers control precedence through
/// candidate order.
pub fn closest_match<'a, I>(target: &str, candidates: I, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = similarity(target, candidate);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

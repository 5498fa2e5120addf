// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Plain-text rendering of scores

use super::require_scores;
use crate::attributes::Attribute;
use crate::scores::{AnalyzeResult, SortOrder};
use crate::{PerspectiveError, Result};

/// One line per attribute, scores lined up:
///
/// ```text
/// Toxicity:        97.64%
/// Severe Toxicity: 84.36%
/// ```
///
/// With `align_right` the names are right-aligned instead of the scores.
pub fn format_response(scores: &AnalyzeResult, align_right: bool, sort: Option<SortOrder>) -> Result<String> {
    require_scores(scores)?;

    let rows = match sort {
        Some(order) => scores.sorted(order),
        None => scores.iter().copied().collect(),
    };
    let width = rows
        .iter()
        .map(|s| s.attribute.as_str().len())
        .max()
        .unwrap_or(0);

    let lines: Vec<String> = rows
        .iter()
        .map(|s| {
            let name = s.attribute.display_name();
            let pad = " ".repeat(width.saturating_sub(name.len()));
            if align_right {
                format!("{}{}: {:.2}%", pad, name, s.value)
            } else {
                format!("{}: {}{:.2}%", name, pad, s.value)
            }
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Attribute with the highest score
pub fn highest(scores: &AnalyzeResult) -> Result<Attribute> {
    scores
        .highest()
        .map(|s| s.attribute)
        .ok_or(PerspectiveError::EmptyResponse)
}

/// Attribute with the lowest score
pub fn lowest(scores: &AnalyzeResult) -> Result<Attribute> {
    scores
        .lowest()
        .map(|s| s.attribute)
        .ok_or(PerspectiveError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalyzeResult {
        [
            (Attribute::Toxicity, 97.6412),
            (Attribute::SevereToxicity, 84.36),
            (Attribute::Threat, 32.1),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_format_left_aligned() {
        let text = format_response(&sample(), false, None).unwrap();
        assert_eq!(
            text,
            "Toxicity:        97.64%\nSevere Toxicity: 84.36%\nThreat:          32.10%"
        );
    }

    #[test]
    fn test_format_right_aligned_sorted() {
        let text = format_response(&sample(), true, Some(SortOrder::Ascending)).unwrap();
        assert_eq!(
            text,
            "         Threat: 32.10%\nSevere Toxicity: 84.36%\n       Toxicity: 97.64%"
        );
    }

    #[test]
    fn test_format_title_cases_small_words() {
        let scores: AnalyzeResult = [(Attribute::AttackOnAuthor, 5.0), (Attribute::LikelyToReject, 1.0)]
            .into_iter()
            .collect();
        let text = format_response(&scores, false, None).unwrap();
        assert!(text.starts_with("Attack on Author: "));
        assert!(text.contains("Likely to Reject: "));
    }

    #[test]
    fn test_empty_input() {
        let empty = AnalyzeResult::new();
        assert!(matches!(format_response(&empty, false, None), Err(PerspectiveError::EmptyResponse)));
        assert!(matches!(highest(&empty), Err(PerspectiveError::EmptyResponse)));
        assert!(matches!(lowest(&empty), Err(PerspectiveError::EmptyResponse)));
    }

    #[test]
    fn test_highest_lowest() {
        assert_eq!(highest(&sample()).unwrap(), Attribute::Toxicity);
        assert_eq!(lowest(&sample()).unwrap(), Attribute::Threat);
    }
}

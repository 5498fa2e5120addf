// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Analysis results

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::attributes::Attribute;
use crate::{PerspectiveError, Result};

/// One scored attribute, value in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeScore {
    pub attribute: Attribute,
    pub value: f64,
}

/// Direction for score-based sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = PerspectiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(PerspectiveError::UnknownSorting(other.to_string())),
        }
    }
}

/// Scores keyed by attribute, in request order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyzeResult {
    scores: Vec<AttributeScore>,
    /// Languages the service says it scored in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detected_languages: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttributeScores {
    summary_score: RawScore,
}

#[derive(Deserialize)]
struct RawScore {
    value: f64,
}

fn string_list(raw: &serde_json::Value, key: &str) -> Vec<String> {
    raw.get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Summary score of one attribute in a raw response, as a fraction
pub(crate) fn summary_value(raw: &serde_json::Value, name: &str) -> Option<f64> {
    let entry = raw.get("attributeScores")?.get(name)?;
    serde_json::from_value::<RawAttributeScores>(entry.clone())
        .ok()
        .map(|s| s.summary_score.value)
}

impl AnalyzeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simplify a raw API response, keeping the response's attribute order.
    ///
    /// Attribute names outside the catalog are ignored.
    pub fn from_raw(raw: &serde_json::Value) -> Result<Self> {
        let scores = raw
            .get("attributeScores")
            .and_then(|v| v.as_object())
            .ok_or(PerspectiveError::EmptyResponse)?;

        let mut result = Self::new();
        for name in scores.keys() {
            let Ok(attribute) = name.parse::<Attribute>() else {
                continue;
            };
            if let Some(value) = summary_value(raw, name) {
                result.insert(attribute, value * 100.0);
            }
        }
        result.languages = string_list(raw, "languages");
        result.detected_languages = string_list(raw, "detectedLanguages");
        Ok(result)
    }

    /// Scores for `requested`, in that order; every one must be present
    pub(crate) fn from_response(raw: &serde_json::Value, requested: &[Attribute]) -> Result<Self> {
        let mut result = Self::new();
        for attribute in requested {
            let value = summary_value(raw, attribute.as_str()).ok_or_else(|| {
                PerspectiveError::Http(format!("Response carries no score for {}", attribute))
            })?;
            result.insert(*attribute, value * 100.0);
        }
        result.languages = string_list(raw, "languages");
        result.detected_languages = string_list(raw, "detectedLanguages");
        Ok(result)
    }

    /// Set a score, replacing an existing one in place
    pub fn insert(&mut self, attribute: Attribute, value: f64) {
        match self.scores.iter_mut().find(|s| s.attribute == attribute) {
            Some(existing) => existing.value = value,
            None => self.scores.push(AttributeScore { attribute, value }),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.attribute == attribute)
            .map(|s| s.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeScore> {
        self.scores.iter()
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.scores.iter().map(|s| s.attribute).collect()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Highest-scoring entry; the first one wins a tie
    pub fn highest(&self) -> Option<&AttributeScore> {
        self.scores.iter().fold(None, |best: Option<&AttributeScore>, s| match best {
            Some(b) if b.value >= s.value => Some(b),
            _ => Some(s),
        })
    }

    /// Lowest-scoring entry; the first one wins a tie
    pub fn lowest(&self) -> Option<&AttributeScore> {
        self.scores.iter().fold(None, |best: Option<&AttributeScore>, s| match best {
            Some(b) if b.value <= s.value => Some(b),
            _ => Some(s),
        })
    }

    /// Copy of the scores sorted by value; equal values keep their order
    pub fn sorted(&self, order: SortOrder) -> Vec<AttributeScore> {
        let mut scores = self.scores.clone();
        scores.sort_by(|a, b| {
            let ord = a.value.total_cmp(&b.value);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        scores
    }

    /// `{"TOXICITY": 42.0, ...}`
    pub fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.scores
            .iter()
            .map(|s| (s.attribute.as_str().to_string(), serde_json::json!(s.value)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AnalyzeResult {
    type Item = &'a AttributeScore;
    type IntoIter = std::slice::Iter<'a, AttributeScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.scores.iter()
    }
}

impl FromIterator<(Attribute, f64)> for AnalyzeResult {
    fn from_iter<I: IntoIterator<Item = (Attribute, f64)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (attribute, value) in iter {
            result.insert(attribute, value);
        }
        result
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Attribute resolution
//!
//! Turns whatever the caller wrote ("toxicity", "insluT", "production",
//! `"SPAM","OBSCENE"`) into an ordered, de-duplicated list of catalog
//! attributes.
//!
//! Fuzzy matching is best effort: a typo within the similarity cutoff of a
//! different attribute resolves to that attribute without complaint.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::{Attribute, AttributeGroup};
use crate::fuzzy::{closest_match, DEFAULT_CUTOFF};
use crate::{PerspectiveError, Result};

/// What the caller asked to be scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeSelection {
    Single(String),
    Many(Vec<String>),
    Group(AttributeGroup),
}

impl AttributeSelection {
    /// Raw tokens, before group expansion or matching
    fn tokens(&self) -> Result<Vec<String>> {
        match self {
            AttributeSelection::Group(group) => Ok(vec![group.name().to_string()]),
            AttributeSelection::Single(raw) => split_joined(raw),
            AttributeSelection::Many(raws) => {
                let mut out = Vec::new();
                for raw in raws {
                    out.extend(split_joined(raw)?);
                }
                Ok(out)
            }
        }
    }
}

impl From<&str> for AttributeSelection {
    fn from(s: &str) -> Self {
        AttributeSelection::Single(s.to_string())
    }
}

impl From<String> for AttributeSelection {
    fn from(s: String) -> Self {
        AttributeSelection::Single(s)
    }
}

impl From<Vec<String>> for AttributeSelection {
    fn from(v: Vec<String>) -> Self {
        AttributeSelection::Many(v)
    }
}

impl From<Vec<&str>> for AttributeSelection {
    fn from(v: Vec<&str>) -> Self {
        AttributeSelection::Many(v.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for AttributeSelection {
    fn from(v: &[&str]) -> Self {
        AttributeSelection::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Attribute> for AttributeSelection {
    fn from(a: Attribute) -> Self {
        AttributeSelection::Single(a.as_str().to_string())
    }
}

impl From<Vec<Attribute>> for AttributeSelection {
    fn from(v: Vec<Attribute>) -> Self {
        AttributeSelection::Many(v.into_iter().map(|a| a.as_str().to_string()).collect())
    }
}

impl From<AttributeGroup> for AttributeSelection {
    fn from(g: AttributeGroup) -> Self {
        AttributeSelection::Group(g)
    }
}

/// Split `"A","B"` or `A, B` into separate tokens.
///
/// Blank input yields no tokens; a quoted empty entry is malformed.
fn split_joined(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    if !raw.contains(',') {
        let token = raw.trim().trim_matches('"').trim();
        if token.is_empty() {
            return Err(PerspectiveError::InvalidFormat(raw.to_string()));
        }
        return Ok(vec![token.to_string()]);
    }

    raw.split(',')
        .map(|part| {
            let token = part.trim().trim_matches('"').trim();
            if token.is_empty() {
                Err(PerspectiveError::InvalidFormat(raw.to_string()))
            } else {
                Ok(token.to_string())
            }
        })
        .collect()
}

/// Match one token against the catalog: exact first, then closest name
pub fn match_attribute(token: &str) -> Option<Attribute> {
    let normalized = token.trim().to_uppercase();
    if let Ok(exact) = normalized.parse::<Attribute>() {
        return Some(exact);
    }
    let names = Attribute::ALL.iter().map(|a| a.as_str());
    let best = closest_match(&normalized, names, DEFAULT_CUTOFF)?;
    best.parse().ok()
}

/// Resolve a selection to canonical attributes.
///
/// Fails with `MissingAttributes` when the selection holds no tokens at all.
/// With `skip_on_unknown` unmatched tokens are dropped and the result may be
/// empty; otherwise the first unmatched token fails with `UnknownAttribute`.
pub fn resolve(selection: &AttributeSelection, skip_on_unknown: bool) -> Result<Vec<Attribute>> {
    let tokens = selection.tokens()?;
    if tokens.is_empty() {
        return Err(PerspectiveError::MissingAttributes);
    }

    let mut resolved: Vec<Attribute> = Vec::new();

    for token in &tokens {
        // Exact attribute names win over group aliases
        if let Ok(exact) = token.parse::<Attribute>() {
            push_unique(&mut resolved, exact);
            continue;
        }

        if let Some(group) = AttributeGroup::from_alias(token) {
            debug!("Expanding group {} into {} attributes", group, group.members().len());
            for member in group.members() {
                push_unique(&mut resolved, *member);
            }
            continue;
        }

        match match_attribute(token) {
            Some(attr) => {
                debug!("Resolved \"{}\" to {}", token, attr);
                push_unique(&mut resolved, attr);
            }
            None if skip_on_unknown => {
                debug!("Skipping unknown attribute \"{}\"", token);
            }
            None => return Err(PerspectiveError::UnknownAttribute(token.clone())),
        }
    }

    Ok(resolved)
}

fn push_unique(resolved: &mut Vec<Attribute>, attr: Attribute) {
    if !resolved.contains(&attr) {
        resolved.push(attr);
    }
}

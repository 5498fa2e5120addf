// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Perspective: client for the Perspective comment analysis API
//!
//! Scores text for attributes such as toxicity or insult. Attribute names are
//! matched forgivingly (any case, group aliases, close typos), languages may be
//! given as codes or English names, and results can be formatted, charted or
//! exported to SQLite.

pub mod attributes;
pub mod client;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod language;
pub mod report;
pub mod resolver;
pub mod scores;
pub mod transport;

pub use attributes::{Attribute, AttributeGroup};
pub use client::{AnalyzeOptions, AnalyzeOutcome, Client};
pub use config::{AppConfig, ClientConfig, LogLevel};
pub use error::{PerspectiveError, Result};
pub use resolver::AttributeSelection;
pub use scores::{AnalyzeResult, SortOrder};

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Reporting helpers for analysis results
//!
//! Everything here accepts an [`AnalyzeResult`]; raw responses go through
//! [`AnalyzeResult::from_raw`] first.

pub mod chart;
pub mod database;
pub mod format;
pub mod history;

pub use chart::save_chart;
pub use database::{load_data, save_data, ScoreDatabase};
pub use format::{format_response, highest, lowest};
pub use history::{History, HistoryEntry};

use crate::scores::AnalyzeResult;
use crate::{PerspectiveError, Result};

fn require_scores(scores: &AnalyzeResult) -> Result<()> {
    if scores.is_empty() {
        return Err(PerspectiveError::EmptyResponse);
    }
    Ok(())
}

fn require_file_name(path: &std::path::Path) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(PerspectiveError::EmptyFileName);
    }
    Ok(())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Analysis history log (JSON Lines)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::scores::AnalyzeResult;
use crate::Result;

/// One completed analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub scores: AnalyzeResult,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>, language: Option<String>, scores: AnalyzeResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            text: text.into(),
            language,
            scores,
        }
    }
}

/// Append-only log of analyses
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append an entry to the log
    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read every entry, oldest first. Unparseable lines are skipped.
    pub fn read_all(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Failed to parse history entry: {}", e),
            }
        }

        Ok(entries)
    }

    /// Most recent `count` entries, newest first
    pub fn get_recent(&self, count: usize) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(count);
        Ok(entries)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;
    use tempfile::tempdir;

    fn entry(text: &str, toxicity: f64) -> HistoryEntry {
        let scores: AnalyzeResult = [(Attribute::Toxicity, toxicity)].into_iter().collect();
        HistoryEntry::new(text, Some("en".to_string()), scores)
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempdir().unwrap();
        let history = History::new(dir.path().join("history.jsonl"));
        assert!(history.read_all().unwrap().is_empty());

        let first = entry("first", 10.0);
        history.append(&first).unwrap();
        history.append(&entry("second", 20.0)).unwrap();

        let all = history.read_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], first);
        assert_eq!(all[1].scores.get(Attribute::Toxicity), Some(20.0));
    }

    #[test]
    fn test_recent_is_newest_first() {
        let dir = tempdir().unwrap();
        let history = History::new(dir.path().join("history.jsonl"));
        for (i, text) in ["a", "b", "c"].iter().enumerate() {
            history.append(&entry(text, i as f64)).unwrap();
        }
        let recent = history.get_recent(2).unwrap();
        let texts: Vec<_> = recent.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "b"]);
    }

    #[test]
    fn test_corrupt_lines_skipped_and_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let history = History::new(path.clone());
        history.append(&entry("ok", 1.0)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{broken").unwrap();

        assert_eq!(history.read_all().unwrap().len(), 1);
        history.clear().unwrap();
        assert!(!history.path().exists());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(entry("x", 1.0).id, entry("x", 1.0).id);
    }
}

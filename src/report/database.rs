// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! SQLite export of scores
//!
//! The file holds a single table, `data(attribute, value)`, with upper-case
//! attribute names and percent values.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::{require_file_name, require_scores};
use crate::attributes::Attribute;
use crate::scores::{AnalyzeResult, SortOrder};
use crate::{PerspectiveError, Result};

/// Score table wrapper (thread-safe)
#[derive(Clone)]
pub struct ScoreDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl ScoreDatabase {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.initialize()?;
        Ok(db)
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PerspectiveError::Config("Database lock poisoned".to_string()))
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS data (
                attribute TEXT NOT NULL,
                value REAL NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    /// Insert every score, in iteration order, in one transaction
    pub fn insert_scores<'a, I>(&self, scores: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a crate::scores::AttributeScore>,
    {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare("INSERT INTO data (attribute, value) VALUES (?1, ?2)")?;
            for score in scores {
                stmt.execute(params![score.attribute.as_str(), score.value])?;
                count += 1;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    /// Read the table back in row order. Rows naming unknown attributes are skipped.
    pub fn load(&self) -> Result<AnalyzeResult> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT attribute, value FROM data ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(name, value)| match name.parse::<Attribute>() {
                Ok(attribute) => Some((attribute, value)),
                Err(_) => {
                    debug!("Skipping unknown attribute row {}", name);
                    None
                }
            })
            .collect())
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM data", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Write `scores` to a fresh SQLite file at `path`, replacing any existing file
pub fn save_data(scores: &AnalyzeResult, path: &Path, sort: Option<SortOrder>) -> Result<()> {
    require_scores(scores)?;
    require_file_name(path)?;

    if path.exists() {
        std::fs::remove_file(path)?;
    }

    let db = ScoreDatabase::open(path)?;
    let written = match sort {
        Some(order) => db.insert_scores(scores.sorted(order).iter())?,
        None => db.insert_scores(scores.iter())?,
    };
    info!("Saved {} scores to {}", written, path.display());
    Ok(())
}

/// Read a file written by [`save_data`]
pub fn load_data(path: &Path) -> Result<AnalyzeResult> {
    require_file_name(path)?;
    if !path.exists() {
        return Err(PerspectiveError::FileSystem(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    ScoreDatabase::open(path)?.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> AnalyzeResult {
        [(Attribute::Toxicity, 42.0), (Attribute::Spam, 7.5), (Attribute::Insult, 88.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.sqlite3");
        save_data(&sample(), &path, None).unwrap();

        let loaded = load_data(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_save_recreates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.sqlite3");
        save_data(&sample(), &path, None).unwrap();
        save_data(&sample(), &path, Some(SortOrder::Descending)).unwrap();

        let db = ScoreDatabase::open(&path).unwrap();
        assert_eq!(db.count().unwrap(), 3);
        assert_eq!(
            db.load().unwrap().attributes(),
            vec![Attribute::Insult, Attribute::Toxicity, Attribute::Spam]
        );
    }

    #[test]
    fn test_stored_names_are_canonical() {
        let db = ScoreDatabase::in_memory().unwrap();
        db.insert_scores(sample().iter()).unwrap();
        let conn = db.lock_conn().unwrap();
        let name: String = conn
            .query_row("SELECT attribute FROM data ORDER BY rowid LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "TOXICITY");
    }

    #[test]
    fn test_empty_inputs() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            save_data(&AnalyzeResult::new(), &dir.path().join("x.db"), None),
            Err(PerspectiveError::EmptyResponse)
        ));
        assert!(matches!(
            save_data(&sample(), Path::new(""), None),
            Err(PerspectiveError::EmptyFileName)
        ));
        assert!(load_data(&dir.path().join("missing.db")).is_err());
    }
}

//! TursoStore - ProblemStore Implementation for libsql
//!
//! Holds the SQL for problems, tags and `problem_tags`, and converts
//! `libsql::Row`s into models.
//!
//! Timestamps are written as RFC 3339 UTC with millisecond precision. Rows
//! created by SQLite defaults (`YYYY-MM-DD HH:MM:SS`) are read as well.

use crate::db::problem_store::{ProblemStore, SaveOutcome};
use crate::db::{DatabaseError, DatabaseService};
use crate::models::{ContentFormat, Difficulty, ProblemRecord, ProblemView, ProblemWrite, Tag};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use libsql::{Connection, Row};
use std::collections::HashSet;
use std::sync::Arc;

const PROBLEM_COLUMNS: &str = "id, title, description, examples, requirements, theory, hints, \
     constraints, difficulty, runner_template, content_format, created_at, updated_at";

const TAG_COLUMNS: &str = "id, name, created_at, updated_at";

/// Current time at the precision timestamps are stored with
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// ProblemStore backed by a libsql database file
pub struct TursoStore {
    db: Arc<DatabaseService>,
}

impl TursoStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Parse a stored timestamp, RFC 3339 or SQLite `CURRENT_TIMESTAMP` format
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        Err(DatabaseError::corrupt_row(format!(
            "Unable to parse timestamp '{}' as RFC3339 or SQLite format",
            s
        )))
    }

    fn text(row: &Row, idx: i32, column: &str) -> Result<String, DatabaseError> {
        row.get::<String>(idx).map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to get {}: {}", column, e))
        })
    }

    fn optional_text(row: &Row, idx: i32, column: &str) -> Result<Option<String>, DatabaseError> {
        row.get::<Option<String>>(idx).map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to get {}: {}", column, e))
        })
    }

    /// Decode a JSON string array column; an empty value reads as no entries
    fn string_list(raw: &str, column: &str) -> Result<Vec<String>, DatabaseError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(raw).map_err(|e| {
            DatabaseError::corrupt_row(format!("Failed to parse {} JSON: {}", column, e))
        })
    }

    /// Convert a row selected with [`PROBLEM_COLUMNS`]
    fn row_to_problem(row: &Row) -> Result<ProblemRecord, DatabaseError> {
        let id = Self::text(row, 0, "id")?;
        let examples = Self::text(row, 3, "examples")?;
        let hints = Self::text(row, 6, "hints")?;
        let difficulty = Self::text(row, 8, "difficulty")?;
        let content_format = Self::optional_text(row, 10, "content_format")?;
        let created_at = Self::text(row, 11, "created_at")?;
        let updated_at = Self::text(row, 12, "updated_at")?;

        let difficulty: Difficulty = difficulty.parse().map_err(|e| {
            DatabaseError::corrupt_row(format!("Problem {} has {}", id, e))
        })?;

        Ok(ProblemRecord {
            title: Self::text(row, 1, "title")?,
            description: Self::text(row, 2, "description")?,
            examples: Self::string_list(&examples, "examples")?,
            requirements: Self::text(row, 4, "requirements")?,
            theory: Self::text(row, 5, "theory")?,
            hints: Self::string_list(&hints, "hints")?,
            constraints: Self::text(row, 7, "constraints")?,
            difficulty,
            runner_template: Self::text(row, 9, "runner_template")?,
            content_format: ContentFormat::from_column(content_format.as_deref()),
            created_at: Self::parse_timestamp(&created_at)?,
            updated_at: Self::parse_timestamp(&updated_at)?,
            id,
        })
    }

    /// Convert a row selected with [`TAG_COLUMNS`]
    fn row_to_tag(row: &Row) -> Result<Tag, DatabaseError> {
        Ok(Tag {
            id: Self::text(row, 0, "id")?,
            name: Self::text(row, 1, "name")?,
            created_at: Self::parse_timestamp(&Self::text(row, 2, "created_at")?)?,
            updated_at: Self::parse_timestamp(&Self::text(row, 3, "updated_at")?)?,
        })
    }

    async fn query_tags(
        conn: &Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
        context: &str,
    ) -> Result<Vec<Tag>, DatabaseError> {
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("{}: {}", context, e)))?;

        let mut tags = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("{}: {}", context, e)))?
        {
            tags.push(Self::row_to_tag(&row)?);
        }
        Ok(tags)
    }

    async fn problem_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
        let mut rows = conn
            .query("SELECT 1 FROM problems WHERE id = ?", [id])
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to check problem {}: {}", id, e))
            })?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn load_view(conn: &Connection, id: &str) -> Result<Option<ProblemView>, DatabaseError> {
        let mut rows = conn
            .query(
                &format!("SELECT {} FROM problems WHERE id = ?", PROBLEM_COLUMNS),
                [id],
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to execute get_problem query: {}", e))
            })?;

        let problem = match rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            Some(row) => Self::row_to_problem(&row)?,
            None => return Ok(None),
        };

        // Inner join: associations whose tag was deleted resolve to nothing
        let tags = Self::query_tags(
            conn,
            "SELECT t.id, t.name, t.created_at, t.updated_at
             FROM problem_tags pt
             JOIN tags t ON t.id = pt.tag_id
             WHERE pt.problem_id = ?
             ORDER BY t.name",
            [id],
            "Failed to fetch problem tags",
        )
        .await?;

        Ok(Some(ProblemView { problem, tags }))
    }

    /// Make the association set of `problem_id` equal `tag_ids`
    ///
    /// Only the difference is written: associations no longer submitted are
    /// deleted, newly submitted ones inserted. Duplicates in `tag_ids` are
    /// ignored.
    async fn reconcile_tags(
        conn: &Connection,
        problem_id: &str,
        tag_ids: &[String],
    ) -> Result<(), DatabaseError> {
        let mut rows = conn
            .query(
                "SELECT tag_id FROM problem_tags WHERE problem_id = ?",
                [problem_id],
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to load current tags: {}", e))
            })?;

        let mut current = HashSet::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            current.insert(Self::text(&row, 0, "tag_id")?);
        }

        let submitted: HashSet<&str> = tag_ids.iter().map(String::as_str).collect();

        for stale in current.iter().filter(|id| !submitted.contains(id.as_str())) {
            conn.execute(
                "DELETE FROM problem_tags WHERE problem_id = ? AND tag_id = ?",
                libsql::params![problem_id, stale.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::statement("Failed to remove problem tag", e))?;
        }

        let mut inserted = HashSet::new();
        for tag_id in tag_ids {
            if current.contains(tag_id) || !inserted.insert(tag_id.as_str()) {
                continue;
            }
            conn.execute(
                "INSERT INTO problem_tags (problem_id, tag_id) VALUES (?, ?)",
                libsql::params![problem_id, tag_id.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::statement("Failed to add problem tag", e))?;
        }

        Ok(())
    }

    /// Body of the save transaction; returns whether the problem was created
    async fn write_problem(conn: &Connection, write: &ProblemWrite) -> Result<bool, DatabaseError> {
        let exists = Self::problem_exists(conn, &write.id).await?;

        let examples = serde_json::to_string(&write.examples).map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to encode examples: {}", e))
        })?;
        let hints = serde_json::to_string(&write.hints).map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to encode hints: {}", e))
        })?;
        let now = format_timestamp(&timestamp_now());

        if exists {
            conn.execute(
                "UPDATE problems SET
                    title = ?, description = ?, examples = ?, requirements = ?, theory = ?,
                    hints = ?, constraints = ?, difficulty = ?, runner_template = ?,
                    content_format = ?, updated_at = ?
                 WHERE id = ?",
                libsql::params![
                    write.title.as_str(),
                    write.description.as_str(),
                    examples,
                    write.requirements.as_str(),
                    write.theory.as_str(),
                    hints,
                    write.constraints.as_str(),
                    write.difficulty.as_str(),
                    write.runner_template.as_str(),
                    ContentFormat::Markdown.as_str(),
                    now,
                    write.id.as_str(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::statement("Failed to update problem", e))?;
        } else {
            conn.execute(
                "INSERT INTO problems (id, title, description, examples, requirements, theory,
                    hints, constraints, difficulty, runner_template, content_format,
                    created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                libsql::params![
                    write.id.as_str(),
                    write.title.as_str(),
                    write.description.as_str(),
                    examples,
                    write.requirements.as_str(),
                    write.theory.as_str(),
                    hints,
                    write.constraints.as_str(),
                    write.difficulty.as_str(),
                    write.runner_template.as_str(),
                    ContentFormat::Markdown.as_str(),
                    now.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::statement("Failed to insert problem", e))?;
        }

        Self::reconcile_tags(conn, &write.id, &write.tag_ids).await?;

        Ok(!exists)
    }

    async fn begin(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute("BEGIN IMMEDIATE", ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e))
        })?;
        Ok(())
    }

    /// Commit when `result` is Ok, roll back otherwise
    async fn finish<T>(
        conn: &Connection,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                if let Err(e) = conn.execute("COMMIT", ()).await {
                    let _rollback = conn.execute("ROLLBACK", ()).await;
                    return Err(DatabaseError::sql_execution(format!(
                        "Failed to commit transaction: {}",
                        e
                    )));
                }
                Ok(value)
            }
            Err(e) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ProblemStore for TursoStore {
    async fn get_problem(&self, id: &str) -> Result<Option<ProblemView>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        Self::load_view(&conn, id).await
    }

    async fn save_problem(&self, write: &ProblemWrite) -> Result<SaveOutcome, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        Self::begin(&conn).await?;
        let result = Self::write_problem(&conn, write).await;
        let created = Self::finish(&conn, result).await?;

        let view = Self::load_view(&conn, &write.id).await?.ok_or_else(|| {
            DatabaseError::sql_execution(format!("Problem {} not found after save", write.id))
        })?;

        tracing::debug!(
            "Saved problem {} ({}, {} tags)",
            write.id,
            if created { "created" } else { "updated" },
            view.tags.len()
        );

        Ok(SaveOutcome { created, view })
    }

    async fn set_problem_tags(
        &self,
        problem_id: &str,
        tag_ids: &[String],
    ) -> Result<bool, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        Self::begin(&conn).await?;
        let result: Result<bool, DatabaseError> = async {
            if !Self::problem_exists(&conn, problem_id).await? {
                return Ok(false);
            }
            Self::reconcile_tags(&conn, problem_id, tag_ids).await?;
            Ok(true)
        }
        .await;
        Self::finish(&conn, result).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        Self::query_tags(
            &conn,
            &format!(
                "SELECT {} FROM tags ORDER BY created_at DESC, rowid DESC",
                TAG_COLUMNS
            ),
            (),
            "Failed to list tags",
        )
        .await
    }

    async fn get_tag(&self, id: &str) -> Result<Option<Tag>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let tags = Self::query_tags(
            &conn,
            &format!("SELECT {} FROM tags WHERE id = ?", TAG_COLUMNS),
            [id],
            "Failed to get tag",
        )
        .await?;
        Ok(tags.into_iter().next())
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let tags = Self::query_tags(
            &conn,
            &format!("SELECT {} FROM tags WHERE name = ?", TAG_COLUMNS),
            [name],
            "Failed to find tag by name",
        )
        .await?;
        Ok(tags.into_iter().next())
    }

    async fn insert_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO tags (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
            libsql::params![
                tag.id.as_str(),
                tag.name.as_str(),
                format_timestamp(&tag.created_at),
                format_timestamp(&tag.updated_at),
            ],
        )
        .await
        .map_err(|e| DatabaseError::statement("Failed to insert tag", e))?;
        Ok(())
    }

    async fn rename_tag(
        &self,
        id: &str,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Tag>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let changed = conn
            .execute(
                "UPDATE tags SET name = ?, updated_at = ? WHERE id = ?",
                libsql::params![name, format_timestamp(&updated_at), id],
            )
            .await
            .map_err(|e| DatabaseError::statement("Failed to rename tag", e))?;

        if changed == 0 {
            return Ok(None);
        }

        let tags = Self::query_tags(
            &conn,
            &format!("SELECT {} FROM tags WHERE id = ?", TAG_COLUMNS),
            [id],
            "Failed to get tag",
        )
        .await?;
        Ok(tags.into_iter().next())
    }

    async fn delete_tag(&self, id: &str) -> Result<bool, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let deleted = conn
            .execute("DELETE FROM tags WHERE id = ?", [id])
            .await
            .map_err(|e| DatabaseError::statement("Failed to delete tag", e))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (TursoStore, Arc<DatabaseService>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(
            DatabaseService::new(temp_dir.path().join("test.db"))
                .await
                .unwrap(),
        );
        (TursoStore::new(db.clone()), db, temp_dir)
    }

    fn write(id: &str, tag_ids: &[&str]) -> ProblemWrite {
        ProblemWrite {
            id: id.to_string(),
            title: "Title".to_string(),
            description: "## Task".to_string(),
            examples: vec!["1 + 1".to_string()],
            requirements: String::new(),
            theory: String::new(),
            hints: vec!["first".to_string(), "second".to_string()],
            constraints: String::new(),
            difficulty: Difficulty::Medium,
            runner_template: String::new(),
            tag_ids: tag_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    async fn tag(store: &TursoStore, id: &str, name: &str) {
        let now = timestamp_now();
        store
            .insert_tag(&Tag {
                id: id.to_string(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let sqlite = TursoStore::parse_timestamp("2024-03-01 12:30:00").unwrap();
        let rfc = TursoStore::parse_timestamp("2024-03-01T12:30:00.000Z").unwrap();
        assert_eq!(sqlite, rfc);
        assert!(TursoStore::parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_precision_round_trips() {
        let now = timestamp_now();
        assert_eq!(
            TursoStore::parse_timestamp(&format_timestamp(&now)).unwrap(),
            now
        );
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let (store, _db, _temp) = create_test_store().await;
        tag(&store, "t1", "Arrays").await;

        let outcome = store.save_problem(&write("two-sum", &["t1"])).await.unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.view.problem.examples, vec!["1 + 1"]);
        assert_eq!(outcome.view.problem.hints, vec!["first", "second"]);
        assert_eq!(
            outcome.view.problem.content_format,
            Some(ContentFormat::Markdown)
        );
        assert_eq!(outcome.view.tag_ids(), vec!["t1"]);

        let fetched = store.get_problem("two-sum").await.unwrap().unwrap();
        assert_eq!(fetched, outcome.view);
    }

    #[tokio::test]
    async fn test_second_save_updates() {
        let (store, _db, _temp) = create_test_store().await;

        let first = store.save_problem(&write("p", &[])).await.unwrap();
        let mut w = write("p", &[]);
        w.title = "Renamed".to_string();
        let second = store.save_problem(&w).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.view.problem.title, "Renamed");
        assert_eq!(
            second.view.problem.created_at,
            first.view.problem.created_at
        );
    }

    #[tokio::test]
    async fn test_orphaned_association_not_resolved() {
        let (store, db, _temp) = create_test_store().await;
        tag(&store, "t1", "Arrays").await;
        tag(&store, "t2", "Graphs").await;
        store.save_problem(&write("p", &["t1", "t2"])).await.unwrap();

        assert!(store.delete_tag("t2").await.unwrap());

        let view = store.get_problem("p").await.unwrap().unwrap();
        assert_eq!(view.tag_ids(), vec!["t1"]);

        // The association row itself survives the tag
        let conn = db.connect_with_timeout().await.unwrap();
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM problem_tags WHERE problem_id = 'p'",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_legacy_row_reads_untagged() {
        let (store, db, _temp) = create_test_store().await;
        let conn = db.connect_with_timeout().await.unwrap();
        conn.execute(
            "INSERT INTO problems (id, title, description, examples, hints)
             VALUES ('old', 'Old', '[{\"type\":\"p\",\"children\":[{\"text\":\"x\"}]}]', '', '[]')",
            (),
        )
        .await
        .unwrap();

        let view = store.get_problem("old").await.unwrap().unwrap();
        assert_eq!(view.problem.content_format, None);
        assert!(view.problem.examples.is_empty());
        assert_eq!(view.problem.difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn test_corrupt_examples_reported() {
        let (store, db, _temp) = create_test_store().await;
        let conn = db.connect_with_timeout().await.unwrap();
        conn.execute(
            "INSERT INTO problems (id, title, examples) VALUES ('bad', 'Bad', 'not json')",
            (),
        )
        .await
        .unwrap();

        let err = store.get_problem("bad").await.unwrap_err();
        assert!(matches!(err, DatabaseError::CorruptRow { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_tag_name_is_unique_violation() {
        let (store, _db, _temp) = create_test_store().await;
        tag(&store, "t1", "Graphs").await;

        let now = timestamp_now();
        let err = store
            .insert_tag(&Tag {
                id: "t2".to_string(),
                name: "Graphs".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_set_tags_unknown_problem() {
        let (store, _db, _temp) = create_test_store().await;
        assert!(!store
            .set_problem_tags("missing", &["t1".to_string()])
            .await
            .unwrap());
    }
}

//! SQLite-backed store client.
//!
//! One logical row store with the same tables the hosted backend exposes:
//! `profiles`, `tasks`, `focus_sessions`, `achievements`, plus a local `kv`
//! table for host state. Every read and write is scoped to the signed-in
//! user. Table existence is probed before use; a missing table is reported
//! as `SchemaMissing`, and list-style readers degrade it to an empty result
//! instead of failing.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::migrations;
use super::models::{
    format_color, format_priority, parse_color, parse_datetime_fallback, parse_priority,
    Achievement, FocusSession, Priority, Profile, Task, TaskColor,
};
use crate::error::{CoreError, StoreError};

const CURRENT_USER_KEY: &str = "current_user";

/// Fields of a task that may change after creation.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub priority: Option<Option<Priority>>,
    pub color: Option<Option<TaskColor>>,
}

pub struct StoreClient {
    conn: Connection,
}

fn read_err(e: rusqlite::Error) -> StoreError {
    StoreError::Read(e.to_string())
}

fn write_err(e: rusqlite::Error) -> StoreError {
    StoreError::Write(e.to_string())
}

fn parse_uuid_fallback(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or(Uuid::nil())
}

fn parse_tags(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let tags: String = row.get(4)?;
    let priority: Option<String> = row.get(5)?;
    let color: Option<String> = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok(Task {
        id: parse_uuid_fallback(&id),
        user_id: parse_uuid_fallback(&user_id),
        title: row.get(2)?,
        completed: row.get::<_, i64>(3)? != 0,
        tags: parse_tags(&tags),
        priority: parse_priority(priority.as_deref()),
        color: parse_color(color.as_deref()),
        created_at: parse_datetime_fallback(&created_at),
    })
}

fn row_to_session(row: &rusqlite::Row) -> Result<FocusSession, rusqlite::Error> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let created_at: String = row.get(3)?;
    Ok(FocusSession {
        id: parse_uuid_fallback(&id),
        user_id: parse_uuid_fallback(&user_id),
        duration_min: row.get(2)?,
        created_at: parse_datetime_fallback(&created_at),
    })
}

fn row_to_profile(row: &rusqlite::Row) -> Result<Profile, rusqlite::Error> {
    let id: String = row.get(0)?;
    let updated_at: String = row.get(3)?;
    Ok(Profile {
        id: parse_uuid_fallback(&id),
        email: row.get(1)?,
        full_name: row.get(2)?,
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

impl StoreClient {
    /// Open the store at `~/.config/focusnest/focusnest.db`, creating the
    /// schema if needed.
    pub fn open() -> Result<Self, CoreError> {
        let path = super::data_dir()?.join("focusnest.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path (tests use a temp dir).
    pub fn open_at(path: &std::path::Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        migrations::migrate(&conn)
            .map_err(|e| StoreError::Write(format!("migration failed: {e}")))?;
        Ok(Self { conn })
    }

    /// Open an in-memory store with the full schema.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Read(e.to_string()))?;
        migrations::migrate(&conn)
            .map_err(|e| StoreError::Write(format!("migration failed: {e}")))?;
        Ok(Self { conn })
    }

    /// Open an in-memory store with no schema at all. Exercises the
    /// degraded `SchemaMissing` paths.
    pub fn open_memory_bare() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Schema probing ───────────────────────────────────────────────

    pub fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .map_err(read_err)?;
        Ok(count > 0)
    }

    fn ensure_table(&self, table: &str) -> Result<(), StoreError> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(StoreError::SchemaMissing {
                table: table.to_string(),
            })
        }
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// Sign in as the profile with the given email, creating it if absent
    /// (full name defaults to the email's local part).
    pub fn sign_in(&self, email: &str) -> Result<Profile, StoreError> {
        let email = email.trim().to_lowercase();
        self.ensure_table("profiles")?;

        let existing = self
            .conn
            .query_row(
                "SELECT id, email, full_name, updated_at FROM profiles WHERE email = ?1",
                params![email],
                row_to_profile,
            )
            .optional()
            .map_err(read_err)?;

        let profile = match existing {
            Some(profile) => profile,
            None => {
                let profile = Profile {
                    id: Uuid::new_v4(),
                    full_name: email.split('@').next().map(str::to_string),
                    email: email.clone(),
                    updated_at: Utc::now(),
                };
                self.conn
                    .execute(
                        "INSERT INTO profiles (id, email, full_name, updated_at)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![
                            profile.id.to_string(),
                            profile.email,
                            profile.full_name,
                            profile.updated_at.to_rfc3339(),
                        ],
                    )
                    .map_err(write_err)?;
                profile
            }
        };

        self.kv_set(CURRENT_USER_KEY, &profile.id.to_string())?;
        Ok(profile)
    }

    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![CURRENT_USER_KEY])
            .map_err(write_err)?;
        Ok(())
    }

    /// The signed-in user id, or `NotAuthenticated`.
    pub fn current_user(&self) -> Result<Uuid, StoreError> {
        let id = self
            .kv_get(CURRENT_USER_KEY)?
            .and_then(|s| Uuid::parse_str(&s).ok());
        id.ok_or(StoreError::NotAuthenticated)
    }

    pub fn current_profile(&self) -> Result<Profile, StoreError> {
        let user = self.current_user()?;
        self.conn
            .query_row(
                "SELECT id, email, full_name, updated_at FROM profiles WHERE id = ?1",
                params![user.to_string()],
                row_to_profile,
            )
            .optional()
            .map_err(read_err)?
            .ok_or(StoreError::NotAuthenticated)
    }

    // ── Focus sessions ───────────────────────────────────────────────

    /// Insert one completed work session. The row is immutable afterwards.
    pub fn record_session(&self, duration_min: u32) -> Result<FocusSession, StoreError> {
        let user = self.current_user()?;
        self.ensure_table("focus_sessions")?;

        let session = FocusSession {
            id: Uuid::new_v4(),
            user_id: user,
            duration_min,
            created_at: Utc::now(),
        };
        self.conn
            .execute(
                "INSERT INTO focus_sessions (id, user_id, duration_min, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.id.to_string(),
                    session.user_id.to_string(),
                    session.duration_min,
                    session.created_at.to_rfc3339(),
                ],
            )
            .map_err(write_err)?;
        Ok(session)
    }

    /// Focus sessions created at or after `since`, for the given user.
    pub fn sessions_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<FocusSession>, StoreError> {
        self.ensure_table("focus_sessions")?;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, duration_min, created_at FROM focus_sessions
                 WHERE user_id = ?1 AND created_at >= ?2",
            )
            .map_err(read_err)?;
        let rows = stmt
            .query_map(
                params![user.to_string(), since.to_rfc3339()],
                row_to_session,
            )
            .map_err(read_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_err)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn create_task(
        &self,
        title: &str,
        tags: Vec<String>,
        priority: Option<Priority>,
        color: Option<TaskColor>,
    ) -> Result<Task, StoreError> {
        let user = self.current_user()?;
        self.ensure_table("tasks")?;

        let task = Task {
            id: Uuid::new_v4(),
            user_id: user,
            title: title.to_string(),
            completed: false,
            tags,
            priority,
            color,
            created_at: Utc::now(),
        };
        self.conn
            .execute(
                "INSERT INTO tasks (id, user_id, title, completed, tags, priority, color, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7)",
                params![
                    task.id.to_string(),
                    task.user_id.to_string(),
                    task.title,
                    serde_json::to_string(&task.tags).unwrap_or_else(|_| "[]".into()),
                    format_priority(task.priority),
                    format_color(task.color),
                    task.created_at.to_rfc3339(),
                ],
            )
            .map_err(write_err)?;
        Ok(task)
    }

    /// All of the user's tasks, newest first. Missing table degrades to an
    /// empty list so list views always render.
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let user = self.current_user()?;
        if !self.table_exists("tasks")? {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, title, completed, tags, priority, color, created_at
                 FROM tasks WHERE user_id = ?1 ORDER BY created_at DESC",
            )
            .map_err(read_err)?;
        let rows = stmt
            .query_map(params![user.to_string()], row_to_task)
            .map_err(read_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_err)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let user = self.current_user()?;
        self.ensure_table("tasks")?;
        self.conn
            .query_row(
                "SELECT id, user_id, title, completed, tags, priority, color, created_at
                 FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user.to_string()],
                row_to_task,
            )
            .optional()
            .map_err(read_err)
    }

    /// Apply the given updates to one of the user's tasks. Returns `None`
    /// if the task does not exist or belongs to someone else.
    pub fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Option<Task>, StoreError> {
        let Some(mut task) = self.get_task(id)? else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        if let Some(tags) = update.tags {
            task.tags = tags;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(color) = update.color {
            task.color = color;
        }

        self.conn
            .execute(
                "UPDATE tasks SET title = ?1, completed = ?2, tags = ?3, priority = ?4, color = ?5
                 WHERE id = ?6 AND user_id = ?7",
                params![
                    task.title,
                    task.completed as i64,
                    serde_json::to_string(&task.tags).unwrap_or_else(|_| "[]".into()),
                    format_priority(task.priority),
                    format_color(task.color),
                    task.id.to_string(),
                    task.user_id.to_string(),
                ],
            )
            .map_err(write_err)?;
        Ok(Some(task))
    }

    pub fn set_task_completed(&self, id: Uuid, completed: bool) -> Result<Option<Task>, StoreError> {
        self.update_task(
            id,
            TaskUpdate {
                completed: Some(completed),
                ..TaskUpdate::default()
            },
        )
    }

    /// Returns whether a row was deleted.
    pub fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let user = self.current_user()?;
        self.ensure_table("tasks")?;
        let n = self
            .conn
            .execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user.to_string()],
            )
            .map_err(write_err)?;
        Ok(n > 0)
    }

    /// Completed tasks created at or after `since`, for the given user.
    pub fn completed_tasks_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        self.ensure_table("tasks")?;
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, title, completed, tags, priority, color, created_at
                 FROM tasks WHERE user_id = ?1 AND completed = 1 AND created_at >= ?2",
            )
            .map_err(read_err)?;
        let rows = stmt
            .query_map(params![user.to_string(), since.to_rfc3339()], row_to_task)
            .map_err(read_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_err)
    }

    // ── Achievements ─────────────────────────────────────────────────

    /// The user's achievements. Missing table degrades to an empty list.
    pub fn list_achievements(&self) -> Result<Vec<Achievement>, StoreError> {
        let user = self.current_user()?;
        if !self.table_exists("achievements")? {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, name, description, icon, progress, target, completed, completed_at
                 FROM achievements WHERE user_id = ?1 ORDER BY name",
            )
            .map_err(read_err)?;
        let rows = stmt
            .query_map(params![user.to_string()], |row| {
                let id: String = row.get(0)?;
                let user_id: String = row.get(1)?;
                let completed_at: Option<String> = row.get(8)?;
                Ok(Achievement {
                    id: parse_uuid_fallback(&id),
                    user_id: parse_uuid_fallback(&user_id),
                    name: row.get(2)?,
                    description: row.get(3)?,
                    icon: row.get(4)?,
                    progress: row.get(5)?,
                    target: row.get(6)?,
                    completed: row.get::<_, i64>(7)? != 0,
                    completed_at: completed_at.as_deref().map(parse_datetime_fallback),
                })
            })
            .map_err(read_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_err)
    }

    // ── KV store ─────────────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(read_err)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in_store() -> StoreClient {
        let store = StoreClient::open_memory().unwrap();
        store.sign_in("pookie@example.com").unwrap();
        store
    }

    #[test]
    fn sign_in_creates_profile_from_email() {
        let store = StoreClient::open_memory().unwrap();
        let profile = store.sign_in("Ada@Example.com").unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.full_name.as_deref(), Some("ada"));
        assert_eq!(store.current_user().unwrap(), profile.id);

        // Second login resolves to the same row.
        let again = store.sign_in("ada@example.com").unwrap();
        assert_eq!(again.id, profile.id);
    }

    #[test]
    fn operations_require_identity() {
        let store = StoreClient::open_memory().unwrap();
        assert!(matches!(
            store.record_session(25),
            Err(StoreError::NotAuthenticated)
        ));
        store.sign_in("x@example.com").unwrap();
        store.sign_out().unwrap();
        assert!(matches!(
            store.list_tasks(),
            Err(StoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn record_and_query_sessions() {
        let store = signed_in_store();
        let session = store.record_session(25).unwrap();
        assert_eq!(session.duration_min, 25);

        let user = store.current_user().unwrap();
        let since = Utc::now() - chrono::Duration::days(7);
        let sessions = store.sessions_since(user, since).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session.id);
    }

    #[test]
    fn record_session_without_table_is_schema_missing() {
        let store = StoreClient::open_memory().unwrap();
        store.sign_in("x@example.com").unwrap();
        store
            .conn
            .execute_batch("DROP TABLE focus_sessions")
            .unwrap();
        match store.record_session(25) {
            Err(StoreError::SchemaMissing { table }) => assert_eq!(table, "focus_sessions"),
            other => panic!("expected SchemaMissing, got {other:?}"),
        }
    }

    #[test]
    fn task_crud_roundtrip() {
        let store = signed_in_store();
        let task = store
            .create_task(
                "Write report",
                vec!["work".into()],
                Some(Priority::High),
                Some(TaskColor::Pink),
            )
            .unwrap();
        assert!(!task.completed);

        let listed = store.list_tasks().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].tags, vec!["work"]);
        assert_eq!(listed[0].priority, Some(Priority::High));

        let done = store.set_task_completed(task.id, true).unwrap().unwrap();
        assert!(done.completed);

        assert!(store.delete_task(task.id).unwrap());
        assert!(store.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn tasks_are_scoped_to_the_user() {
        let store = StoreClient::open_memory().unwrap();
        store.sign_in("a@example.com").unwrap();
        let task = store.create_task("Mine", vec![], None, None).unwrap();

        store.sign_in("b@example.com").unwrap();
        assert!(store.list_tasks().unwrap().is_empty());
        assert!(store.get_task(task.id).unwrap().is_none());
        assert!(!store.delete_task(task.id).unwrap());
    }

    #[test]
    fn degraded_lists_on_missing_tables() {
        let store = StoreClient::open_memory_bare().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TABLE kv (key TEXT PRIMARY KEY, value TEXT NOT NULL);
                 CREATE TABLE profiles (
                     id TEXT PRIMARY KEY, email TEXT NOT NULL UNIQUE,
                     full_name TEXT, updated_at TEXT NOT NULL);",
            )
            .unwrap();
        store.sign_in("x@example.com").unwrap();
        assert!(store.list_tasks().unwrap().is_empty());
        assert!(store.list_achievements().unwrap().is_empty());
    }

    #[test]
    fn kv_store() {
        let store = StoreClient::open_memory().unwrap();
        assert!(store.kv_get("engine").unwrap().is_none());
        store.kv_set("engine", "{}").unwrap();
        assert_eq!(store.kv_get("engine").unwrap().unwrap(), "{}");
    }

    #[test]
    fn open_at_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusnest.db");
        {
            let store = StoreClient::open_at(&path).unwrap();
            store.sign_in("x@example.com").unwrap();
            store.record_session(50).unwrap();
        }
        let store = StoreClient::open_at(&path).unwrap();
        let user = store.current_user().unwrap();
        let sessions = store
            .sessions_since(user, Utc::now() - chrono::Duration::days(1))
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration_min, 50);
    }
}

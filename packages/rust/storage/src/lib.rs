//! libSQL storage for the flat user table.
//!
//! The [`Storage`] struct wraps a local libSQL database holding user
//! accounts; [`auth`] layers password hashing and the signup/login gate on
//! top of it. Comparison results are never stored here — the database
//! exists only so the CLI can gate pipeline runs behind a login.

pub mod auth;
mod migrations;

use std::path::Path;

use libsql::{Connection, Database, params};

use policydiff_shared::{PolicyDiffError, Result};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PolicyDiffError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| PolicyDiffError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| PolicyDiffError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        PolicyDiffError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // User operations
    // -----------------------------------------------------------------------

    /// Insert a new user record.
    pub async fn insert_user(&self, username: &str, password_hash: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO users (username, password_hash, created_at)
                 VALUES (?1, ?2, ?3)",
                params![username, password_hash, now.as_str()],
            )
            .await
            .map_err(|e| PolicyDiffError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get a user's stored password hash, if the user exists.
    pub async fn password_hash(&self, username: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT password_hash FROM users WHERE username = ?1",
                params![username],
            )
            .await
            .map_err(|e| PolicyDiffError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(
                row.get::<String>(0)
                    .map_err(|e| PolicyDiffError::Storage(e.to_string()))?,
            )),
            Ok(None) => Ok(None),
            Err(e) => Err(PolicyDiffError::Storage(e.to_string())),
        }
    }

    /// Check whether a username is already taken.
    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.password_hash(username).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("pd_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("pd_test_{}.db", Uuid::now_v7()));
        let s1 = Storage::open(&tmp).await.expect("first open");
        drop(s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn user_crud() {
        let storage = test_storage().await;

        assert!(!storage.user_exists("ana").await.expect("exists"));
        assert!(storage.password_hash("ana").await.expect("hash").is_none());

        storage
            .insert_user("ana", "$argon2id$stub")
            .await
            .expect("insert user");

        assert!(storage.user_exists("ana").await.expect("exists"));
        let hash = storage.password_hash("ana").await.expect("hash");
        assert_eq!(hash.as_deref(), Some("$argon2id$stub"));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let storage = test_storage().await;
        storage.insert_user("bo", "h1").await.expect("first insert");
        let result = storage.insert_user("bo", "h2").await;
        assert!(result.is_err());
    }
}

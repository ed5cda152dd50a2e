use crate::connection::Database;
use crate::error::{DbError, Result};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DbKvRecord {
    pub key: String,
    pub value: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Versioned whole-document access to the `kv_store` table.
pub struct KvQueries;

impl KvQueries {
    pub async fn get(db: &Database, key: &str) -> Result<Option<DbKvRecord>> {
        let pool = db.pool()?;

        sqlx::query_as::<_, DbKvRecord>("SELECT * FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await
            .map_err(DbError::Sqlx)
    }

    async fn current_version(db: &Database, key: &str) -> Result<Option<i64>> {
        let pool = db.pool()?;

        sqlx::query_scalar::<_, i64>("SELECT version FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await
            .map_err(DbError::Sqlx)
    }

    /// Insert a key that must not exist yet. Returns the new version.
    pub async fn insert(db: &Database, key: &str, value: &str) -> Result<i64> {
        let pool = db.pool()?;

        let result = sqlx::query(
            "INSERT INTO kv_store (key, value, version, updated_at) VALUES (?, ?, 1, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(1),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DbError::Conflict {
                key: key.to_string(),
                expected: None,
                actual: Self::current_version(db, key).await?,
            }),
            Err(e) => Err(DbError::Sqlx(e)),
        }
    }

    /// Overwrite a key only if it still carries `expected_version`.
    /// Returns the new version.
    pub async fn update(
        db: &Database,
        key: &str,
        value: &str,
        expected_version: i64,
    ) -> Result<i64> {
        let pool = db.pool()?;

        let result = sqlx::query(
            r#"
            UPDATE kv_store SET value = ?, version = version + 1, updated_at = ?
            WHERE key = ? AND version = ?
            "#,
        )
        .bind(value)
        .bind(Utc::now())
        .bind(key)
        .bind(expected_version)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            Err(DbError::Conflict {
                key: key.to_string(),
                expected: Some(expected_version),
                actual: Self::current_version(db, key).await?,
            })
        } else {
            Ok(expected_version + 1)
        }
    }

    pub async fn delete(db: &Database, key: &str) -> Result<bool> {
        let pool = db.pool()?;

        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?").bind(key).execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Unconditionally write several keys in one transaction.
    pub async fn replace_all(db: &Database, items: &[(String, String)]) -> Result<()> {
        let pool = db.pool()?;
        let now = Utc::now();

        let mut tx = pool.begin().await?;
        for (key, value) in items {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, version, updated_at) VALUES (?, ?, 1, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    version = kv_store.version + 1,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }
}

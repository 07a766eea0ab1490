// SQLite StateStore Implementation

use async_trait::async_trait;
use offload_core::domain::{JobId, JobState, StateRecord};
use offload_core::error::{AppError, Result};
use offload_core::port::{StateStore, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // Extract database-specific error code and message
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "5" => {
                        // SQLITE_BUSY - database is locked
                        AppError::Database(format!(
                            "Database locked (SQLITE_BUSY): {}",
                            db_err.message()
                        ))
                    }
                    "13" => {
                        // SQLITE_FULL - database or disk is full
                        AppError::Database(format!("Database full: {}", db_err.message()))
                    }
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => {
            // Connection, pool, protocol errors
            AppError::Database(err.to_string())
        }
    }
}

/// Durable StateStore over SQLite.
///
/// One row per job id; `put` is an upsert, so the table always reflects the
/// last write. WAL mode gives a single writer per key with concurrent
/// readers, which is all the store contract asks for.
pub struct SqliteStateStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteStateStore {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn put(&self, record: &StateRecord) -> Result<()> {
        let now = self.time_provider.now_millis();

        sqlx::query(
            r#"
            INSERT INTO state_records (message_id, job_type, state, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(message_id) DO UPDATE SET
                job_type = excluded.job_type,
                state = excluded.state,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.message_id)
        .bind(record.job_type)
        .bind(record.state.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Option<StateRecord>> {
        let row = sqlx::query_as::<_, StateRecordRow>(
            "SELECT message_id, job_type, state FROM state_records WHERE message_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|r| r.into_record()).transpose()
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct StateRecordRow {
    message_id: String,
    job_type: i64,
    state: String,
}

impl StateRecordRow {
    fn into_record(self) -> Result<StateRecord> {
        let state = JobState::parse(&self.state).ok_or_else(|| {
            AppError::Database(format!(
                "Corrupt state value {:?} for record {}",
                self.state, self.message_id
            ))
        })?;

        Ok(StateRecord {
            message_id: self.message_id,
            job_type: self.job_type,
            state,
        })
    }
}

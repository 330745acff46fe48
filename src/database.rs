use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::sync::OnceLock;

use crate::commands::HistoryEntry;
use crate::config;
use crate::errors::{AppError, AppResult};

pub static DB_POOL: OnceLock<Pool<Sqlite>> = OnceLock::new();

pub async fn init_database() -> AppResult<()> {
    let data_dir = config::get_data_directory()?;
    log::debug!("Database directory: {}", data_dir.display());

    let db_path = data_dir.join("UploadHistory.db");

    // SQLite refuses to connect to a missing file, so create it first
    if !db_path.exists() {
        log::info!("Database file doesn't exist, creating: {}", db_path.display());
        std::fs::File::create(&db_path)
            .map_err(|e| AppError::Config(format!("Cannot create database file: {}", e)))?;
    }

    let database_url = format!("sqlite:{}", db_path.display());
    log::debug!("Connecting to database: {}", database_url);

    let pool = SqlitePool::connect(&database_url).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS upload_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_name TEXT NOT NULL UNIQUE,
            public_url TEXT NOT NULL,
            deletion_token TEXT NOT NULL,
            display_name TEXT NOT NULL,
            file_size INTEGER,
            uploaded_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_upload_history_date ON upload_history(uploaded_at)")
        .execute(&pool)
        .await?;

    DB_POOL
        .set(pool)
        .map_err(|_| AppError::Internal("Failed to set database pool".to_string()))?;

    log::info!("Database initialized successfully");
    Ok(())
}

fn get_pool() -> AppResult<&'static Pool<Sqlite>> {
    DB_POOL
        .get()
        .ok_or_else(|| AppError::Internal("Database not initialized".to_string()))
}

pub async fn record_upload(
    file_name: &str,
    public_url: &str,
    deletion_token: &str,
    display_name: &str,
    file_size: Option<u64>,
) -> AppResult<()> {
    let pool = get_pool()?;

    // A re-upload of the same artifact replaces the old record
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO upload_history
        (file_name, public_url, deletion_token, display_name, file_size)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(file_name)
    .bind(public_url)
    .bind(deletion_token)
    .bind(display_name)
    .bind(file_size.map(|s| s as i64))
    .execute(pool)
    .await?;

    log::info!("Recorded upload: {}", file_name);
    Ok(())
}

pub async fn get_upload_history() -> AppResult<Vec<HistoryEntry>> {
    let pool = get_pool()?;

    let rows = sqlx::query(
        r#"
        SELECT id, file_name, public_url, deletion_token, display_name, file_size, uploaded_at
        FROM upload_history
        ORDER BY uploaded_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(HistoryEntry {
            id: row.get("id"),
            file_name: row.get("file_name"),
            public_url: row.get("public_url"),
            deletion_token: row.get("deletion_token"),
            display_name: row.get("display_name"),
            file_size: row.get("file_size"),
            uploaded_at: row.get("uploaded_at"),
        });
    }

    Ok(entries)
}

pub async fn get_history_entry(file_name: &str) -> AppResult<Option<HistoryEntry>> {
    let pool = get_pool()?;

    let row = sqlx::query(
        r#"
        SELECT id, file_name, public_url, deletion_token, display_name, file_size, uploaded_at
        FROM upload_history
        WHERE file_name = ?
        "#,
    )
    .bind(file_name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| HistoryEntry {
        id: row.get("id"),
        file_name: row.get("file_name"),
        public_url: row.get("public_url"),
        deletion_token: row.get("deletion_token"),
        display_name: row.get("display_name"),
        file_size: row.get("file_size"),
        uploaded_at: row.get("uploaded_at"),
    }))
}

pub async fn delete_history_entry(file_name: &str) -> AppResult<()> {
    let pool = get_pool()?;

    let result = sqlx::query("DELETE FROM upload_history WHERE file_name = ?")
        .bind(file_name)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(sqlx::Error::RowNotFound));
    }

    log::info!("Deleted history entry: {}", file_name);
    Ok(())
}

pub async fn get_expired_history(days: u32) -> AppResult<Vec<String>> {
    let pool = get_pool()?;

    let rows = sqlx::query(
        "SELECT file_name FROM upload_history WHERE uploaded_at < datetime('now', '-' || ? || ' days')",
    )
    .bind(days as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|row| row.get("file_name")).collect())
}

pub async fn cleanup_old_upload_history(days: u32) -> AppResult<u64> {
    let pool = get_pool()?;

    let result = sqlx::query(
        "DELETE FROM upload_history WHERE uploaded_at < datetime('now', '-' || ? || ' days')",
    )
    .bind(days as i64)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

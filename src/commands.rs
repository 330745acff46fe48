use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{safe_emit_event, AppResult, EventSender};
use crate::security::InputValidator;
use crate::uploader::nest_client::DELETE_ENDPOINT;
use crate::{config, history, uploader};

/// Events the upload and delete flows report back to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum UploadEvent {
    /// Upload finished and the artifact is reachable at `url`
    UploadOk { url: String },
    /// A deletion was attempted; reflects the launch, not the remote outcome
    DeleteOk,
    /// User-visible status text for any failure
    Status { message: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub file_name: String,
    pub public_url: String,
    pub deletion_token: String,
    pub display_name: String,
    pub file_size: Option<i64>,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub upload_client_secret: String,
    pub auto_cleanup_days: u32,
}

/// Validate the input and dispatch the upload flow. Returns as soon as the
/// request is in flight; completion arrives on the event channel.
pub fn upload_image(file_path: String, events: EventSender) -> AppResult<()> {
    InputValidator::validate_image_file(&file_path)?;

    tokio::spawn(uploader::process_upload(file_path, events));
    Ok(())
}

/// Open the provider's deletion URL via the host URL handler. The file name
/// is accepted for interface parity but unused; nest.rip deletes by token.
/// A delete-ok event is emitted regardless of whether the launch succeeded.
pub fn delete_image(file_name: &str, deletion_token: &str, events: &EventSender) -> AppResult<()> {
    let _ = file_name;
    InputValidator::validate_deletion_token(deletion_token)?;

    let url = format!("{}/{}", DELETE_ENDPOINT, deletion_token.trim());
    if let Err(e) = shell_open(&url) {
        log::warn!("Failed to open deletion URL {}: {}", url, e);
        safe_emit_event(
            events,
            UploadEvent::Status {
                message: "Unable to open the URL.".to_string(),
            },
        );
    }

    safe_emit_event(events, UploadEvent::DeleteOk);
    Ok(())
}

pub async fn get_history() -> AppResult<Vec<HistoryEntry>> {
    history::entries().await
}

pub async fn forget_upload(packed_name: &str) -> AppResult<()> {
    history::remove(packed_name).await
}

pub async fn cleanup_old_data(days: Option<u32>) -> AppResult<u64> {
    let days = match days {
        Some(days) => days,
        None => config::load_config()?.auto_cleanup_days,
    };

    let removed = history::cleanup_old(days).await?;
    log::info!("Cleanup removed {} history entries older than {} days", removed, days);
    Ok(removed)
}

pub fn get_app_config() -> AppResult<AppConfig> {
    config::load_config()
}

pub fn save_app_config(app_config: AppConfig) -> AppResult<()> {
    config::save_config(app_config)
}

pub fn shell_open(path: &str) -> AppResult<()> {
    use std::process::Command;

    #[cfg(target_os = "windows")]
    {
        Command::new("explorer").arg(path).spawn()?;
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(path).spawn()?;
    }

    Ok(())
}

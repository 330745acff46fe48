use std::fs;
use std::path::PathBuf;

use crate::commands::HistoryEntry;
use crate::config;
use crate::database;
use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;

/// Fixed literal identifying which hosting service produced a history record
pub const PROVIDER_TAG: &str = "nestrip";

const FILE_NAME_SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedFileName {
    pub provider_tag: String,
    pub deletion_token: String,
    pub display_name: String,
}

/// Pack (provider tag, deletion token, display name) into the single
/// filename the history store keys on
pub fn pack_file_name(provider_tag: &str, deletion_token: &str, display_name: &str) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        provider_tag,
        deletion_token,
        display_name,
        sep = FILE_NAME_SEPARATOR
    )
}

/// Inverse of [`pack_file_name`]. Splits at the first two separators only,
/// so the display name may itself contain the separator. Missing slices
/// come back empty.
pub fn unpack_file_name(packed: &str) -> UnpackedFileName {
    let mut parts = packed.splitn(3, FILE_NAME_SEPARATOR);

    UnpackedFileName {
        provider_tag: parts.next().unwrap_or_default().to_string(),
        deletion_token: parts.next().unwrap_or_default().to_string(),
        display_name: parts.next().unwrap_or_default().to_string(),
    }
}

fn history_file_path(packed_name: &str) -> AppResult<PathBuf> {
    let history_dir = config::get_history_directory()?;
    Ok(history_dir.join(InputValidator::sanitize_filename(packed_name)))
}

/// Persist the uploaded image bytes under the packed name and record the
/// upload in the history index
pub async fn save(
    image_bytes: &[u8],
    packed_name: &str,
    public_url: &str,
) -> AppResult<PathBuf> {
    let path = history_file_path(packed_name)?;
    fs::write(&path, image_bytes)?;
    log::debug!("Saved history image: {}", path.display());

    let unpacked = unpack_file_name(packed_name);
    let recorded = database::record_upload(
        packed_name,
        public_url,
        &unpacked.deletion_token,
        &unpacked.display_name,
        Some(image_bytes.len() as u64),
    )
    .await;

    // Either both halves of the record exist or neither does
    if let Err(e) = recorded {
        let _ = fs::remove_file(&path);
        return Err(e);
    }

    Ok(path)
}

/// Remove a local record: the stored image and its index row
pub async fn remove(packed_name: &str) -> AppResult<()> {
    let path = history_file_path(packed_name)?;

    if path.exists() {
        fs::remove_file(&path)?;
        log::debug!("Removed history image: {}", path.display());
    } else {
        log::warn!("History image not found on disk: {}", path.display());
    }

    database::delete_history_entry(packed_name).await
}

pub async fn entries() -> AppResult<Vec<HistoryEntry>> {
    database::get_upload_history().await
}

/// Drop records older than the cutoff, stored images included
pub async fn cleanup_old(days: u32) -> AppResult<u64> {
    let expired = database::get_expired_history(days).await?;

    for name in &expired {
        let path = history_file_path(name)?;
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Failed to remove old history image {}: {}", path.display(), e);
            }
        }
    }

    database::cleanup_old_upload_history(days).await
}

/// Resolve a deletion token from a packed history name, preferring the
/// index row over the name itself
pub async fn deletion_token_for(packed_name: &str) -> AppResult<String> {
    match database::get_history_entry(packed_name).await {
        Ok(Some(entry)) => return Ok(entry.deletion_token),
        Ok(None) => {}
        Err(e) => log::warn!("History lookup failed (non-critical): {}", e),
    }

    let unpacked = unpack_file_name(packed_name);
    if unpacked.provider_tag != PROVIDER_TAG || unpacked.deletion_token.is_empty() {
        return Err(AppError::validation(
            "name",
            "Not a nestrip history name and no matching history entry found",
        ));
    }

    Ok(unpacked.deletion_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_file_name() {
        assert_eq!(
            pack_file_name(PROVIDER_TAG, "tok789", "abc123.png"),
            "nestrip-tok789-abc123.png"
        );
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        let packed = pack_file_name(PROVIDER_TAG, "tok789", "abc123.png");
        let unpacked = unpack_file_name(&packed);

        assert_eq!(unpacked.provider_tag, PROVIDER_TAG);
        assert_eq!(unpacked.deletion_token, "tok789");
        assert_eq!(unpacked.display_name, "abc123.png");
    }

    #[test]
    fn test_unpack_display_name_may_contain_separator() {
        let packed = pack_file_name(PROVIDER_TAG, "tok789", "my-capture-1.png");
        let unpacked = unpack_file_name(&packed);

        assert_eq!(unpacked.deletion_token, "tok789");
        assert_eq!(unpacked.display_name, "my-capture-1.png");
    }

    #[test]
    fn test_unpack_missing_slices_are_empty() {
        let unpacked = unpack_file_name("nestrip");
        assert_eq!(unpacked.provider_tag, "nestrip");
        assert_eq!(unpacked.deletion_token, "");
        assert_eq!(unpacked.display_name, "");
    }

    #[test]
    fn test_packed_name_survives_sanitization() {
        let packed = pack_file_name(PROVIDER_TAG, "tok789", "abc123.png");
        assert_eq!(InputValidator::sanitize_filename(&packed), packed);
    }
}

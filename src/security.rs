use crate::errors::{AppError, AppResult};
use regex::Regex;
use std::path::Path;

pub struct InputValidator;

impl InputValidator {
    pub fn validate_file_path(path: &str) -> AppResult<()> {
        if path.trim().is_empty() {
            return Err(AppError::validation("file_path", "File path cannot be empty"));
        }

        let path_obj = Path::new(path);

        // Check for path traversal attempts
        if path.contains("..") || path.contains("~") {
            return Err(AppError::validation("file_path", "Invalid file path detected"));
        }

        // Ensure it's an image file
        if let Some(extension) = path_obj.extension() {
            let ext = extension.to_string_lossy().to_lowercase();
            if !matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp") {
                return Err(AppError::invalid_file_type(path));
            }
        } else {
            return Err(AppError::validation("file_path", "File must have an extension"));
        }

        // Check file exists and is readable
        if !path_obj.exists() {
            return Err(AppError::file_not_found(path));
        }

        if !path_obj.is_file() {
            return Err(AppError::validation("file_path", "Path is not a file"));
        }

        Ok(())
    }

    pub fn validate_image_file(file_path: &str) -> AppResult<()> {
        Self::validate_file_path(file_path)?;

        let metadata = std::fs::metadata(file_path)?;

        // Cap the payload before encoding it into memory
        const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(AppError::file_too_large(file_path));
        }

        Ok(())
    }

    /// The token ends up in a URL handed to the OS URL handler, so it must
    /// stay a plain path segment
    pub fn validate_deletion_token(token: &str) -> AppResult<()> {
        let trimmed = token.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("deletion_token", "Deletion token cannot be empty"));
        }

        if trimmed.len() > 128 {
            return Err(AppError::validation("deletion_token", "Deletion token too long"));
        }

        let safe_chars = Regex::new(r"^[a-zA-Z0-9._~-]+$").unwrap();
        if !safe_chars.is_match(trimmed) {
            return Err(AppError::validation(
                "deletion_token",
                "Deletion token contains invalid characters",
            ));
        }

        Ok(())
    }

    pub fn sanitize_filename(filename: &str) -> String {
        // Remove or replace unsafe characters in filenames
        let unsafe_chars = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
        let sanitized = unsafe_chars.replace_all(filename.trim(), "_");

        // Limit length
        if sanitized.len() > 255 {
            format!("{}...", &sanitized[..252])
        } else {
            sanitized.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_path_rejects_traversal() {
        assert!(InputValidator::validate_file_path("../../etc/passwd.png").is_err());
        assert!(InputValidator::validate_file_path("~/secret.png").is_err());
    }

    #[test]
    fn test_validate_file_path_rejects_non_image_extension() {
        let result = InputValidator::validate_file_path("/tmp/document.pdf");
        assert!(matches!(result, Err(AppError::InvalidFileType { .. })));
    }

    #[test]
    fn test_validate_file_path_rejects_missing_file() {
        let result = InputValidator::validate_file_path("definitely_does_not_exist.png");
        assert!(matches!(result, Err(AppError::FileNotFound { .. })));
    }

    #[test]
    fn test_validate_deletion_token() {
        assert!(InputValidator::validate_deletion_token("tok789").is_ok());
        assert!(InputValidator::validate_deletion_token("a-b_c.d~e").is_ok());
        assert!(InputValidator::validate_deletion_token("").is_err());
        assert!(InputValidator::validate_deletion_token("tok/../evil").is_err());
        assert!(InputValidator::validate_deletion_token("tok with spaces").is_err());
    }

    #[test]
    fn test_sanitize_filename_strips_unsafe_characters() {
        let sanitized = InputValidator::sanitize_filename("nestrip-tok<script>/name.png");
        assert!(!sanitized.contains('<'));
        assert!(!sanitized.contains('>'));
        assert!(!sanitized.contains('/'));
    }

    #[test]
    fn test_sanitize_filename_preserves_packed_names() {
        let packed = "nestrip-tok789-abc123.png";
        assert_eq!(InputValidator::sanitize_filename(packed), packed);
    }
}

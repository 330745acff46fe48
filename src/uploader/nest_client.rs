use crate::errors::{AppError, AppResult};
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::time::Duration;

pub const UPLOAD_ENDPOINT: &str = "https://nest.rip/api/files/upload";
pub const DELETE_ENDPOINT: &str = "https://nest.rip/api/files/delete";

/// nest.rip API client for the single-shot capture upload
pub struct NestClient {
    client: Client,
}

/// Consumed fields of the upload response. Anything missing decodes to an
/// empty string rather than an error.
#[derive(Debug, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "fileURL", default)]
    pub file_url: String,
    #[serde(rename = "deletionURL", default)]
    pub deletion_url: String,
}

#[derive(Debug, Clone)]
pub struct UploadResult {
    pub public_url: String,
    pub deletion_token: String,
    pub display_name: String,
}

impl UploadResult {
    pub fn from_response(response: UploadResponse) -> Self {
        let deletion_token = last_url_segment(&response.deletion_url).to_string();
        let display_name = last_url_segment(&response.file_url).to_string();

        Self {
            public_url: response.file_url,
            deletion_token,
            display_name,
        }
    }
}

impl NestClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap(),
        }
    }

    /// POST the PNG payload as multipart form data and derive the upload
    /// result from the JSON response
    pub async fn upload(&self, png_bytes: Vec<u8>, secret: &str) -> AppResult<UploadResult> {
        let part = multipart::Part::bytes(png_bytes)
            .file_name("image.png")
            .mime_str("image/png")?;
        let form = multipart::Form::new().part("files", part);

        let response = self
            .client
            .post(UPLOAD_ENDPOINT)
            .header("Authorization", secret)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UploadFailed {
                reason: format!("nest.rip API error {}: {}", status, error_text),
            });
        }

        let body = response.text().await?;
        Ok(UploadResult::from_response(parse_upload_response(&body)))
    }
}

impl Default for NestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the response body, degrading to empty fields on malformed JSON
pub fn parse_upload_response(body: &str) -> UploadResponse {
    match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Failed to parse upload response as JSON: {}", e);
            UploadResponse::default()
        }
    }
}

/// Substring after the last `/`, or the whole string if there is none
pub fn last_url_segment(url: &str) -> &str {
    match url.rfind('/') {
        Some(index) => &url[index + 1..],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_url_segment() {
        assert_eq!(
            last_url_segment("https://nest.rip/api/files/delete/tok789"),
            "tok789"
        );
        assert_eq!(last_url_segment("no-slashes-here"), "no-slashes-here");
        assert_eq!(last_url_segment("trailing/"), "");
        assert_eq!(last_url_segment(""), "");
    }

    #[test]
    fn test_parse_upload_response() {
        let body = r#"{"fileURL":"https://nest.rip/f/abc123.png","deletionURL":"https://nest.rip/api/files/delete/tok789"}"#;
        let response = parse_upload_response(body);

        assert_eq!(response.file_url, "https://nest.rip/f/abc123.png");
        assert_eq!(
            response.deletion_url,
            "https://nest.rip/api/files/delete/tok789"
        );
    }

    #[test]
    fn test_parse_upload_response_missing_fields() {
        let response = parse_upload_response(r#"{"unrelated": 1}"#);
        assert_eq!(response.file_url, "");
        assert_eq!(response.deletion_url, "");
    }

    #[test]
    fn test_parse_upload_response_malformed_body() {
        let response = parse_upload_response("<html>502 Bad Gateway</html>");
        assert_eq!(response.file_url, "");
        assert_eq!(response.deletion_url, "");
    }

    #[test]
    fn test_upload_result_derivation() {
        let response = UploadResponse {
            file_url: "https://nest.rip/f/abc123.png".to_string(),
            deletion_url: "https://nest.rip/api/files/delete/tok789".to_string(),
        };
        let result = UploadResult::from_response(response);

        assert_eq!(result.public_url, "https://nest.rip/f/abc123.png");
        assert_eq!(result.deletion_token, "tok789");
        assert_eq!(result.display_name, "abc123.png");
    }

    #[test]
    fn test_upload_result_without_slashes() {
        let response = UploadResponse {
            file_url: "abc123.png".to_string(),
            deletion_url: "tok789".to_string(),
        };
        let result = UploadResult::from_response(response);

        assert_eq!(result.deletion_token, "tok789");
        assert_eq!(result.display_name, "abc123.png");
    }
}

use crate::commands::UploadEvent;
use crate::errors::{safe_emit_event, EventSender};
use crate::{config, history, image_processor};

use super::nest_client::NestClient;

/// Run one capture upload end to end: encode, POST, record history, and
/// report the outcome on the event channel. Exactly one completion event
/// sequence is emitted per call.
pub async fn process_upload(file_path: String, events: EventSender) {
    let client = NestClient::new();

    let secret = match config::load_config() {
        Ok(config) => config.upload_client_secret,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            safe_emit_event(&events, UploadEvent::Status { message: e.to_string() });
            return;
        }
    };

    if secret.is_empty() {
        // Still sent; the server's rejection surfaces as a transport error
        log::warn!("Upload client secret is not configured");
    }

    if let Ok((width, height, file_size)) = image_processor::get_image_info(&file_path) {
        log::info!(
            "Uploading {} ({}x{}, {} bytes on disk)",
            file_path,
            width,
            height,
            file_size
        );
    }

    let png_bytes = match image_processor::encode_png_file(&file_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Failed to encode {} as PNG: {}", file_path, e);
            safe_emit_event(&events, UploadEvent::Status { message: e.to_string() });
            return;
        }
    };

    match client.upload(png_bytes.clone(), &secret).await {
        Ok(result) => {
            if result.public_url.is_empty() {
                log::warn!("Upload response did not contain a file URL");
                safe_emit_event(
                    &events,
                    UploadEvent::Status {
                        message: "Upload response did not contain a file URL".to_string(),
                    },
                );
                return;
            }

            let packed_name = history::pack_file_name(
                history::PROVIDER_TAG,
                &result.deletion_token,
                &result.display_name,
            );

            // The upload itself succeeded; failing to record it locally is
            // not a reason to report failure
            if let Err(e) = history::save(&png_bytes, &packed_name, &result.public_url).await {
                log::warn!("Failed to record upload history (non-critical): {}", e);
            }

            log::info!("Upload complete: {}", result.public_url);
            safe_emit_event(
                &events,
                UploadEvent::UploadOk {
                    url: result.public_url,
                },
            );
        }
        Err(e) => {
            log::error!("Upload failed: {}", e);
            safe_emit_event(&events, UploadEvent::Status { message: e.to_string() });
        }
    }
}

// Main uploader module - the nest.rip client and the async upload flow
//
// This module is responsible for pushing captured images to nest.rip

pub mod nest_client;
pub mod upload_task;

pub use nest_client::{NestClient, UploadResult};
pub use upload_task::process_upload;

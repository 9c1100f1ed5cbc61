//! Request client for the detection endpoint.

use super::types::DetectionResult;
use crate::config::ApiConfig;
use crate::error::ClientError;
use log::debug;
use reqwest::multipart::{Form, Part};

/// Header carrying the object count alongside the binary body.
pub const OBJECT_COUNT_HEADER: &str = "x-object-count";

#[derive(Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl DetectionClient {
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Upload one image and await the annotated result plus count.
    ///
    /// The payload must be non-empty; nothing else is validated
    /// client-side, the detection service owns the image semantics.
    pub async fn detect(
        &self,
        file_name: &str,
        payload: Vec<u8>,
    ) -> Result<DetectionResult, ClientError> {
        if payload.is_empty() {
            return Err(ClientError::EmptyUpload);
        }

        let url = self.config.endpoint("/detect");
        debug!("uploading {} ({} bytes) to {url}", file_name, payload.len());

        let part = Part::bytes(payload)
            .file_name(file_name.to_string())
            .mime_str(guess_image_mime(file_name))
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        // Count travels out-of-band; read it before consuming the body.
        let object_count = response
            .headers()
            .get(OBJECT_COUNT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or(ClientError::MissingCount)?;

        let annotated_image = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .to_vec();

        Ok(DetectionResult {
            annotated_image,
            object_count,
        })
    }
}

fn guess_image_mime(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next().map(|ext| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "webp" => "image/webp",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_payload_is_rejected_before_any_io() {
        let client = DetectionClient::new(ApiConfig::new("http://localhost:1"))
            .expect("client builds");
        let err = client.detect("shelf.jpg", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyUpload));
    }

    #[test]
    fn mime_guess_follows_the_extension() {
        assert_eq!(guess_image_mime("shelf.PNG"), "image/png");
        assert_eq!(guess_image_mime("shelf.jpeg"), "image/jpeg");
        assert_eq!(guess_image_mime("no-extension"), "image/jpeg");
    }
}

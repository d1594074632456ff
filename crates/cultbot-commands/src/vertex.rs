//! Vertex AI Imagen client.
//!
//! Uses the REST `:predict` endpoint with a pre-issued OAuth access token.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cultbot_core::{BotError, Result};
use serde::Deserialize;
use tracing::debug;

/// Imagen model used for generation.
pub const IMAGEN_MODEL: &str = "imagen-3.0-generate-001";

/// What the image model produced for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    /// Decoded image bytes.
    Image(Vec<u8>),
    /// The model returned no predictions (often a filtered prompt).
    NoPredictions,
    /// A prediction came back without image bytes.
    NoImageData,
}

/// A model that turns a prompt into an image.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

/// Decode a `:predict` response body.
pub fn parse_prediction(body: &str) -> Result<GeneratedImage> {
    let response: PredictResponse = serde_json::from_str(body)?;
    let Some(first) = response.predictions.into_iter().next() else {
        return Ok(GeneratedImage::NoPredictions);
    };
    let Some(encoded) = first.bytes_base64_encoded.filter(|s| !s.is_empty()) else {
        return Ok(GeneratedImage::NoImageData);
    };

    STANDARD
        .decode(encoded.as_bytes())
        .map(GeneratedImage::Image)
        .map_err(|e| BotError::UpstreamFormat(format!("invalid image data: {}", e)))
}

/// Client for Imagen on Vertex AI.
pub struct ImagenClient {
    client: reqwest::Client,
    project_id: String,
    location: String,
    access_token: String,
    timeout: Duration,
}

impl ImagenClient {
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            project_id: project_id.into(),
            location: location.into(),
            access_token: access_token.into(),
            timeout,
        }
    }

    /// Regional `:predict` URL for the Imagen model.
    pub fn endpoint(&self) -> String {
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{project}/locations/{loc}/publishers/google/models/{model}:predict",
            loc = self.location,
            project = self.project_id,
            model = IMAGEN_MODEL,
        )
    }
}

#[async_trait]
impl ImageModel for ImagenClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let request_body = serde_json::json!({
            "instances": [{"prompt": prompt}],
            "parameters": {"sampleCount": 1, "aspectRatio": "1:1"}
        });

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(%status, body = %body, "Vertex AI returned error status");
            return Err(BotError::Transport(format!("Vertex AI returned {}", status)));
        }

        parse_prediction(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image() {
        let body = r#"{"predictions": [{"bytesBase64Encoded": "iVBORw==", "mimeType": "image/png"}]}"#;
        assert_eq!(
            parse_prediction(body).unwrap(),
            GeneratedImage::Image(vec![0x89, b'P', b'N', b'G'])
        );
    }

    #[test]
    fn test_parse_no_predictions() {
        assert_eq!(parse_prediction("{}").unwrap(), GeneratedImage::NoPredictions);
        assert_eq!(
            parse_prediction(r#"{"predictions": []}"#).unwrap(),
            GeneratedImage::NoPredictions
        );
    }

    #[test]
    fn test_parse_missing_bytes() {
        let body = r#"{"predictions": [{"raiFilteredReason": "blocked"}]}"#;
        assert_eq!(parse_prediction(body).unwrap(), GeneratedImage::NoImageData);
    }

    #[test]
    fn test_parse_bad_base64() {
        let body = r#"{"predictions": [{"bytesBase64Encoded": "***"}]}"#;
        assert!(matches!(parse_prediction(body), Err(BotError::UpstreamFormat(_))));
    }

    #[test]
    fn test_endpoint() {
        let client = ImagenClient::new("my-proj", "us-central1", "token", Duration::from_secs(1));
        assert_eq!(
            client.endpoint(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-proj/locations/us-central1/publishers/google/models/imagen-3.0-generate-001:predict"
        );
    }
}

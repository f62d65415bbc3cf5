use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Media category of an acquired asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A locally held media file selected for recognition.
///
/// Produced by an acquirer, consumed by compression and encoding, then
/// discarded. Never persisted.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub local_path: PathBuf,
    pub kind: MediaKind,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// A MIME-tagged, base64-encoded data URI ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn new(mime_type: &str, base64_body: &str) -> Self {
        Self(format!("data:{mime_type};base64,{base64_body}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of a POST to the inference endpoint.
///
/// Exactly one of `image`/`video` is set; the constructors are the only
/// way to build one, so a well-formed request carries a single payload.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EncodedPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<EncodedPayload>,
}

impl RecognitionRequest {
    /// Request carrying a single still image.
    pub fn image(payload: EncodedPayload) -> Self {
        Self {
            image: Some(payload),
            video: None,
        }
    }

    /// Request carrying a single video clip.
    pub fn video(payload: EncodedPayload) -> Self {
        Self {
            image: None,
            video: Some(payload),
        }
    }
}

/// One recognized face as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// `[x1, y1, x2, y2]` in source-image pixel coordinates.
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
    /// Expression label in the service's vocabulary (e.g. "Happy").
    pub expression: String,
    /// Classification confidence in `[0, 1]`; absent means 0.
    #[serde(default)]
    pub confidence: f32,
}

/// Response body from the inference endpoint.
///
/// When `success` is false, `faces` carries no meaning and is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub faces: Option<Vec<FaceDetection>>,
    /// Server-echoed annotated image (base64 body), when present.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

//! emotisync-core — Data model for the EmotiSync recognition client.
//!
//! Pure types and functions only: media assets, the wire request/response
//! shapes consumed from the inference service, the expression display
//! mapping, and the per-face result processor. No I/O happens here.

pub mod emotion;
pub mod processor;
pub mod types;

pub use types::{
    EncodedPayload, FaceDetection, MediaAsset, MediaKind, RecognitionRequest, RecognitionResponse,
};

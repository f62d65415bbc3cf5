//! File-to-payload encoding: full read, base64, MIME-tagged data URI.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use emotisync_core::{EncodedPayload, MediaAsset};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read the asset's bytes and produce a MIME-tagged data URI.
///
/// Fails when the file cannot be read (e.g. removed between selection and
/// encoding); the failure is reported to the user, never retried.
pub async fn encode(asset: &MediaAsset, mime_type: &str) -> Result<EncodedPayload, EncodeError> {
    let bytes = tokio::fs::read(&asset.local_path)
        .await
        .map_err(|source| EncodeError::Unreadable {
            path: asset.local_path.display().to_string(),
            source,
        })?;

    let body = STANDARD.encode(&bytes);
    tracing::debug!(
        raw_bytes = bytes.len(),
        encoded_chars = body.len(),
        mime = mime_type,
        "asset encoded"
    );

    Ok(EncodedPayload::new(mime_type, &body))
}

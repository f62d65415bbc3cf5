//! Lossy image compression before upload.
//!
//! Compression failure is non-fatal: the pipeline always proceeds with
//! the original file rather than aborting the whole flow.

use emotisync_core::{MediaAsset, MediaKind};
use image::codecs::jpeg::JpegEncoder;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// JPEG quality target for pre-upload compression (~80% of original).
const JPEG_QUALITY: u8 = 80;

/// Re-encode an image asset as JPEG at the target quality.
///
/// On any failure the original asset is returned unchanged, retagged as
/// `image/png` so the downstream MIME tag stays consistent with the
/// untouched bytes. Video assets pass through untouched.
pub fn compress(asset: MediaAsset) -> MediaAsset {
    if asset.kind != MediaKind::Image {
        return asset;
    }

    match try_compress(&asset) {
        Ok(compressed) => {
            tracing::info!(
                original_bytes = asset.size_bytes,
                compressed_bytes = compressed.size_bytes,
                path = %compressed.local_path.display(),
                "image compressed"
            );
            compressed
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %asset.local_path.display(),
                "compression failed, sending original as image/png"
            );
            MediaAsset {
                mime_type: "image/png".to_string(),
                ..asset
            }
        }
    }
}

fn try_compress(asset: &MediaAsset) -> Result<MediaAsset, image::ImageError> {
    let source = image::open(&asset.local_path)?;

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = source.to_rgb8();

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode_image(&rgb)?;

    let out_path = scratch_path();
    std::fs::write(&out_path, &encoded)?;

    Ok(MediaAsset {
        local_path: out_path,
        kind: MediaKind::Image,
        size_bytes: encoded.len() as u64,
        mime_type: "image/jpeg".to_string(),
    })
}

fn scratch_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("emotisync-{}-{nanos}.jpg", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::Path;

    fn write_test_png(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("emotisync-compress-{}-{name}.png", std::process::id()));
        let mut img = RgbImage::new(64, 64);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([200, 120, 40]);
        }
        img.save(&path).unwrap();
        path
    }

    fn asset_for(path: &Path, kind: MediaKind, mime: &str) -> MediaAsset {
        let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        MediaAsset {
            local_path: path.to_path_buf(),
            kind,
            size_bytes,
            mime_type: mime.to_string(),
        }
    }

    #[test]
    fn test_compress_reencodes_as_jpeg() {
        let path = write_test_png("ok");
        let asset = asset_for(&path, MediaKind::Image, "image/png");

        let compressed = compress(asset);

        assert_eq!(compressed.mime_type, "image/jpeg");
        assert_ne!(compressed.local_path, path);
        assert!(compressed.local_path.exists());
        assert!(compressed.size_bytes > 0);

        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(compressed.local_path);
    }

    #[test]
    fn test_compress_failure_falls_back_to_original_as_png() {
        let path = std::env::temp_dir().join(format!("emotisync-compress-bad-{}.jpg", std::process::id()));
        std::fs::write(&path, b"definitely not an image").unwrap();
        let asset = asset_for(&path, MediaKind::Image, "image/jpeg");

        let result = compress(asset);

        // Fallback keeps the original file and retags it as image/png.
        assert_eq!(result.local_path, path);
        assert_eq!(result.mime_type, "image/png");
        assert_eq!(result.size_bytes, 23);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_video_bypasses_compression() {
        let asset = MediaAsset {
            local_path: PathBuf::from("/tmp/clip.mp4"),
            kind: MediaKind::Video,
            size_bytes: 1024,
            mime_type: "video/mp4".to_string(),
        };

        let result = compress(asset.clone());
        assert_eq!(result.local_path, asset.local_path);
        assert_eq!(result.mime_type, "video/mp4");
        assert_eq!(result.size_bytes, 1024);
    }
}

//! Overlay rendering — the source image plus color-coded detection boxes.

use emotisync_core::{emotion, FaceDetection};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use std::path::Path;
use thiserror::Error;

/// Stroke width of a detection rectangle, in canvas pixels.
const BOX_STROKE_WIDTH: i32 = 2;
/// Gap between the box's top edge and the label baseline.
const LABEL_OFFSET_Y: i32 = 5;
/// Label text height in canvas pixels.
const LABEL_SCALE: f32 = 14.0;

/// Fixed drawing surface the preview occupies.
///
/// Computed once at startup from configuration and passed in explicitly;
/// nothing here reads global device state.
#[derive(Clone)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    /// TTF font for labels. Boxes are still drawn without one.
    font: Option<Font<'static>>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font: None,
        }
    }

    /// Attach a label font loaded from a TTF file. Missing or unparsable
    /// fonts degrade to box-only rendering.
    pub fn with_font_file(mut self, path: &Path) -> Self {
        self.font = std::fs::read(path).ok().and_then(Font::try_from_vec);
        if self.font.is_none() {
            tracing::warn!(path = %path.display(), "label font unavailable, drawing boxes only");
        }
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to load {path}: {source}")]
    ImageUnreadable {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Draw the source image at the canvas footprint, then one stroked
/// rectangle and label per detection, in detection order.
///
/// Box coordinates are used as-is in canvas space; no rescaling from the
/// source resolution is performed. This mirrors the service contract as
/// observed and is a known fidelity limit for sources larger than the
/// canvas.
pub fn render(
    image_path: &Path,
    detections: &[FaceDetection],
    canvas: &Canvas,
) -> Result<RgbImage, RenderError> {
    let source = image::open(image_path).map_err(|source| RenderError::ImageUnreadable {
        path: image_path.display().to_string(),
        source,
    })?;

    let mut surface = source
        .resize_exact(canvas.width, canvas.height, FilterType::Triangle)
        .to_rgb8();

    for detection in detections {
        let display = emotion::display_for(&detection.expression);
        let color = Rgb(display.color);

        draw_box(&mut surface, detection.bbox, color);

        if let Some(font) = &canvas.font {
            let x = detection.bbox[0] as i32;
            let y = (detection.bbox[1] as i32 - LABEL_OFFSET_Y - LABEL_SCALE as i32).max(0);
            draw_text_mut(
                &mut surface,
                color,
                x,
                y,
                Scale::uniform(LABEL_SCALE),
                font,
                &display.label,
            );
        }
    }

    tracing::debug!(
        detections = detections.len(),
        width = canvas.width,
        height = canvas.height,
        "overlay rendered"
    );
    Ok(surface)
}

/// Stroke a `[x1, y1, x2, y2]` box as nested hollow rectangles.
fn draw_box(surface: &mut RgbImage, bbox: [f32; 4], color: Rgb<u8>) {
    let [x1, y1, x2, y2] = bbox;
    let width = (x2 - x1).max(1.0) as u32;
    let height = (y2 - y1).max(1.0) as u32;

    for inset in 0..BOX_STROKE_WIDTH {
        let shrink = (inset * 2) as u32;
        let rect = Rect::at(x1 as i32 + inset, y1 as i32 + inset).of_size(
            width.saturating_sub(shrink).max(1),
            height.saturating_sub(shrink).max(1),
        );
        draw_hollow_rect_mut(surface, rect, color);
    }
}

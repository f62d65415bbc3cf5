//! emotisync-media — Device-facing media layer.
//!
//! Acquisition behind a picker seam, lossy pre-upload compression,
//! base64 data-URI encoding, and overlay rendering onto a fixed canvas
//! footprint.

pub mod acquire;
pub mod compress;
pub mod encode;
pub mod overlay;

pub use acquire::{AcquireError, FileAcquirer, MediaAcquirer, MediaSource};
pub use encode::{encode, EncodeError};
pub use overlay::{Canvas, RenderError};

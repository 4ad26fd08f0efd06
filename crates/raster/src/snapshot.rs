//! PNG output of a [`RasterSurface`].
//!
//! Feature-gated behind `png` (default on) so the `image` crate stays out of
//! builds that only need the in-memory surface.

use dot_reveal_core::error::EngineError;
use std::path::Path;

use crate::RasterSurface;

/// Writes the surface's backing buffer as an RGBA PNG.
///
/// Returns `EngineError::InvalidDimensions` for an empty surface (nothing to
/// encode), or `EngineError::Io` on write failure.
pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), EngineError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(EngineError::InvalidDimensions(
            "cannot write a PNG of a zero-area surface".into(),
        ));
    }
    let img = image::RgbaImage::from_raw(surface.width(), surface.height(), surface.data().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    log::info!(
        "wrote {}x{} snapshot to {}",
        surface.width(),
        surface.height(),
        path.display()
    );
    Ok(())
}

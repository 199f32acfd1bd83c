//! Auto-rotation of sideways card scans.
//!
//! ID and insurance cards are landscape. A scan that comes out clearly
//! portrait (height more than 1.2× the width) is almost always a card placed
//! sideways on the scanner, so it is turned back to landscape before the
//! model sees it. Nearly-square images are left alone.

use image::DynamicImage;
use tracing::debug;

/// Height-to-width ratio above which an image counts as portrait.
pub const PORTRAIT_MARGIN: f64 = 1.2;

pub fn needs_auto_rotation(width: u32, height: u32) -> bool {
    f64::from(height) > f64::from(width) * PORTRAIT_MARGIN
}

/// Rotate a portrait image 90° counter-clockwise; return others unchanged.
pub fn auto_rotate(image: DynamicImage) -> DynamicImage {
    if needs_auto_rotation(image.width(), image.height()) {
        debug!(
            "Auto-rotating portrait image {}x{} to landscape",
            image.width(),
            image.height()
        );
        image.rotate270()
    } else {
        image
    }
}

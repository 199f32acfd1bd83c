//! Source decoding: rasterise the first PDF page via pdfium, or decode a
//! JPEG/PNG and apply its EXIF orientation.
//!
//! Everything here is blocking and CPU-bound; callers run it inside
//! `tokio::task::spawn_blocking` (see [`crate::pipeline::normalize`]).
//! pdfium wraps a C++ library with thread-local state and must never run on
//! a Tokio worker thread.

use crate::error::SkillError;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bind to pdfium: `PDFIUM_LIB_PATH` (file or directory) first, then the
/// system library.
pub fn bind_pdfium() -> Result<Pdfium, SkillError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let p = PathBuf::from(p);
            let lib = if p.is_dir() {
                p.join(Pdfium::pdfium_platform_library_name())
            } else {
                p
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib).map_err(|e| {
                SkillError::PdfiumBindingFailed(format!("{}: {:?}", lib.display(), e))
            })?
        }
        _ => Pdfium::bind_to_system_library()
            .map_err(|e| SkillError::PdfiumBindingFailed(format!("{:?}", e)))?,
    };
    Ok(Pdfium::new(bindings))
}

/// Rasterise the first page of a PDF. Later pages are never touched.
///
/// `max_pixels` caps the longest edge so an oversized page cannot exhaust
/// memory.
pub fn render_first_page(pdf_path: &Path, max_pixels: u32) -> Result<DynamicImage, SkillError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| SkillError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(SkillError::EmptyPdf {
            path: pdf_path.to_path_buf(),
        });
    }
    if total_pages > 1 {
        info!("PDF has {} pages; only the first is used", total_pages);
    }

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let page = pages.get(0).map_err(|e| SkillError::RasterisationFailed {
        path: pdf_path.to_path_buf(),
        detail: format!("{:?}", e),
    })?;

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| SkillError::RasterisationFailed {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered first page → {}x{} px",
        image.width(),
        image.height()
    );

    Ok(image)
}

/// Decode a JPEG or PNG and rotate/flip the pixels so that the stored
/// orientation matches the displayed one.
pub fn decode_raster(path: &Path) -> Result<DynamicImage, SkillError> {
    let decode_err = |detail: String| SkillError::ImageDecode {
        path: path.to_path_buf(),
        detail,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?;
    let mut decoder = reader.into_decoder().map_err(|e| decode_err(e.to_string()))?;

    let orientation = decoder.orientation().unwrap_or_else(|e| {
        warn!(
            "Ignoring unreadable orientation metadata in {}: {}",
            path.display(),
            e
        );
        Orientation::NoTransforms
    });

    let mut image = DynamicImage::from_decoder(decoder).map_err(|e| decode_err(e.to_string()))?;
    if orientation != Orientation::NoTransforms {
        debug!("Applying EXIF orientation {:?}", orientation);
    }
    image.apply_orientation(orientation);

    Ok(image)
}

/// Write a `w`×`h` PNG carrying an eXIf chunk with the given orientation
/// tag. Pixel (0, 0) is red, everything else white.
#[cfg(test)]
pub(crate) fn write_oriented_png(path: &Path, w: u32, h: u32, orientation: u8) {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

    let mut img = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));
    img.put_pixel(0, 0, Rgb([255, 0, 0]));

    // Big-endian TIFF header, one IFD entry: 0x0112 Orientation, SHORT, 1.
    let exif = vec![
        b'M', b'M', 0, 42, 0, 0, 0, 8, // header, IFD at offset 8
        0, 1, // entry count
        0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, orientation, 0, 0, // orientation entry
        0, 0, 0, 0, // no next IFD
    ];

    let file = std::fs::File::create(path).unwrap();
    let mut encoder = PngEncoder::new(file);
    encoder.set_exif_metadata(exif).unwrap();
    encoder
        .write_image(img.as_raw(), w, h, ExtendedColorType::Rgb8)
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn decode_png_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        RgbImage::from_pixel(30, 20, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let img = decode_raster(&path).unwrap();
        assert_eq!((img.width(), img.height()), (30, 20));
    }

    #[test]
    fn decode_detects_format_from_content() {
        // PNG bytes behind a .jpg name still decode.
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("card.png");
        RgbImage::from_pixel(8, 4, Rgb([0, 0, 0])).save(&png).unwrap();
        let misnamed = dir.path().join("card.jpg");
        std::fs::copy(&png, &misnamed).unwrap();

        let img = decode_raster(&misnamed).unwrap();
        assert_eq!((img.width(), img.height()), (8, 4));
    }

    #[test]
    fn exif_rotate_90_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phone.png");
        write_oriented_png(&path, 40, 20, 6);

        let img = decode_raster(&path).unwrap().to_rgb8();
        assert_eq!((img.width(), img.height()), (20, 40));
        // stored top-left ends up top-right after a clockwise quarter turn
        assert_eq!(img.get_pixel(19, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn exif_identity_orientation_leaves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        write_oriented_png(&path, 40, 20, 1);

        let img = decode_raster(&path).unwrap().to_rgb8();
        assert_eq!((img.width(), img.height()), (40, 20));
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn decode_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = decode_raster(&path).unwrap_err();
        assert!(matches!(err, SkillError::ImageDecode { .. }));
    }
}

//! Image encoding: `DynamicImage` → base64 PNG.
//!
//! PNG is lossless; JPEG artefacts around small print (license numbers,
//! VINs) measurably hurt extraction accuracy.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// A normalized document image: PNG bytes, standard base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// Base64 text of the PNG (no data-URI prefix).
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

impl NormalizedImage {
    pub const MIME_TYPE: &'static str = "image/png";

    /// `data:image/png;base64,…` for embedding in a chat request.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, self.base64)
    }

    /// Convert to the edgequake-llm attachment type.
    ///
    /// `detail: "high"` makes GPT-4-class models tile the image instead of
    /// downsampling it to 512 px, which keeps fine print legible.
    pub fn to_image_data(&self) -> ImageData {
        ImageData::new(self.base64.clone(), Self::MIME_TYPE).with_detail("high")
    }
}

/// Encode an image as a base64 PNG ready for the vision API.
pub fn encode_png(img: &DynamicImage) -> Result<NormalizedImage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded {}x{} image → {} bytes base64", img.width(), img.height(), b64.len());

    Ok(NormalizedImage {
        base64: b64,
        width: img.width(),
        height: img.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_png(&img).expect("encode should succeed");
        assert_eq!((data.width, data.height), (10, 10));
        let decoded = STANDARD.decode(&data.base64).expect("valid base64");
        // PNG signature
        assert_eq!(&decoded[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn data_uri_prefix() {
        let img = NormalizedImage {
            base64: "QUJD".into(),
            width: 1,
            height: 1,
        };
        assert_eq!(img.data_uri(), "data:image/png;base64,QUJD");
    }

    #[test]
    fn image_data_carries_mime_type() {
        let img = NormalizedImage {
            base64: "QUJD".into(),
            width: 1,
            height: 1,
        };
        let data = img.to_image_data();
        assert_eq!(data.mime_type, "image/png");
        assert_eq!(data.data, "QUJD");
    }
}

//! Image encoding: [`ExtractedImage`] → base64 PNG.
//!
//! Extracted images are surfaced to callers as decoded pixel data; hosts
//! that want to display or persist them (web front-ends, the CLI) usually
//! need an encoded raster instead. PNG is chosen because it is lossless —
//! embedded figures are often diagrams and screenshots where compression
//! artefacts are visible immediately.

use crate::output::ExtractedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Cursor;
use tracing::debug;

/// A display-ready encoded raster.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Base64 of the PNG bytes.
    pub data: String,
    /// Always `image/png`.
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Render as a `data:` URI suitable for an `<img src>` attribute.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Encode an extracted image as base64 PNG.
pub fn encode_image(extracted: &ExtractedImage) -> Result<EncodedImage, image::ImageError> {
    let mut buf = Vec::new();
    extracted
        .image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded page {} image → {} bytes base64",
        extracted.page,
        b64.len()
    );

    Ok(EncodedImage {
        data: b64,
        mime_type: "image/png",
        width: extracted.width(),
        height: extracted.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn sample(width: u32, height: u32) -> ExtractedImage {
        ExtractedImage {
            page: 1,
            index_on_page: 0,
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                width,
                height,
                Rgba([0, 128, 255, 255]),
            )),
        }
    }

    #[test]
    fn encode_produces_valid_base64_png() {
        let encoded = encode_image(&sample(120, 160)).expect("encode should succeed");
        assert_eq!(encoded.mime_type, "image/png");
        assert_eq!((encoded.width, encoded.height), (120, 160));

        let bytes = STANDARD.decode(&encoded.data).expect("valid base64");
        // PNG signature
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn data_uri_has_mime_prefix() {
        let encoded = encode_image(&sample(10, 10)).unwrap();
        assert!(encoded.to_data_uri().starts_with("data:image/png;base64,"));
    }
}

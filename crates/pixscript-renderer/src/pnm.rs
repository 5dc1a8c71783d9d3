//! Binary Netpbm output.
//!
//! A gray canvas is written as `P5` (one byte per pixel), an RGB canvas as
//! `P6` (three bytes per pixel). The sample maximum is always 255.

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ImageEncoder, ImageFormat};

use crate::canvas::{Canvas, ColorMode};
use crate::error::RasterError;

pub fn encode(canvas: &Canvas) -> Result<Vec<u8>, RasterError> {
    let subtype = match canvas.mode() {
        ColorMode::Gray => PnmSubtype::Graymap(SampleEncoding::Binary),
        ColorMode::Rgb => PnmSubtype::Pixmap(SampleEncoding::Binary),
    };
    let mut out = Vec::new();
    PnmEncoder::new(&mut out)
        .with_subtype(subtype)
        .write_image(canvas.samples(), canvas.width(), canvas.height(), canvas.color_type())
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    Ok(out)
}

/// Parse `P5`/`P6` bytes back into a canvas. Other Netpbm variants are
/// rejected as malformed.
pub fn decode(bytes: &[u8]) -> Result<Canvas, RasterError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Pnm)
        .map_err(|e| RasterError::malformed(e.to_string()))?;
    let (w, h) = (img.width(), img.height());
    match img {
        DynamicImage::ImageLuma8(gray) => Canvas::from_raw(w, h, ColorMode::Gray, gray.into_raw()),
        DynamicImage::ImageRgb8(rgb) => Canvas::from_raw(w, h, ColorMode::Rgb, rgb.into_raw()),
        other => Err(RasterError::malformed(format!("unsupported sample layout {:?}", other.color()))),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Pixel;
    use proptest::prelude::*;

    #[test]
    fn gray_header_layout() {
        let mut c = Canvas::new(2, 1);
        c.set_gray(1, 0, 255).unwrap();
        assert_eq!(encode(&c).unwrap(), b"P5\n2 1 255\n\x00\xff".to_vec());
    }

    #[test]
    fn rgb_header_layout() {
        let mut c = Canvas::new(1, 1);
        c.set_rgb(0, 0, [10, 20, 30]).unwrap();
        assert_eq!(encode(&c).unwrap(), b"P6\n1 1 255\n\x0a\x14\x1e".to_vec());
    }

    #[test]
    fn decode_tolerates_comments_and_spacing() {
        let bytes = b"P5 # gray\n  3\t1\n# max\n255\n\x01\x02\x03";
        let c = decode(bytes).unwrap();
        assert_eq!((c.width(), c.height()), (3, 1));
        assert_eq!(c.pixel(2, 0), Some(Pixel::Gray(3)));
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert!(decode(b"").is_err());
        assert!(decode(b"P5\n2 2\n255\n\x00").is_err());
        assert!(decode(b"P5\nx 1\n255\n\x00").is_err());
        assert!(decode(b"P5\n1 1\n65535\n\x00\x00").is_err());
    }

    fn arb_canvas() -> impl Strategy<Value = Canvas> {
        (1u32..12, 1u32..12, any::<bool>()).prop_flat_map(|(w, h, rgb)| {
            let mode = if rgb { ColorMode::Rgb } else { ColorMode::Gray };
            let len = w as usize * h as usize * mode.channels();
            proptest::collection::vec(any::<u8>(), len)
                .prop_map(move |data| Canvas::from_raw(w, h, mode, data).unwrap())
        })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(canvas in arb_canvas()) {
            let decoded = decode(&encode(&canvas).unwrap()).unwrap();
            prop_assert_eq!(decoded, canvas);
        }
    }
}

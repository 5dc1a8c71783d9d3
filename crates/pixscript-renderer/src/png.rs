use std::io::Cursor;

use image::{ImageEncoder, codecs::png::PngEncoder};

use crate::canvas::Canvas;
use crate::error::RasterError;

/// Encode a canvas as an 8-bit PNG (`L8` or `Rgb8` depending on its mode).
pub fn encode(canvas: &Canvas) -> Result<Vec<u8>, RasterError> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(canvas.samples(), canvas.width(), canvas.height(), canvas.color_type())
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_png_signature_and_dimensions() {
        let mut c = Canvas::new(5, 3);
        c.set_rgb(4, 2, [255, 0, 0]).unwrap();
        let bytes = encode(&c).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.get_pixel(4, 2).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    }
}

use image::{ExtendedColorType, GrayImage, Luma, Rgb, RgbImage};

use crate::error::RasterError;

pub const DEFAULT_WIDTH: u32 = 256;
pub const DEFAULT_HEIGHT: u32 = 256;

/// Upper bound for either canvas dimension. Larger requests are clamped.
pub const MAX_DIMENSION: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Gray,
    Rgb,
}

impl ColorMode {
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    Gray(u8),
    Rgb([u8; 3]),
}

/// Fixed-size grid of 8-bit samples, row-major, top-left origin.
///
/// A canvas starts in [`ColorMode::Gray`] with every sample at 0. The first
/// RGB write promotes it to [`ColorMode::Rgb`], copying each gray sample into
/// all three channels. Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    buffer: Buffer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Buffer {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Canvas {
    /// Both dimensions are clamped to `1..=MAX_DIMENSION`.
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (clamp_dimension(width), clamp_dimension(height));
        if (w, h) != (width, height) {
            tracing::warn!(width, height, clamped_width = w, clamped_height = h, "canvas size clamped");
        }
        Self { buffer: Buffer::Gray(GrayImage::new(w, h)) }
    }

    /// Build a canvas from raw samples. `data` must hold exactly
    /// `width * height * mode.channels()` bytes.
    pub fn from_raw(width: u32, height: u32, mode: ColorMode, data: Vec<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RasterError::malformed(format!("unsupported dimensions {width}x{height}")));
        }
        let len = data.len();
        let buffer = match mode {
            ColorMode::Gray => GrayImage::from_raw(width, height, data).map(Buffer::Gray),
            ColorMode::Rgb => RgbImage::from_raw(width, height, data).map(Buffer::Rgb),
        };
        let expected = width as usize * height as usize * mode.channels();
        match buffer {
            Some(buffer) if len == expected => Ok(Self { buffer }),
            _ => Err(RasterError::malformed(format!("expected {expected} sample bytes, got {len}"))),
        }
    }

    pub fn width(&self) -> u32 { self.dimensions().0 }
    pub fn height(&self) -> u32 { self.dimensions().1 }

    pub fn dimensions(&self) -> (u32, u32) {
        match &self.buffer {
            Buffer::Gray(img) => img.dimensions(),
            Buffer::Rgb(img) => img.dimensions(),
        }
    }

    pub fn mode(&self) -> ColorMode {
        match self.buffer {
            Buffer::Gray(_) => ColorMode::Gray,
            Buffer::Rgb(_) => ColorMode::Rgb,
        }
    }

    /// Sample layout handed to the encoders.
    pub fn color_type(&self) -> ExtendedColorType {
        match self.buffer {
            Buffer::Gray(_) => ExtendedColorType::L8,
            Buffer::Rgb(_) => ExtendedColorType::Rgb8,
        }
    }

    /// Raw samples, `mode().channels()` bytes per pixel.
    pub fn samples(&self) -> &[u8] {
        match &self.buffer {
            Buffer::Gray(img) => img.as_raw(),
            Buffer::Rgb(img) => img.as_raw(),
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        let (w, h) = self.dimensions();
        x >= 0 && y >= 0 && x < w as i64 && y < h as i64
    }

    pub fn pixel(&self, x: i64, y: i64) -> Option<Pixel> {
        let (x, y) = self.checked(x, y).ok()?;
        Some(match &self.buffer {
            Buffer::Gray(img) => Pixel::Gray(img.get_pixel(x, y).0[0]),
            Buffer::Rgb(img) => Pixel::Rgb(img.get_pixel(x, y).0),
        })
    }

    /// Write one intensity. On an RGB canvas the value lands in all channels.
    pub fn set_gray(&mut self, x: i64, y: i64, value: u8) -> Result<(), RasterError> {
        let (x, y) = self.checked(x, y)?;
        match &mut self.buffer {
            Buffer::Gray(img) => img.put_pixel(x, y, Luma([value])),
            Buffer::Rgb(img) => img.put_pixel(x, y, Rgb([value; 3])),
        }
        Ok(())
    }

    pub fn set_rgb(&mut self, x: i64, y: i64, rgb: [u8; 3]) -> Result<(), RasterError> {
        let (x, y) = self.checked(x, y)?;
        self.promote_to_rgb().put_pixel(x, y, Rgb(rgb));
        Ok(())
    }

    /// Replace every sample with `f(x, y)` and switch back to gray mode.
    pub fn fill_gray_with(&mut self, mut f: impl FnMut(u32, u32) -> u8) {
        let (w, h) = self.dimensions();
        self.buffer = Buffer::Gray(GrayImage::from_fn(w, h, |x, y| Luma([f(x, y)])));
    }

    fn promote_to_rgb(&mut self) -> &mut RgbImage {
        if let Buffer::Gray(gray) = &self.buffer {
            let (w, h) = gray.dimensions();
            let rgb = RgbImage::from_fn(w, h, |x, y| Rgb([gray.get_pixel(x, y).0[0]; 3]));
            self.buffer = Buffer::Rgb(rgb);
        }
        match &mut self.buffer {
            Buffer::Rgb(img) => img,
            Buffer::Gray(_) => unreachable!("promoted above"),
        }
    }

    fn checked(&self, x: i64, y: i64) -> Result<(u32, u32), RasterError> {
        if !self.contains(x, y) {
            let (width, height) = self.dimensions();
            return Err(RasterError::OutOfBounds { x, y, width, height });
        }
        Ok((x as u32, y as u32))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

fn clamp_dimension(n: u32) -> u32 {
    n.clamp(1, MAX_DIMENSION)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_is_black_gray() {
        let c = Canvas::default();
        assert_eq!((c.width(), c.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(c.mode(), ColorMode::Gray);
        assert!(c.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn dimensions_are_clamped() {
        let c = Canvas::new(0, MAX_DIMENSION + 10);
        assert_eq!((c.width(), c.height()), (1, MAX_DIMENSION));
    }

    #[test]
    fn set_and_read_gray() {
        let mut c = Canvas::new(4, 3);
        c.set_gray(3, 2, 200).unwrap();
        assert_eq!(c.pixel(3, 2), Some(Pixel::Gray(200)));
        assert_eq!(c.samples()[2 * 4 + 3], 200);
    }

    #[test]
    fn out_of_bounds_is_rejected_without_writing() {
        let mut c = Canvas::new(4, 4);
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 4), (i64::MAX, 0)] {
            let err = c.set_gray(x, y, 255).unwrap_err();
            assert_eq!(err, RasterError::OutOfBounds { x, y, width: 4, height: 4 });
        }
        assert!(c.samples().iter().all(|&s| s == 0));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn rgb_write_promotes_existing_gray() {
        let mut c = Canvas::new(2, 1);
        c.set_gray(0, 0, 7).unwrap();
        c.set_rgb(1, 0, [1, 2, 3]).unwrap();
        assert_eq!(c.mode(), ColorMode::Rgb);
        assert_eq!(c.pixel(0, 0), Some(Pixel::Rgb([7, 7, 7])));
        assert_eq!(c.pixel(1, 0), Some(Pixel::Rgb([1, 2, 3])));
        assert_eq!(c.samples().len(), 6);
    }

    #[test]
    fn gray_write_on_rgb_canvas_fills_channels() {
        let mut c = Canvas::new(1, 1);
        c.set_rgb(0, 0, [9, 9, 9]).unwrap();
        c.set_gray(0, 0, 42).unwrap();
        assert_eq!(c.pixel(0, 0), Some(Pixel::Rgb([42, 42, 42])));
    }

    #[test]
    fn fill_resets_to_gray() {
        let mut c = Canvas::new(3, 2);
        c.set_rgb(0, 0, [1, 2, 3]).unwrap();
        c.fill_gray_with(|x, y| (x + y * 10) as u8);
        assert_eq!(c.mode(), ColorMode::Gray);
        assert_eq!(c.samples(), &[0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(Canvas::from_raw(2, 2, ColorMode::Rgb, vec![0; 12]).is_ok());
        assert!(Canvas::from_raw(2, 2, ColorMode::Rgb, vec![0; 4]).is_err());
        assert!(Canvas::from_raw(2, 2, ColorMode::Gray, vec![0; 5]).is_err());
        assert!(Canvas::from_raw(0, 2, ColorMode::Gray, vec![]).is_err());
    }

    #[test]
    fn color_type_follows_mode() {
        let mut c = Canvas::new(1, 1);
        assert_eq!(c.color_type(), ExtendedColorType::L8);
        c.set_rgb(0, 0, [1, 1, 1]).unwrap();
        assert_eq!(c.color_type(), ExtendedColorType::Rgb8);
    }
}

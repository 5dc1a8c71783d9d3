//! Escape-time Mandelbrot renderer.
//!
//! One pure routine serves both the `mandelbrot` script builtin and the
//! zero-argument default image, so the two never disagree.

use num_complex::Complex;

use crate::canvas::Canvas;

/// Iteration caps above this are clamped.
pub const MAX_ITERATIONS: usize = 1000;

/// Region of the complex plane mapped onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Complex<f64>,
    /// Horizontal extent. The vertical extent follows the canvas aspect ratio.
    pub span: f64,
}

impl Viewport {
    pub fn new(center_re: f64, center_im: f64, span: f64) -> Self {
        Self { center: Complex::new(center_re, center_im), span }
    }

    /// Viewport whose top-left pixel maps to `upper_left` and whose
    /// horizontal extent ends at `lower_right.re`.
    pub fn from_corners(upper_left: Complex<f64>, lower_right: Complex<f64>) -> Self {
        Self {
            center: (upper_left + lower_right) / 2.0,
            span: lower_right.re - upper_left.re,
        }
    }

    /// Complex coordinate of the top-left corner of pixel `(x, y)`.
    pub fn pixel_to_point(&self, bounds: (u32, u32), pixel: (u32, u32)) -> Complex<f64> {
        let (w, h) = (bounds.0 as f64, bounds.1 as f64);
        let span_im = self.span * h / w;
        let upper_left = Complex::new(self.center.re - self.span / 2.0, self.center.im + span_im / 2.0);
        Complex::new(
            upper_left.re + pixel.0 as f64 * self.span / w,
            upper_left.im - pixel.1 as f64 * span_im / h,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_corners(Complex::new(-1.2, 0.35), Complex::new(-1.0, 0.20))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MandelbrotParams {
    pub width: u32,
    pub height: u32,
    pub viewport: Viewport,
    pub max_iterations: usize,
}

impl Default for MandelbrotParams {
    fn default() -> Self {
        Self { width: 1000, height: 750, viewport: Viewport::default(), max_iterations: 255 }
    }
}

/// Number of steps of `z = z² + c` before `|z| > 2`, or `None` if `c`
/// stays bounded for `limit` steps.
pub fn escape_time(c: Complex<f64>, limit: usize) -> Option<usize> {
    let mut z = Complex::new(0.0, 0.0);
    for i in 0..limit {
        if z.norm_sqr() > 4.0 {
            return Some(i);
        }
        z = z * z + c;
    }
    None
}

/// Gray level for an escape count: fast escapes are bright, the set is black.
pub fn intensity(escape: Option<usize>, limit: usize) -> u8 {
    match escape {
        Some(count) => (255 - count.min(limit) * 255 / limit.max(1)) as u8,
        None => 0,
    }
}

/// Allocate a canvas of `params.width × params.height` and render into it.
pub fn render(params: &MandelbrotParams) -> Canvas {
    let mut canvas = Canvas::new(params.width, params.height);
    render_into(&mut canvas, &params.viewport, params.max_iterations);
    canvas
}

/// Overwrite `canvas` (keeping its dimensions) with a grayscale rendering.
#[tracing::instrument(skip(canvas), fields(width = canvas.width(), height = canvas.height()))]
pub fn render_into(canvas: &mut Canvas, viewport: &Viewport, max_iterations: usize) {
    let limit = max_iterations.clamp(1, MAX_ITERATIONS);
    let bounds = (canvas.width(), canvas.height());
    canvas.fill_gray_with(|x, y| {
        let point = viewport.pixel_to_point(bounds, (x, y));
        intensity(escape_time(point, limit), limit)
    });
}

// ─── Tests ───────────────────────────────────────────────────────────────────

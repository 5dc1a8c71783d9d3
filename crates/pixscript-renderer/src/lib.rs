//! Pixel buffer, image encoders and the Mandelbrot generator.
//!
//! Nothing in this crate knows about the scripting language: the evaluator
//! in `pixscript-lang` writes into a [`Canvas`], and the canvas is turned
//! into bytes by [`pnm::encode`] or [`png::encode`].

pub mod canvas;
pub mod error;
pub mod mandelbrot;
pub mod png;
pub mod pnm;

pub use canvas::{Canvas, ColorMode, Pixel, DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_DIMENSION};
pub use error::RasterError;
pub use mandelbrot::{MandelbrotParams, Viewport, MAX_ITERATIONS};

/// Output container for an encoded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Binary Netpbm (`P5` gray / `P6` color).
    #[default]
    Pnm,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pnm => "pnm",
            Self::Png => "png",
        }
    }

    pub fn encode(&self, canvas: &Canvas) -> Result<Vec<u8>, RasterError> {
        match self {
            Self::Pnm => pnm::encode(canvas),
            Self::Png => png::encode(canvas),
        }
    }
}

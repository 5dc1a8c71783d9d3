#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} canvas")]
    OutOfBounds { x: i64, y: i64, width: u32, height: u32 },

    #[error("malformed image data: {0}")]
    Malformed(String),

    #[error("image encoding failed: {0}")]
    Encode(String),
}

impl RasterError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

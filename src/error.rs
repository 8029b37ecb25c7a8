//! Error types shared by the field, the page entry point and the desktop host

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackdropError {
    #[error("Invalid field configuration: {0}")]
    InvalidConfig(String),

    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Failed to present frame: {0}")]
    Present(String),

    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}

impl From<softbuffer::SoftBufferError> for BackdropError {
    fn from(e: softbuffer::SoftBufferError) -> Self {
        BackdropError::SurfaceUnavailable(e.to_string())
    }
}

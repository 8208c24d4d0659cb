//! Rendering error types.

use thiserror::Error;

/// Errors raised by the GPU slice backend.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The color target format cannot be blended into.
    #[error("unsupported color target format {0:?}")]
    UnsupportedFormat(wgpu::TextureFormat),

    /// A frame's strips do not fit in a single vertex buffer.
    #[error("strip batch of {vertices} vertices exceeds the {limit}-vertex draw limit")]
    BatchTooLarge { vertices: usize, limit: usize },
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

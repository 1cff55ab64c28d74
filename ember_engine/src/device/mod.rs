/// Device module - the GPU context seam consumed by the rendering core
///
/// Backends (headless, GLES, ...) implement the `GraphicsDevice` trait and
/// are selected at composition time when the `RenderContext` is created.

// Module declarations
pub mod context;
pub mod device;

#[cfg(test)]
pub mod mock_device;

// Re-exports
pub use context::*;
pub use device::*;

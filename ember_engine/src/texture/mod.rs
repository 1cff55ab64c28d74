/// Texture module - 2D textures and cubemaps with cached unit binding
///
/// Binding goes through the `RenderContext` unit table so re-binding a
/// texture already resident on a unit costs nothing. Filter and wrap
/// changes are deferred and applied on the next bind.

// Module declarations
pub mod cubemap;
pub mod image;
pub mod texture;

// Re-exports
pub use cubemap::*;
pub use image::*;
pub use texture::*;

/// Render module - materials and the render system facade
///
/// The `RenderSystem` owns the `RenderContext`, the buffer registry and
/// the sprite batcher, and orchestrates per-frame housekeeping such as
/// deferred buffer release and context-loss recovery.

// Module declarations
pub mod material;
pub mod render_system;

// Re-exports
pub use material::*;
pub use render_system::*;

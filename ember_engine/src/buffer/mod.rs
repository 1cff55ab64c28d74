/// Buffer module - GPU mesh buffers with CPU lock/unlock access
///
/// A `MeshBuffer` pairs a vertex region and an optional index region,
/// locked for writing through an RAII guard. Destroyed buffers hand
/// their GPU handles to the `BufferRegistry` for deferred release on
/// the render thread.

// Module declarations
pub mod mesh_buffer;
pub mod registry;

// Re-exports
pub use mesh_buffer::*;
pub use registry::*;

/// Sprite module - dynamic sprite batching
///
/// Sprites submitted in a frame are packed into a shared dynamic mesh
/// buffer and coalesced into as few draw commands as possible: a new
/// command starts only when the material changes or the scissor state
/// toggles. Two batches are used in ping-pong so the CPU fills one
/// while the GPU may still be reading the other.

// Module declarations
pub mod dynamic_sprite_batcher;
pub mod sprite;
pub mod sprite_batch;

// Re-exports
pub use dynamic_sprite_batcher::*;
pub use sprite::*;
pub use sprite_batch::*;

/// Model module - skeletons and skinned animation blending
///
/// An animation group owns a set of clips positioned on a blendline.
/// Per frame it samples the bracketing clips, lerps them into a single
/// pose, optionally crossfades with another group, and finally walks
/// the skeleton to produce world joint matrices.

// Module declarations
pub mod animation_group;
pub mod skeleton;
pub mod skinned_animation;

// Re-exports
pub use animation_group::*;
pub use skeleton::*;
pub use skinned_animation::*;

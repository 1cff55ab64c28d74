/*!
# Ember Engine

Rendering core for the Ember 2D/3D game engine.

This crate provides the platform-agnostic rendering API: GPU resources
are reached through the `GraphicsDevice` trait, and platform backends
(GLES, headless, ...) are selected at composition time when the render
system is created.

## Architecture

- **GraphicsDevice**: raw GPU primitives implemented by each backend
- **RenderContext**: render-thread-owned binding state and caches
- **MeshBuffer**: paired vertex/index buffer with lock/unlock access
- **Texture / Cubemap**: image resources with cached unit binding
- **DynamicSpriteBatcher**: coalesces sprite submissions into draws
- **SkinnedAnimationGroup**: blendline sampling and joint matrices
- **RenderSystem**: per-frame facade owning context, registry, batcher

Backend implementations live in sibling crates and implement
`GraphicsDevice`.
*/

// Internal modules
mod engine;
mod error;
pub mod buffer;
pub mod device;
pub mod log;
pub mod model;
pub mod render;
pub mod resource;
pub mod sprite;
pub mod task;
pub mod texture;

// Root-level re-exports of the most used types
pub use engine::Engine;
pub use error::{Error, Result};

// Main ember namespace module
pub mod ember {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Device seam
    pub use crate::device::{
        BufferHandle, BufferTarget, CubemapFace, DeviceCapabilities, GraphicsDevice,
        RenderContext, ScissorRect, TextureHandle, TextureKind,
    };

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Buffer sub-module
    pub mod buffer {
        pub use crate::buffer::*;
    }

    // Texture sub-module
    pub mod texture {
        pub use crate::texture::*;
    }

    // Sprite sub-module
    pub mod sprite {
        pub use crate::sprite::*;
    }

    // Model sub-module
    pub mod model {
        pub use crate::model::*;
    }

    // Render sub-module
    pub mod render {
        pub use crate::render::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Task sub-module
    pub mod task {
        pub use crate::task::*;
    }
}

// Re-export math library at crate root
pub use glam;

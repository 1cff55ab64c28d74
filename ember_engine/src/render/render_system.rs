/// RenderSystem - owns the context, buffer registry and sprite batcher
///
/// The render system is the per-frame entry point: resources are
/// created through it, sprites are submitted through it, and it runs
/// the housekeeping that must happen on the render thread (deferred
/// buffer release, context-loss suspend/resume).

use std::sync::{Arc, Mutex};

use crate::buffer::{BufferDescription, BufferRegistry, MeshBuffer};
use crate::device::{GraphicsDevice, RenderContext, ScissorRect};
use crate::error::Result;
use crate::sprite::{DynamicSpriteBatcher, SpriteData};
use crate::engine_info;

/// Sprites per batch when no capacity is given
pub const DEFAULT_SPRITE_CAPACITY: usize = 512;

pub struct RenderSystem {
    context: RenderContext,
    registry: Arc<Mutex<BufferRegistry>>,
    batcher: DynamicSpriteBatcher,
}

impl RenderSystem {
    /// Create a render system around a backend device
    pub fn new(device: Box<dyn GraphicsDevice>) -> Result<Self> {
        Self::with_sprite_capacity(device, DEFAULT_SPRITE_CAPACITY)
    }

    pub fn with_sprite_capacity(
        device: Box<dyn GraphicsDevice>,
        sprite_capacity: usize,
    ) -> Result<Self> {
        let mut context = RenderContext::new(device);
        let registry = Arc::new(Mutex::new(BufferRegistry::new()));
        let batcher = DynamicSpriteBatcher::build(&mut context, registry.clone(), sprite_capacity)?;
        engine_info!(
            "ember::RenderSystem",
            "render system created ({} sprites per batch)",
            sprite_capacity
        );
        Ok(Self {
            context,
            registry,
            batcher,
        })
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }

    pub fn registry(&self) -> Arc<Mutex<BufferRegistry>> {
        self.registry.clone()
    }

    // ===== RESOURCE CREATION =====

    /// Create a mesh buffer registered for deferred release
    pub fn create_buffer(&mut self, desc: BufferDescription) -> Result<MeshBuffer> {
        MeshBuffer::build(&mut self.context, self.registry.clone(), desc)
    }

    // ===== SPRITE SUBMISSION =====

    pub fn render_sprite(&mut self, sprite: SpriteData) -> Result<()> {
        self.batcher.render(&mut self.context, sprite)
    }

    pub fn enable_scissor(&mut self, rect: ScissorRect) {
        self.batcher.enable_scissor(rect);
    }

    pub fn disable_scissor(&mut self) {
        self.batcher.disable_scissor();
    }

    /// Flush the recorded sprites into draw calls
    pub fn flush_sprites(&mut self) -> Result<()> {
        self.batcher.flush(&mut self.context)
    }

    // ===== FRAME HOUSEKEEPING =====

    /// Release GPU handles of buffers dropped since the last call.
    ///
    /// Must run on the render thread. Returns the number of buffers
    /// released.
    pub fn process_pending_releases(&mut self) -> usize {
        let pending = match self.registry.lock() {
            Ok(mut registry) => registry.take_pending(),
            Err(_) => return 0,
        };
        let count = pending.len();
        for release in pending {
            if self.context.bound_buffer() == Some(release.id) {
                self.context.set_bound_buffer(None);
            }
            if let Some(handle) = release.vertex {
                self.context.device_mut().destroy_buffer(handle);
            }
            if let Some(handle) = release.index {
                self.context.device_mut().destroy_buffer(handle);
            }
        }
        count
    }

    // ===== CONTEXT LOSS =====

    /// Back up the given buffers and the sprite batcher, then forget all
    /// cached binding state. Call before the GPU context goes away.
    pub fn suspend(&mut self, buffers: &mut [&mut MeshBuffer]) -> Result<()> {
        for buffer in buffers.iter_mut() {
            buffer.backup(&mut self.context)?;
        }
        self.batcher.backup(&mut self.context)?;
        self.context.on_context_lost();
        engine_info!("ember::RenderSystem", "suspended for context loss");
        Ok(())
    }

    /// Recreate the sprite batcher and the given buffers on the new
    /// context. Call once a fresh GPU context exists.
    pub fn resume(&mut self, buffers: &mut [&mut MeshBuffer]) -> Result<()> {
        self.batcher.restore(&mut self.context)?;
        for buffer in buffers.iter_mut() {
            buffer.restore(&mut self.context)?;
        }
        engine_info!("ember::RenderSystem", "resumed after context loss");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "render_system_tests.rs"]
mod tests;

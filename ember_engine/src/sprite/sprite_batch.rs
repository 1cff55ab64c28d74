/// SpriteBatch - one dynamic mesh buffer holding packed sprite quads
///
/// The index region is written once at build time: quad i always uses
/// vertices [4i, 4i+4), so the index pattern never changes and refills
/// only touch the vertex region.

use std::sync::{Arc, Mutex};

use crate::buffer::{
    BufferAccess, BufferDescription, BufferRegistry, BufferUsage, MeshBuffer,
};
use crate::device::RenderContext;
use crate::error::Result;
use crate::sprite::{SpriteData, SpriteVertex, INDICES_PER_SPRITE, QUAD_INDICES, VERTICES_PER_SPRITE};
use crate::engine_bail;

pub(crate) struct SpriteBatch {
    buffer: MeshBuffer,
    capacity: usize,
    sprite_count: usize,
}

impl SpriteBatch {
    /// Allocate a batch able to hold `capacity` sprites and prefill the
    /// static index pattern
    pub(crate) fn build(
        ctx: &mut RenderContext,
        registry: Arc<Mutex<BufferRegistry>>,
        capacity: usize,
    ) -> Result<Self> {
        // u16 indices address at most 65536 vertices
        if capacity * VERTICES_PER_SPRITE > u16::MAX as usize + 1 {
            engine_bail!(
                "ember::SpriteBatch",
                "capacity {} exceeds the 16-bit index range",
                capacity
            );
        }

        let desc = BufferDescription {
            vertex_capacity: capacity * VERTICES_PER_SPRITE * std::mem::size_of::<SpriteVertex>(),
            index_capacity: capacity * INDICES_PER_SPRITE * std::mem::size_of::<u16>(),
            usage: BufferUsage::Dynamic,
            access: BufferAccess::WRITE,
        };
        let mut buffer = MeshBuffer::build(ctx, registry, desc)?;

        let mut indices = Vec::with_capacity(capacity * INDICES_PER_SPRITE);
        for sprite in 0..capacity {
            let base = (sprite * VERTICES_PER_SPRITE) as u16;
            indices.extend(QUAD_INDICES.iter().map(|&offset| base + offset));
        }
        {
            let mut lock = buffer
                .lock_index(ctx)?
                .ok_or_else(|| crate::error::Error::InvalidResource(
                    "sprite batch buffer built without an index region".to_string(),
                ))?;
            lock.copy_from_slice(bytemuck::cast_slice(&indices));
        }

        Ok(Self {
            buffer,
            capacity,
            sprite_count: 0,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pack the frame's sprites into the vertex region
    pub(crate) fn fill(&mut self, ctx: &mut RenderContext, sprites: &[SpriteData]) -> Result<()> {
        if sprites.len() > self.capacity {
            engine_bail!(
                "ember::SpriteBatch",
                "{} sprites exceed batch capacity {}",
                sprites.len(),
                self.capacity
            );
        }

        let mut vertices: Vec<SpriteVertex> =
            Vec::with_capacity(sprites.len() * VERTICES_PER_SPRITE);
        for sprite in sprites {
            vertices.extend_from_slice(&sprite.vertices());
        }

        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        {
            let mut lock = self.buffer.lock_vertex(ctx)?;
            lock[..bytes.len()].copy_from_slice(bytes);
        }
        self.buffer.set_cache_valid(true);
        self.sprite_count = sprites.len();
        Ok(())
    }

    /// Copy the buffer contents to the CPU ahead of a context loss
    pub(crate) fn backup(&mut self, ctx: &mut RenderContext) -> Result<()> {
        self.buffer.backup(ctx)
    }

    /// Recreate the buffer on the new context
    pub(crate) fn restore(&mut self, ctx: &mut RenderContext) -> Result<()> {
        self.buffer.restore(ctx)
    }

    /// Draw a contiguous run of sprites previously packed by `fill`
    pub(crate) fn draw(
        &self,
        ctx: &mut RenderContext,
        first_sprite: usize,
        sprite_count: usize,
    ) -> Result<()> {
        if first_sprite + sprite_count > self.sprite_count {
            engine_bail!(
                "ember::SpriteBatch",
                "draw range [{}, {}) exceeds the {} packed sprites",
                first_sprite,
                first_sprite + sprite_count,
                self.sprite_count
            );
        }
        self.buffer.bind(ctx)?;
        ctx.device_mut().draw_indexed(
            (first_sprite * INDICES_PER_SPRITE) as u32,
            (sprite_count * INDICES_PER_SPRITE) as u32,
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "sprite_batch_tests.rs"]
mod tests;

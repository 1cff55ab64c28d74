/// DynamicSpriteBatcher - coalesces per-sprite submissions into draws
///
/// Sprites are recorded in submission order. A draw command covers the
/// longest run of consecutive sprites sharing one material; the run is
/// closed when the material changes, when scissor state toggles, or at
/// flush. Commands replay strictly in insertion order, so output is
/// visually identical to drawing every sprite individually.
///
/// Two batches alternate between flushes (ping-pong): the one just
/// handed to the GPU is left untouched while the next frame fills the
/// other.

use std::sync::{Arc, Mutex};

use crate::buffer::BufferRegistry;
use crate::device::{RenderContext, ScissorRect};
use crate::error::Result;
use crate::render::Material;
use crate::sprite::{SpriteBatch, SpriteData};
use crate::engine_trace;

const BATCH_COUNT: usize = 2;

/// One step of a flushed frame, replayed in order
enum RenderCommand {
    Draw {
        material: Arc<Material>,
        first_sprite: usize,
        sprite_count: usize,
    },
    ScissorOn(ScissorRect),
    ScissorOff,
}

/// Frame-scoped sprite batcher
pub struct DynamicSpriteBatcher {
    batches: [SpriteBatch; BATCH_COUNT],
    current: usize,

    sprites: Vec<SpriteData>,
    commands: Vec<RenderCommand>,

    /// Material of the run being accumulated
    last_material: Option<Arc<Material>>,
    /// First sprite of the run being accumulated
    run_start: usize,
}

impl DynamicSpriteBatcher {
    /// Create a batcher whose batches hold `capacity` sprites each
    pub fn build(
        ctx: &mut RenderContext,
        registry: Arc<Mutex<BufferRegistry>>,
        capacity: usize,
    ) -> Result<Self> {
        let first = SpriteBatch::build(ctx, registry.clone(), capacity)?;
        let second = SpriteBatch::build(ctx, registry, capacity)?;
        Ok(Self {
            batches: [first, second],
            current: 0,
            sprites: Vec::with_capacity(capacity),
            commands: Vec::new(),
            last_material: None,
            run_start: 0,
        })
    }

    /// Sprites recorded since the last flush
    pub fn pending_sprites(&self) -> usize {
        self.sprites.len()
    }

    /// Capacity of each batch, in sprites
    pub fn capacity(&self) -> usize {
        self.batches[0].capacity()
    }

    /// Submit one sprite. A full batch flushes before accepting it.
    pub fn render(&mut self, ctx: &mut RenderContext, sprite: SpriteData) -> Result<()> {
        if self.sprites.len() == self.capacity() {
            engine_trace!("ember::DynamicSpriteBatcher", "batch full, forcing flush");
            self.flush(ctx)?;
        }

        let changed = match &self.last_material {
            Some(material) => material.id() != sprite.material.id(),
            None => false,
        };
        if changed {
            self.close_run();
        }
        if changed || self.last_material.is_none() {
            self.last_material = Some(sprite.material.clone());
        }

        self.sprites.push(sprite);
        Ok(())
    }

    /// Enable the scissor rectangle for subsequent sprites.
    ///
    /// Always inserts a command boundary, even when the surrounding
    /// sprites share a material.
    pub fn enable_scissor(&mut self, rect: ScissorRect) {
        self.close_run();
        self.commands.push(RenderCommand::ScissorOn(rect));
    }

    /// Disable the scissor rectangle for subsequent sprites
    pub fn disable_scissor(&mut self) {
        self.close_run();
        self.commands.push(RenderCommand::ScissorOff);
    }

    /// Pack everything recorded so far into the inactive batch, replay
    /// the command list in order, and swap batches.
    pub fn flush(&mut self, ctx: &mut RenderContext) -> Result<()> {
        self.close_run();
        if self.commands.is_empty() {
            return Ok(());
        }

        self.batches[self.current].fill(ctx, &self.sprites)?;

        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            match command {
                RenderCommand::Draw {
                    material,
                    first_sprite,
                    sprite_count,
                } => {
                    material.apply(ctx)?;
                    self.batches[self.current].draw(ctx, first_sprite, sprite_count)?;
                }
                RenderCommand::ScissorOn(rect) => ctx.device_mut().set_scissor(Some(rect)),
                RenderCommand::ScissorOff => ctx.device_mut().set_scissor(None),
            }
        }

        self.current = (self.current + 1) % BATCH_COUNT;
        self.sprites.clear();
        self.run_start = 0;
        self.last_material = None;
        Ok(())
    }

    /// Back up both batches ahead of a context loss. Recorded but
    /// unflushed sprites are discarded; they belong to the dead frame.
    pub fn backup(&mut self, ctx: &mut RenderContext) -> Result<()> {
        self.sprites.clear();
        self.commands.clear();
        self.last_material = None;
        self.run_start = 0;
        for batch in &mut self.batches {
            batch.backup(ctx)?;
        }
        Ok(())
    }

    /// Recreate both batches on the new context
    pub fn restore(&mut self, ctx: &mut RenderContext) -> Result<()> {
        for batch in &mut self.batches {
            batch.restore(ctx)?;
        }
        Ok(())
    }

    /// Close the accumulating run into a draw command, if non-empty
    fn close_run(&mut self) {
        let count = self.sprites.len() - self.run_start;
        if count == 0 {
            return;
        }
        if let Some(material) = self.last_material.clone() {
            self.commands.push(RenderCommand::Draw {
                material,
                first_sprite: self.run_start,
                sprite_count: count,
            });
            self.run_start = self.sprites.len();
        }
    }

    /// Number of queued commands (used by tests and diagnostics)
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "dynamic_sprite_batcher_tests.rs"]
mod tests;

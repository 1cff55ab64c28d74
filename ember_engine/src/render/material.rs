/// Material - surface state applied before a draw
///
/// Materials carry a process-unique id; the sprite batcher coalesces
/// consecutive sprites by comparing that id, never by comparing
/// contents. Two materials with identical state but different ids still
/// break a batch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::device::RenderContext;
use crate::error::Result;
use crate::texture::{Texture, TextureResource};

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique material identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(u64);

/// Surface state shared by the sprites drawn with it
pub struct Material {
    id: MaterialId,
    name: String,
    texture: Option<Arc<Mutex<Texture>>>,
    /// Alpha blending over the framebuffer
    pub transparency_enabled: bool,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MaterialId(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            texture: None,
            transparency_enabled: true,
        }
    }

    pub fn with_texture(name: impl Into<String>, texture: Arc<Mutex<Texture>>) -> Self {
        let mut material = Self::new(name);
        material.texture = Some(texture);
        material
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> Option<&Arc<Mutex<Texture>>> {
        self.texture.as_ref()
    }

    /// Bind this material's state for the draws that follow
    pub fn apply(&self, ctx: &mut RenderContext) -> Result<()> {
        if let Some(texture) = &self.texture {
            let mut texture = texture.lock().map_err(|_| {
                crate::error::Error::InvalidResource(format!(
                    "texture lock poisoned for material '{}'",
                    self.name
                ))
            })?;
            texture.bind(ctx, 0)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;

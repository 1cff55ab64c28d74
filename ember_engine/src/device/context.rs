/// RenderContext - render-thread-owned GPU binding state
///
/// Owns the boxed device plus every piece of process-wide binding state
/// the original backends kept in statics: the currently bound mesh
/// buffer, the active texture unit, and the texture unit occupancy
/// table. Keeping it on a context object instead of globals is what
/// makes the bind no-op paths testable in isolation.

use crate::device::{DeviceCapabilities, GraphicsDevice};
use crate::engine_warn;

/// Identity of a live `MeshBuffer`, assigned by the context at creation.
///
/// Distinct from [`BufferHandle`](crate::device::BufferHandle): handles
/// are recycled by backends across context loss, identities never are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

/// Identity of a built texture or cubemap resource, assigned at build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

/// Render-thread-owned GPU context state
pub struct RenderContext {
    device: Box<dyn GraphicsDevice>,
    capabilities: DeviceCapabilities,

    /// Singleton "currently bound" mesh buffer, by identity
    bound_buffer: Option<BufferId>,

    /// Active texture unit, mirrored to skip redundant unit switches
    active_unit: u32,

    /// Which resource identity occupies each texture unit
    texture_units: Vec<Option<TextureId>>,

    next_buffer_id: u64,
    next_texture_id: u64,
}

impl RenderContext {
    /// Create a context around a backend device, querying its
    /// capabilities once
    pub fn new(device: Box<dyn GraphicsDevice>) -> Self {
        let capabilities = device.capabilities();
        let unit_count = capabilities.max_texture_units as usize;
        Self {
            device,
            capabilities,
            bound_buffer: None,
            active_unit: 0,
            texture_units: vec![None; unit_count],
            next_buffer_id: 0,
            next_texture_id: 0,
        }
    }

    /// Device capabilities queried at creation
    pub fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    /// Direct access to the backend device
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    // ===== IDENTITY ALLOCATION =====

    pub(crate) fn alloc_buffer_id(&mut self) -> BufferId {
        let id = BufferId(self.next_buffer_id);
        self.next_buffer_id += 1;
        id
    }

    pub(crate) fn alloc_texture_id(&mut self) -> TextureId {
        let id = TextureId(self.next_texture_id);
        self.next_texture_id += 1;
        id
    }

    // ===== BOUND BUFFER CACHE =====

    /// Identity of the currently bound mesh buffer, if any
    pub fn bound_buffer(&self) -> Option<BufferId> {
        self.bound_buffer
    }

    pub(crate) fn set_bound_buffer(&mut self, id: Option<BufferId>) {
        self.bound_buffer = id;
    }

    // ===== TEXTURE UNIT TABLE =====

    /// Resource identity occupying the given unit, if any
    pub fn texture_unit(&self, unit: u32) -> Option<TextureId> {
        self.texture_units.get(unit as usize).copied().flatten()
    }

    pub(crate) fn set_texture_unit(&mut self, unit: u32, id: Option<TextureId>) {
        if let Some(entry) = self.texture_units.get_mut(unit as usize) {
            *entry = id;
        }
    }

    /// Clear every unit entry pointing at the given resource identity,
    /// returning the units that were cleared
    pub(crate) fn clear_units_for(&mut self, id: TextureId) -> Vec<u32> {
        let mut cleared = Vec::new();
        for (unit, entry) in self.texture_units.iter_mut().enumerate() {
            if *entry == Some(id) {
                *entry = None;
                cleared.push(unit as u32);
            }
        }
        cleared
    }

    /// Clamp a requested unit to the hardware range, warning on overflow.
    /// Degrades rather than aborting the frame.
    pub(crate) fn clamp_unit(&self, unit: u32) -> u32 {
        let max = self.capabilities.max_texture_units;
        if unit >= max {
            engine_warn!(
                "ember::RenderContext",
                "texture unit {} exceeds hardware limit {}, clamping",
                unit,
                max
            );
            max.saturating_sub(1)
        } else {
            unit
        }
    }

    /// Switch the device's active unit, skipping the call when the unit
    /// is already active
    pub(crate) fn set_active_unit(&mut self, unit: u32) {
        if self.active_unit != unit {
            self.device.set_active_unit(unit);
            self.active_unit = unit;
        }
    }

    /// Currently active texture unit
    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    // ===== CONTEXT LOSS =====

    /// Forget all cached binding state after the GPU context was lost.
    ///
    /// The unit table and bound-buffer cache describe a context that no
    /// longer exists; the next bind of each resource re-establishes real
    /// device state.
    pub fn on_context_lost(&mut self) {
        self.bound_buffer = None;
        self.active_unit = 0;
        for entry in &mut self.texture_units {
            *entry = None;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

/// Buffer registry - deferred GPU handle release
///
/// A `MeshBuffer` can be dropped on any thread, but its GPU handles may
/// only be released on the render thread. Dropping a buffer therefore
/// pushes its handles here; `RenderSystem::process_pending_releases`
/// drains the queue once per frame.

use slotmap::{new_key_type, SlotMap};

use crate::device::{BufferHandle, BufferId};

new_key_type! {
    /// Key identifying a live buffer's registry slot
    pub struct BufferKey;
}

/// Handles of a destroyed buffer awaiting render-thread release
#[derive(Debug, Clone, Copy)]
pub struct PendingRelease {
    pub id: BufferId,
    pub vertex: Option<BufferHandle>,
    pub index: Option<BufferHandle>,
}

/// Tracks live mesh buffers and queues handle releases
#[derive(Default)]
pub struct BufferRegistry {
    live: SlotMap<BufferKey, BufferId>,
    pending: Vec<PendingRelease>,
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly built buffer, returning its slot key
    pub(crate) fn register(&mut self, id: BufferId) -> BufferKey {
        self.live.insert(id)
    }

    /// Unregister a dropped buffer and queue its handles for release
    pub(crate) fn release(
        &mut self,
        key: BufferKey,
        id: BufferId,
        vertex: Option<BufferHandle>,
        index: Option<BufferHandle>,
    ) {
        self.live.remove(key);
        self.pending.push(PendingRelease { id, vertex, index });
    }

    /// Drain everything queued for release
    pub(crate) fn take_pending(&mut self) -> Vec<PendingRelease> {
        std::mem::take(&mut self.pending)
    }

    /// Number of buffers currently alive
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of queued releases not yet processed
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

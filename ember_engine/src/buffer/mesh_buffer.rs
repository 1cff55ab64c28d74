/// MeshBuffer - paired vertex/index GPU buffer with lock/unlock access
///
/// Writers fill a buffer through a `BufferLock` guard obtained from
/// `lock_vertex`/`lock_index`. On devices that support buffer mapping
/// the guard writes straight into GPU memory; otherwise it writes into
/// a CPU shadow copy that is flushed with one upload when the guard
/// drops. Callers never observe the difference.
///
/// Across a GPU context loss a buffer can `backup` its contents to the
/// CPU and later `restore` them into freshly allocated GPU objects.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use bitflags::bitflags;

use crate::buffer::{BufferKey, BufferRegistry};
use crate::device::{BufferHandle, BufferId, BufferTarget, RenderContext};
use crate::error::Result;
use crate::{engine_bail, engine_error, engine_trace};

// ===== USAGE AND ACCESS =====

/// Update frequency hint passed through to the backend allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, drawn many times
    Static,
    /// Rewritten every frame or nearly so
    Dynamic,
}

bitflags! {
    /// CPU access directions a lock may use
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferAccess: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
        const READ_WRITE = 0b11;
    }
}

// ===== BUFFER DESCRIPTION =====

/// Descriptor for creating a `MeshBuffer`
#[derive(Debug, Clone, Copy)]
pub struct BufferDescription {
    /// Vertex region size in bytes (must be non-zero)
    pub vertex_capacity: usize,
    /// Index region size in bytes (zero means no index region)
    pub index_capacity: usize,
    pub usage: BufferUsage,
    pub access: BufferAccess,
}

// ===== MESH BUFFER =====

/// Paired vertex/index GPU buffer
pub struct MeshBuffer {
    id: BufferId,
    desc: BufferDescription,

    vertex_handle: Option<BufferHandle>,
    index_handle: Option<BufferHandle>,

    /// CPU copies used when the device cannot map buffer memory
    vertex_shadow: Option<Vec<u8>>,
    index_shadow: Option<Vec<u8>>,

    /// CPU copies held between `backup` and `restore`
    vertex_backup: Option<Vec<u8>>,
    index_backup: Option<Vec<u8>>,

    /// Flag for callers that cache derived data keyed on this buffer's
    /// contents (the sprite batcher's coalesced command list)
    cache_valid: bool,

    registry: Arc<Mutex<BufferRegistry>>,
    key: BufferKey,
}

impl MeshBuffer {
    /// Allocate GPU storage for both regions and register the buffer
    pub(crate) fn build(
        ctx: &mut RenderContext,
        registry: Arc<Mutex<BufferRegistry>>,
        desc: BufferDescription,
    ) -> Result<Self> {
        if desc.vertex_capacity == 0 {
            engine_bail!(
                "ember::MeshBuffer",
                "vertex capacity must be non-zero"
            );
        }

        let vertex_handle =
            ctx.device_mut()
                .create_buffer(BufferTarget::Vertex, desc.vertex_capacity, desc.usage)?;
        let index_handle = if desc.index_capacity > 0 {
            Some(ctx.device_mut().create_buffer(
                BufferTarget::Index,
                desc.index_capacity,
                desc.usage,
            )?)
        } else {
            None
        };

        let use_shadow = !ctx.capabilities().supports_map_buffer;
        let vertex_shadow = use_shadow.then(|| vec![0u8; desc.vertex_capacity]);
        let index_shadow =
            (use_shadow && desc.index_capacity > 0).then(|| vec![0u8; desc.index_capacity]);

        let id = ctx.alloc_buffer_id();
        let key = registry
            .lock()
            .map_err(|_| {
                crate::error::Error::BackendError("buffer registry lock poisoned".to_string())
            })?
            .register(id);

        engine_trace!(
            "ember::MeshBuffer",
            "built buffer ({} vertex bytes, {} index bytes)",
            desc.vertex_capacity,
            desc.index_capacity
        );

        Ok(Self {
            id,
            desc,
            vertex_handle: Some(vertex_handle),
            index_handle,
            vertex_shadow,
            index_shadow,
            vertex_backup: None,
            index_backup: None,
            cache_valid: false,
            registry,
            key,
        })
    }

    // ===== ACCESSORS =====

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn vertex_capacity(&self) -> usize {
        self.desc.vertex_capacity
    }

    pub fn index_capacity(&self) -> usize {
        self.desc.index_capacity
    }

    pub fn has_indices(&self) -> bool {
        self.desc.index_capacity > 0
    }

    /// True while the buffer's contents live only in a CPU backup
    pub fn is_backed_up(&self) -> bool {
        self.vertex_handle.is_none()
    }

    /// Whether derived data cached against this buffer is still valid
    pub fn is_cache_valid(&self) -> bool {
        self.cache_valid
    }

    pub fn set_cache_valid(&mut self, valid: bool) {
        self.cache_valid = valid;
    }

    // ===== BINDING =====

    /// Bind both regions for drawing. No-op when this buffer is already
    /// the bound one.
    pub fn bind(&self, ctx: &mut RenderContext) -> Result<()> {
        if ctx.bound_buffer() == Some(self.id) {
            return Ok(());
        }
        let vertex = match self.vertex_handle {
            Some(handle) => handle,
            None => engine_bail!(
                "ember::MeshBuffer",
                "cannot bind a backed-up buffer; restore it first"
            ),
        };
        ctx.device_mut().bind_buffer(BufferTarget::Vertex, vertex);
        if let Some(index) = self.index_handle {
            ctx.device_mut().bind_buffer(BufferTarget::Index, index);
        }
        ctx.set_bound_buffer(Some(self.id));
        Ok(())
    }

    // ===== LOCKING =====

    /// Lock the vertex region for CPU writes.
    ///
    /// The returned guard derefs to the full vertex byte range; dropping
    /// it unlocks (unmap or shadow flush).
    pub fn lock_vertex<'a>(&'a mut self, ctx: &'a mut RenderContext) -> Result<BufferLock<'a>> {
        self.bind(ctx)?;
        let handle = match self.vertex_handle {
            Some(handle) => handle,
            None => engine_bail!(
                "ember::MeshBuffer",
                "cannot lock a backed-up buffer; restore it first"
            ),
        };
        Self::lock_region(
            ctx,
            BufferTarget::Vertex,
            handle,
            self.desc.vertex_capacity,
            self.vertex_shadow.as_mut(),
        )
    }

    /// Lock the index region for CPU writes.
    ///
    /// Returns `Ok(None)` when the buffer was created without an index
    /// region.
    pub fn lock_index<'a>(
        &'a mut self,
        ctx: &'a mut RenderContext,
    ) -> Result<Option<BufferLock<'a>>> {
        if self.desc.index_capacity == 0 {
            return Ok(None);
        }
        self.bind(ctx)?;
        let handle = match self.index_handle {
            Some(handle) => handle,
            None => engine_bail!(
                "ember::MeshBuffer",
                "cannot lock a backed-up buffer; restore it first"
            ),
        };
        Self::lock_region(
            ctx,
            BufferTarget::Index,
            handle,
            self.desc.index_capacity,
            self.index_shadow.as_mut(),
        )
        .map(Some)
    }

    fn lock_region<'a>(
        ctx: &'a mut RenderContext,
        target: BufferTarget,
        handle: BufferHandle,
        capacity: usize,
        shadow: Option<&'a mut Vec<u8>>,
    ) -> Result<BufferLock<'a>> {
        if let Some(shadow) = shadow {
            return Ok(BufferLock {
                ctx,
                target,
                handle,
                mode: LockMode::Shadow { data: shadow },
            });
        }
        match ctx.device_mut().map_buffer(target, handle) {
            Some(ptr) => Ok(BufferLock {
                ctx,
                target,
                handle,
                mode: LockMode::Mapped { ptr, len: capacity },
            }),
            None => engine_bail!(
                "ember::MeshBuffer",
                "device refused to map {:?} buffer",
                target
            ),
        }
    }

    // ===== BACKUP / RESTORE =====

    /// Copy both regions to CPU memory and forget the GPU handles.
    ///
    /// Called when the GPU context is about to be (or was) lost; the old
    /// handles belong to the dead context and are not destroyed. No-op
    /// when already backed up.
    pub fn backup(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let vertex = match self.vertex_handle {
            Some(handle) => handle,
            None => return Ok(()),
        };
        self.bind(ctx)?;

        self.vertex_backup = Some(Self::read_region(
            ctx,
            BufferTarget::Vertex,
            vertex,
            self.desc.vertex_capacity,
            self.vertex_shadow.as_deref(),
        )?);
        if let Some(index) = self.index_handle {
            self.index_backup = Some(Self::read_region(
                ctx,
                BufferTarget::Index,
                index,
                self.desc.index_capacity,
                self.index_shadow.as_deref(),
            )?);
        }

        self.vertex_handle = None;
        self.index_handle = None;
        self.cache_valid = false;
        if ctx.bound_buffer() == Some(self.id) {
            ctx.set_bound_buffer(None);
        }
        Ok(())
    }

    /// Recreate GPU storage on the new context and re-upload the backed
    /// up contents, freeing the backups. No-op without a backup.
    pub fn restore(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let vertex_backup = match self.vertex_backup.take() {
            Some(backup) => backup,
            None => return Ok(()),
        };

        let vertex_handle =
            ctx.device_mut()
                .create_buffer(BufferTarget::Vertex, self.desc.vertex_capacity, self.desc.usage)?;
        ctx.device_mut()
            .upload_buffer(BufferTarget::Vertex, vertex_handle, &vertex_backup)?;
        if let Some(shadow) = self.vertex_shadow.as_mut() {
            shadow.copy_from_slice(&vertex_backup);
        }
        self.vertex_handle = Some(vertex_handle);

        if let Some(index_backup) = self.index_backup.take() {
            let index_handle = ctx.device_mut().create_buffer(
                BufferTarget::Index,
                self.desc.index_capacity,
                self.desc.usage,
            )?;
            ctx.device_mut()
                .upload_buffer(BufferTarget::Index, index_handle, &index_backup)?;
            if let Some(shadow) = self.index_shadow.as_mut() {
                shadow.copy_from_slice(&index_backup);
            }
            self.index_handle = Some(index_handle);
        }

        engine_trace!("ember::MeshBuffer", "restored buffer after context loss");
        Ok(())
    }

    fn read_region(
        ctx: &mut RenderContext,
        target: BufferTarget,
        handle: BufferHandle,
        capacity: usize,
        shadow: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        if let Some(shadow) = shadow {
            return Ok(shadow.to_vec());
        }
        match ctx.device_mut().map_buffer(target, handle) {
            Some(ptr) => {
                let data = unsafe { std::slice::from_raw_parts(ptr, capacity) }.to_vec();
                ctx.device_mut().unmap_buffer(target, handle);
                Ok(data)
            }
            None => engine_bail!(
                "ember::MeshBuffer",
                "device refused to map {:?} buffer for backup",
                target
            ),
        }
    }
}

impl Drop for MeshBuffer {
    fn drop(&mut self) {
        // GPU handles may only be released on the render thread; queue
        // them and let the render system flush the queue.
        if let Ok(mut registry) = self.registry.lock() {
            registry.release(
                self.key,
                self.id,
                self.vertex_handle.take(),
                self.index_handle.take(),
            );
        }
    }
}

// ===== BUFFER LOCK =====

enum LockMode<'a> {
    /// Direct pointer into mapped GPU memory
    Mapped { ptr: *mut u8, len: usize },
    /// CPU shadow copy, flushed with one upload on drop
    Shadow { data: &'a mut Vec<u8> },
}

/// RAII lock over one region of a `MeshBuffer`.
///
/// Derefs to the region's full byte range. Dropping the guard unlocks:
/// unmap for mapped locks, a single upload for shadow locks.
pub struct BufferLock<'a> {
    ctx: &'a mut RenderContext,
    target: BufferTarget,
    handle: BufferHandle,
    mode: LockMode<'a>,
}

impl Deref for BufferLock<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.mode {
            LockMode::Mapped { ptr, len } => unsafe { std::slice::from_raw_parts(*ptr, *len) },
            LockMode::Shadow { data } => data,
        }
    }
}

impl DerefMut for BufferLock<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.mode {
            LockMode::Mapped { ptr, len } => unsafe {
                std::slice::from_raw_parts_mut(*ptr, *len)
            },
            LockMode::Shadow { data } => data,
        }
    }
}

impl Drop for BufferLock<'_> {
    fn drop(&mut self) {
        match &self.mode {
            LockMode::Mapped { .. } => {
                self.ctx.device_mut().unmap_buffer(self.target, self.handle);
            }
            LockMode::Shadow { data } => {
                if let Err(error) =
                    self.ctx
                        .device_mut()
                        .upload_buffer(self.target, self.handle, data)
                {
                    engine_error!(
                        "ember::MeshBuffer",
                        "shadow flush failed on unlock: {}",
                        error
                    );
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mesh_buffer_tests.rs"]
mod tests;

/// HeadlessDevice - in-memory GraphicsDevice backend
///
/// Buffers are real byte vectors, so lock/unlock and backup/restore
/// round-trip actual data. Handles are issued from one monotonic
/// counter that survives a simulated context loss; a restored resource
/// therefore always gets a handle it never had before, matching real
/// driver behavior closely enough for the engine's caching logic.

use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use ember_engine::buffer::BufferUsage;
use ember_engine::device::{
    BufferHandle, BufferTarget, CubemapFace, DeviceCapabilities, GraphicsDevice, ScissorRect,
    TextureHandle, TextureKind,
};
use ember_engine::texture::{FilterMode, ImageFormat, WrapMode};
use ember_engine::{Error, Result};

/// Stored state of one buffer object
struct BufferObject {
    data: Box<[u8]>,
    mapped: bool,
}

/// Stored state of one texture object
struct TextureObject {
    kind: TextureKind,
    /// One entry per uploaded face (a single entry for 2D textures)
    uploads: Vec<(Option<CubemapFace>, u32, u32, ImageFormat, usize)>,
    mipmapped: bool,
}

/// Counters exposed for assertions in integration tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    pub buffers_created: usize,
    pub buffers_destroyed: usize,
    pub textures_created: usize,
    pub textures_destroyed: usize,
    pub draws: usize,
    pub uploads: usize,
    pub binds: usize,
}

/// CPU-only graphics device
///
/// Use [`HeadlessDevice::new_shared`] when the owning render system
/// takes the device by value but the test still needs to inspect it.
pub struct HeadlessDevice {
    capabilities: DeviceCapabilities,
    buffers: FxHashMap<u32, BufferObject>,
    textures: FxHashMap<u32, TextureObject>,
    next_handle: u32,
    stats: HeadlessStats,

    bound_vertex: Option<BufferHandle>,
    bound_index: Option<BufferHandle>,
    active_unit: u32,
    scissor: Option<ScissorRect>,
    last_parameters: Option<(TextureKind, FilterMode, WrapMode, WrapMode)>,

    /// When true, buffer creation fails with OutOfMemory
    pub fail_next_allocation: bool,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    /// Create a device plus a second handle to the same device state.
    ///
    /// The returned [`SharedHeadlessDevice`] is handed to the render
    /// system; the `Arc` handle stays with the caller for inspecting
    /// stats and for `simulate_context_loss`.
    pub fn new_shared() -> (SharedHeadlessDevice, Arc<Mutex<HeadlessDevice>>) {
        Self::new_shared_with_capabilities(DeviceCapabilities::default())
    }

    /// Shared-handle variant of [`HeadlessDevice::with_capabilities`]
    pub fn new_shared_with_capabilities(
        capabilities: DeviceCapabilities,
    ) -> (SharedHeadlessDevice, Arc<Mutex<HeadlessDevice>>) {
        let inner = Arc::new(Mutex::new(Self::with_capabilities(capabilities)));
        (
            SharedHeadlessDevice {
                inner: inner.clone(),
            },
            inner,
        )
    }

    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            buffers: FxHashMap::default(),
            textures: FxHashMap::default(),
            next_handle: 1,
            stats: HeadlessStats::default(),
            bound_vertex: None,
            bound_index: None,
            active_unit: 0,
            scissor: None,
            last_parameters: None,
            fail_next_allocation: false,
        }
    }

    /// Call counters accumulated since creation
    pub fn stats(&self) -> HeadlessStats {
        self.stats
    }

    /// Number of live buffer objects
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live texture objects
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Bytes currently stored for a buffer handle
    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle.raw()).map(|object| &*object.data)
    }

    /// Unit selected by the last `set_active_unit` call
    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// Current scissor rectangle, if enabled
    pub fn scissor(&self) -> Option<ScissorRect> {
        self.scissor
    }

    /// Most recently applied sampling parameters
    pub fn last_parameters(&self) -> Option<(TextureKind, FilterMode, WrapMode, WrapMode)> {
        self.last_parameters
    }

    /// Number of image uploads a texture has received
    pub fn texture_upload_count(&self, handle: TextureHandle) -> usize {
        self.textures
            .get(&handle.raw())
            .map(|object| object.uploads.len())
            .unwrap_or(0)
    }

    /// Whether a texture has had its mip chain generated
    pub fn is_mipmapped(&self, handle: TextureHandle) -> bool {
        self.textures
            .get(&handle.raw())
            .map(|object| object.mipmapped)
            .unwrap_or(false)
    }

    /// Discard every GPU object as a real context loss would.
    ///
    /// The handle counter keeps counting, so objects created afterwards
    /// never reuse a pre-loss handle.
    pub fn simulate_context_loss(&mut self) {
        self.buffers.clear();
        self.textures.clear();
        self.bound_vertex = None;
        self.bound_index = None;
        self.active_unit = 0;
        self.scissor = None;
        self.last_parameters = None;
    }

    fn alloc_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn create_buffer(
        &mut self,
        _target: BufferTarget,
        capacity: usize,
        _usage: BufferUsage,
    ) -> Result<BufferHandle> {
        if self.fail_next_allocation {
            self.fail_next_allocation = false;
            return Err(Error::OutOfMemory);
        }
        let handle = self.alloc_handle();
        self.buffers.insert(
            handle,
            BufferObject {
                data: vec![0; capacity].into_boxed_slice(),
                mapped: false,
            },
        );
        self.stats.buffers_created += 1;
        Ok(BufferHandle::from_raw(handle))
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle.raw()).is_some() {
            self.stats.buffers_destroyed += 1;
        }
        if self.bound_vertex == Some(handle) {
            self.bound_vertex = None;
        }
        if self.bound_index == Some(handle) {
            self.bound_index = None;
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        self.stats.binds += 1;
        match target {
            BufferTarget::Vertex => self.bound_vertex = Some(handle),
            BufferTarget::Index => self.bound_index = Some(handle),
        }
    }

    fn upload_buffer(
        &mut self,
        _target: BufferTarget,
        handle: BufferHandle,
        data: &[u8],
    ) -> Result<()> {
        let object = self.buffers.get_mut(&handle.raw()).ok_or_else(|| {
            Error::InvalidResource(format!("unknown buffer handle {}", handle.raw()))
        })?;
        if data.len() > object.data.len() {
            return Err(Error::InvalidResource(format!(
                "upload of {} bytes exceeds buffer capacity {}",
                data.len(),
                object.data.len()
            )));
        }
        object.data[..data.len()].copy_from_slice(data);
        self.stats.uploads += 1;
        Ok(())
    }

    fn map_buffer(&mut self, _target: BufferTarget, handle: BufferHandle) -> Option<*mut u8> {
        if !self.capabilities.supports_map_buffer {
            return None;
        }
        let object = self.buffers.get_mut(&handle.raw())?;
        if object.mapped {
            return None;
        }
        object.mapped = true;
        Some(object.data.as_mut_ptr())
    }

    fn unmap_buffer(&mut self, _target: BufferTarget, handle: BufferHandle) {
        if let Some(object) = self.buffers.get_mut(&handle.raw()) {
            object.mapped = false;
        }
    }

    fn create_texture(&mut self, kind: TextureKind) -> Result<TextureHandle> {
        let handle = self.alloc_handle();
        self.textures.insert(
            handle,
            TextureObject {
                kind,
                uploads: Vec::new(),
                mipmapped: false,
            },
        );
        self.stats.textures_created += 1;
        Ok(TextureHandle::from_raw(handle))
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle.raw()).is_some() {
            self.stats.textures_destroyed += 1;
        }
    }

    fn set_active_unit(&mut self, unit: u32) {
        self.active_unit = unit;
    }

    fn bind_texture(&mut self, _kind: TextureKind, handle: Option<TextureHandle>) {
        if handle.is_some() {
            self.stats.binds += 1;
        }
    }

    fn upload_image(
        &mut self,
        handle: TextureHandle,
        face: Option<CubemapFace>,
        width: u32,
        height: u32,
        format: ImageFormat,
        pixels: &[u8],
    ) -> Result<()> {
        let object = self.textures.get_mut(&handle.raw()).ok_or_else(|| {
            Error::InvalidResource(format!("unknown texture handle {}", handle.raw()))
        })?;
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "{} pixel bytes for a {}x{} {:?} image, expected {}",
                pixels.len(),
                width,
                height,
                format,
                expected
            )));
        }
        match (object.kind, face) {
            (TextureKind::Texture2d, None) | (TextureKind::Cubemap, Some(_)) => {}
            _ => {
                return Err(Error::InvalidResource(
                    "face argument does not match texture kind".to_string(),
                ))
            }
        }
        object.uploads.push((face, width, height, format, pixels.len()));
        self.stats.uploads += 1;
        Ok(())
    }

    fn apply_texture_parameters(
        &mut self,
        kind: TextureKind,
        filter: FilterMode,
        wrap_s: WrapMode,
        wrap_t: WrapMode,
    ) {
        self.last_parameters = Some((kind, filter, wrap_s, wrap_t));
    }

    fn generate_mipmaps(&mut self, _kind: TextureKind, handle: TextureHandle) {
        if let Some(object) = self.textures.get_mut(&handle.raw()) {
            object.mipmapped = true;
        }
    }

    fn set_scissor(&mut self, rect: Option<ScissorRect>) {
        self.scissor = rect;
    }

    fn draw_indexed(&mut self, _first_index: u32, _index_count: u32) {
        self.stats.draws += 1;
    }
}

/// `GraphicsDevice` adapter over a shared [`HeadlessDevice`].
///
/// Every trait call locks the shared device and delegates. Mapped
/// buffer pointers stay valid across the lock because buffer storage
/// is heap-allocated and kept alive by the `Arc`.
pub struct SharedHeadlessDevice {
    inner: Arc<Mutex<HeadlessDevice>>,
}

impl SharedHeadlessDevice {
    fn lock(&self) -> MutexGuard<'_, HeadlessDevice> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GraphicsDevice for SharedHeadlessDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.lock().capabilities()
    }

    fn create_buffer(
        &mut self,
        target: BufferTarget,
        capacity: usize,
        usage: BufferUsage,
    ) -> Result<BufferHandle> {
        self.lock().create_buffer(target, capacity, usage)
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        self.lock().destroy_buffer(handle);
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        self.lock().bind_buffer(target, handle);
    }

    fn upload_buffer(
        &mut self,
        target: BufferTarget,
        handle: BufferHandle,
        data: &[u8],
    ) -> Result<()> {
        self.lock().upload_buffer(target, handle, data)
    }

    fn map_buffer(&mut self, target: BufferTarget, handle: BufferHandle) -> Option<*mut u8> {
        self.lock().map_buffer(target, handle)
    }

    fn unmap_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        self.lock().unmap_buffer(target, handle);
    }

    fn create_texture(&mut self, kind: TextureKind) -> Result<TextureHandle> {
        self.lock().create_texture(kind)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.lock().destroy_texture(handle);
    }

    fn set_active_unit(&mut self, unit: u32) {
        self.lock().set_active_unit(unit);
    }

    fn bind_texture(&mut self, kind: TextureKind, handle: Option<TextureHandle>) {
        self.lock().bind_texture(kind, handle);
    }

    fn upload_image(
        &mut self,
        handle: TextureHandle,
        face: Option<CubemapFace>,
        width: u32,
        height: u32,
        format: ImageFormat,
        pixels: &[u8],
    ) -> Result<()> {
        self.lock()
            .upload_image(handle, face, width, height, format, pixels)
    }

    fn apply_texture_parameters(
        &mut self,
        kind: TextureKind,
        filter: FilterMode,
        wrap_s: WrapMode,
        wrap_t: WrapMode,
    ) {
        self.lock()
            .apply_texture_parameters(kind, filter, wrap_s, wrap_t);
    }

    fn generate_mipmaps(&mut self, kind: TextureKind, handle: TextureHandle) {
        self.lock().generate_mipmaps(kind, handle);
    }

    fn set_scissor(&mut self, rect: Option<ScissorRect>) {
        self.lock().set_scissor(rect);
    }

    fn draw_indexed(&mut self, first_index: u32, index_count: u32) {
        self.lock().draw_indexed(first_index, index_count);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "headless_device_tests.rs"]
mod tests;

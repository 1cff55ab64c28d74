/// Mock graphics device for unit tests (no GPU required)
///
/// Records every trait call into a shared log so tests can assert which
/// device calls a code path issued (and, just as important, which it
/// skipped). Buffers store real bytes so lock/upload paths round-trip.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::buffer::BufferUsage;
use crate::device::{
    BufferHandle, BufferTarget, CubemapFace, DeviceCapabilities, GraphicsDevice, ScissorRect,
    TextureHandle, TextureKind,
};
use crate::error::Result;
use crate::texture::{FilterMode, ImageFormat, WrapMode};

/// Shared view of the calls a [`MockDevice`] has received.
///
/// Cloned out of the device before boxing it, so tests keep an observer
/// after ownership moves into the `RenderContext`.
#[derive(Clone)]
pub struct MockCallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCallLog {
    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose name starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Discard all recorded calls
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

/// In-memory recording device
pub struct MockDevice {
    capabilities: DeviceCapabilities,
    log: MockCallLog,
    buffers: HashMap<u32, Vec<u8>>,
    textures: Vec<u32>,
    next_handle: u32,
    /// When true, create_buffer fails with OutOfMemory
    pub fail_buffer_creation: bool,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            log: MockCallLog {
                calls: Arc::new(Mutex::new(Vec::new())),
            },
            buffers: HashMap::new(),
            textures: Vec::new(),
            next_handle: 1,
            fail_buffer_creation: false,
        }
    }

    /// Clone the shared call log (call before boxing the device)
    pub fn call_log(&self) -> MockCallLog {
        self.log.clone()
    }

    /// Bytes currently stored for a buffer handle
    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle.raw()).map(|data| data.as_slice())
    }

    fn alloc_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl GraphicsDevice for MockDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn create_buffer(
        &mut self,
        target: BufferTarget,
        capacity: usize,
        usage: BufferUsage,
    ) -> Result<BufferHandle> {
        if self.fail_buffer_creation {
            self.log.record("create_buffer(failed)".to_string());
            return Err(crate::error::Error::OutOfMemory);
        }
        let handle = self.alloc_handle();
        self.buffers.insert(handle, vec![0; capacity]);
        self.log.record(format!(
            "create_buffer({:?}, {}, {:?}) -> {}",
            target, capacity, usage, handle
        ));
        Ok(BufferHandle::from_raw(handle))
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle.raw());
        self.log.record(format!("destroy_buffer({})", handle.raw()));
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        self.log
            .record(format!("bind_buffer({:?}, {})", target, handle.raw()));
    }

    fn upload_buffer(
        &mut self,
        target: BufferTarget,
        handle: BufferHandle,
        data: &[u8],
    ) -> Result<()> {
        if let Some(storage) = self.buffers.get_mut(&handle.raw()) {
            storage.clear();
            storage.extend_from_slice(data);
        }
        self.log.record(format!(
            "upload_buffer({:?}, {}, {} bytes)",
            target,
            handle.raw(),
            data.len()
        ));
        Ok(())
    }

    fn map_buffer(&mut self, target: BufferTarget, handle: BufferHandle) -> Option<*mut u8> {
        if !self.capabilities.supports_map_buffer {
            return None;
        }
        self.log
            .record(format!("map_buffer({:?}, {})", target, handle.raw()));
        self.buffers
            .get_mut(&handle.raw())
            .map(|data| data.as_mut_ptr())
    }

    fn unmap_buffer(&mut self, target: BufferTarget, handle: BufferHandle) {
        self.log
            .record(format!("unmap_buffer({:?}, {})", target, handle.raw()));
    }

    fn create_texture(&mut self, kind: TextureKind) -> Result<TextureHandle> {
        let handle = self.alloc_handle();
        self.textures.push(handle);
        self.log
            .record(format!("create_texture({:?}) -> {}", kind, handle));
        Ok(TextureHandle::from_raw(handle))
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.textures.retain(|&raw| raw != handle.raw());
        self.log
            .record(format!("destroy_texture({})", handle.raw()));
    }

    fn set_active_unit(&mut self, unit: u32) {
        self.log.record(format!("set_active_unit({})", unit));
    }

    fn bind_texture(&mut self, kind: TextureKind, handle: Option<TextureHandle>) {
        match handle {
            Some(handle) => self
                .log
                .record(format!("bind_texture({:?}, {})", kind, handle.raw())),
            None => self.log.record(format!("bind_texture({:?}, none)", kind)),
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
        self.log.record(format!(
            "upload_image({}, {:?}, {}x{}, {:?}, {} bytes)",
            handle.raw(),
            face,
            width,
            height,
            format,
            pixels.len()
        ));
        Ok(())
    }

    fn apply_texture_parameters(
        &mut self,
        kind: TextureKind,
        filter: FilterMode,
        wrap_s: WrapMode,
        wrap_t: WrapMode,
    ) {
        self.log.record(format!(
            "apply_texture_parameters({:?}, {:?}, {:?}, {:?})",
            kind, filter, wrap_s, wrap_t
        ));
    }

    fn generate_mipmaps(&mut self, kind: TextureKind, handle: TextureHandle) {
        self.log
            .record(format!("generate_mipmaps({:?}, {})", kind, handle.raw()));
    }

    fn set_scissor(&mut self, rect: Option<ScissorRect>) {
        match rect {
            Some(rect) => self.log.record(format!(
                "set_scissor({}, {}, {}, {})",
                rect.x, rect.y, rect.width, rect.height
            )),
            None => self.log.record("set_scissor(none)".to_string()),
        }
    }

    fn draw_indexed(&mut self, first_index: u32, index_count: u32) {
        self.log
            .record(format!("draw_indexed({}, {})", first_index, index_count));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;

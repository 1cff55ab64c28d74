/// GraphicsDevice trait - raw GPU binding primitives
///
/// This is the boundary between the rendering core and the platform
/// backends. The core never talks to the driver directly: every bind,
/// upload, map and draw goes through this trait, so the whole pipeline
/// can run against the headless backend in tests.

use crate::buffer::BufferUsage;
use crate::error::Result;
use crate::texture::{FilterMode, ImageFormat, WrapMode};

/// Opaque GPU buffer object handle issued by a backend.
///
/// Handles are only meaningful on the context that issued them; after a
/// context loss a restored buffer gets a fresh handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    /// Wrap a raw backend handle value
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw backend handle value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Opaque GPU texture object handle issued by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Wrap a raw backend handle value
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw backend handle value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Which of a mesh buffer's two data regions an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex data region
    Vertex,
    /// Index data region
    Index,
}

/// GPU image object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Single 2D image
    Texture2d,
    /// Six-faced cubemap
    Cubemap,
}

/// Cubemap face identifiers, in upload order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubemapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubemapFace {
    /// The fixed face order expected by `Cubemap::build`:
    /// +X, -X, +Y, -Y, +Z, -Z
    pub const ORDER: [CubemapFace; 6] = [
        CubemapFace::PositiveX,
        CubemapFace::NegativeX,
        CubemapFace::PositiveY,
        CubemapFace::NegativeY,
        CubemapFace::PositiveZ,
        CubemapFace::NegativeZ,
    ];

    /// Index of this face within [`CubemapFace::ORDER`]
    pub fn index(&self) -> usize {
        match self {
            CubemapFace::PositiveX => 0,
            CubemapFace::NegativeX => 1,
            CubemapFace::PositiveY => 2,
            CubemapFace::NegativeY => 3,
            CubemapFace::PositiveZ => 4,
            CubemapFace::NegativeZ => 5,
        }
    }
}

/// Scissor rectangle in framebuffer pixels (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Static capabilities of a device, queried once at context creation
#[derive(Debug, Clone, Copy)]
pub struct DeviceCapabilities {
    /// Number of texture units the hardware exposes
    pub max_texture_units: u32,
    /// Maximum texture dimension (width or height) in pixels
    pub max_texture_size: u32,
    /// Whether non-power-of-two texture dimensions are supported
    pub supports_npot: bool,
    /// Whether buffer memory can be mapped for direct CPU writes.
    /// When false, mesh buffers fall back to shadow copies.
    pub supports_map_buffer: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_texture_units: 8,
            max_texture_size: 4096,
            supports_npot: true,
            supports_map_buffer: true,
        }
    }
}

/// Raw GPU primitives implemented by each backend.
///
/// All methods must be called from the render thread that owns the GPU
/// context; the trait is `Send` only so a `RenderSystem` can be parked in
/// the engine singleton between frames.
pub trait GraphicsDevice: Send {
    /// Device capabilities (stable for the lifetime of the device)
    fn capabilities(&self) -> DeviceCapabilities;

    // ===== BUFFERS =====

    /// Allocate GPU-side buffer storage of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// `Error::OutOfMemory` when the allocation fails. Not retried by the
    /// core; the failure propagates to the caller's resource-build step.
    fn create_buffer(
        &mut self,
        target: BufferTarget,
        capacity: usize,
        usage: BufferUsage,
    ) -> Result<BufferHandle>;

    /// Release a GPU buffer object. Stale handles are ignored.
    fn destroy_buffer(&mut self, handle: BufferHandle);

    /// Bind a buffer to the given target
    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle);

    /// Replace the buffer's contents with `data` (shadow-copy flush path)
    fn upload_buffer(
        &mut self,
        target: BufferTarget,
        handle: BufferHandle,
        data: &[u8],
    ) -> Result<()>;

    /// Map the buffer's memory for direct CPU writes.
    ///
    /// Returns `None` when mapping is unsupported or the handle is stale.
    /// The pointer stays valid until the matching [`unmap_buffer`] call;
    /// no other call for the same handle may be issued while mapped.
    ///
    /// [`unmap_buffer`]: GraphicsDevice::unmap_buffer
    fn map_buffer(&mut self, target: BufferTarget, handle: BufferHandle) -> Option<*mut u8>;

    /// Release a mapping obtained from [`GraphicsDevice::map_buffer`]
    fn unmap_buffer(&mut self, target: BufferTarget, handle: BufferHandle);

    // ===== TEXTURES =====

    /// Allocate a GPU image object
    fn create_texture(&mut self, kind: TextureKind) -> Result<TextureHandle>;

    /// Release a GPU image object. Stale handles are ignored.
    fn destroy_texture(&mut self, handle: TextureHandle);

    /// Select the active texture unit for subsequent bind calls
    fn set_active_unit(&mut self, unit: u32);

    /// Bind a texture to the active unit, or clear the binding with `None`
    fn bind_texture(&mut self, kind: TextureKind, handle: Option<TextureHandle>);

    /// Upload pixel data to a texture or to one cubemap face.
    ///
    /// `face` is `None` for 2D textures and `Some(face)` for cubemaps.
    /// The texture must be bound to the active unit.
    fn upload_image(
        &mut self,
        handle: TextureHandle,
        face: Option<CubemapFace>,
        width: u32,
        height: u32,
        format: ImageFormat,
        pixels: &[u8],
    ) -> Result<()>;

    /// Apply filter and wrap parameters to the texture bound to the
    /// active unit
    fn apply_texture_parameters(
        &mut self,
        kind: TextureKind,
        filter: FilterMode,
        wrap_s: WrapMode,
        wrap_t: WrapMode,
    );

    /// Generate the mip chain for the texture bound to the active unit
    fn generate_mipmaps(&mut self, kind: TextureKind, handle: TextureHandle);

    // ===== DRAW STATE =====

    /// Set or clear the scissor rectangle
    fn set_scissor(&mut self, rect: Option<ScissorRect>);

    /// Draw `index_count` indices starting at `first_index` from the
    /// currently bound vertex/index buffers
    fn draw_indexed(&mut self, first_index: u32, index_count: u32);
}

/// 2D texture resource with deferred parameter application
///
/// Binding is cached through the context's texture unit table: binding a
/// texture already resident on the requested unit issues no device calls
/// unless sampling parameters changed since the last bind, in which case
/// only the parameter update is issued. `set_filter_mode`/`set_wrap_mode`
/// never touch the device directly.

use crate::device::{RenderContext, TextureHandle, TextureId, TextureKind};
use crate::error::Result;
use crate::texture::{FilterMode, ImageData, WrapMode};
use crate::{engine_bail, engine_warn};

// ===== TEXTURE DESC =====

/// Initial sampling parameters for a texture or cubemap
#[derive(Debug, Clone, Copy)]
pub struct TextureDesc {
    pub filter: FilterMode,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// Generate a mip chain at build time
    pub mipmapped: bool,
}

impl Default for TextureDesc {
    fn default() -> Self {
        Self {
            filter: FilterMode::Bilinear,
            wrap_s: WrapMode::Clamp,
            wrap_t: WrapMode::Clamp,
            mipmapped: false,
        }
    }
}

// ===== TEXTURE RESOURCE TRAIT =====

/// Shared surface of 2D textures and cubemaps, as consumed by materials
pub trait TextureResource {
    /// Bind to the given texture unit (cached, cheap when already bound)
    fn bind(&mut self, ctx: &mut RenderContext, unit: u32) -> Result<()>;

    /// Remove this resource from every unit it occupies
    fn unbind(&mut self, ctx: &mut RenderContext);

    /// Change filtering; applied on the next bind
    fn set_filter_mode(&mut self, filter: FilterMode);

    /// Change wrapping; applied on the next bind
    fn set_wrap_mode(&mut self, wrap_s: WrapMode, wrap_t: WrapMode);

    /// Destroy the GPU object, returning to the unbuilt state
    fn reset(&mut self, ctx: &mut RenderContext);

    fn is_built(&self) -> bool;
}

// ===== SHARED STATE =====

/// State shared between `Texture` and `Cubemap`
pub(crate) struct TextureCommon {
    pub(crate) kind: TextureKind,
    pub(crate) id: Option<TextureId>,
    pub(crate) handle: Option<TextureHandle>,
    pub(crate) filter: FilterMode,
    pub(crate) wrap_s: WrapMode,
    pub(crate) wrap_t: WrapMode,
    pub(crate) mipmapped: bool,
    pub(crate) params_dirty: bool,
}

impl TextureCommon {
    pub(crate) fn new(kind: TextureKind, desc: TextureDesc) -> Self {
        Self {
            kind,
            id: None,
            handle: None,
            filter: desc.filter,
            wrap_s: desc.wrap_s,
            wrap_t: desc.wrap_t,
            mipmapped: desc.mipmapped,
            params_dirty: false,
        }
    }

    pub(crate) fn is_built(&self) -> bool {
        self.handle.is_some()
    }

    /// Allocate the GPU object and bind it on unit 0 for upload.
    /// Returns the fresh handle.
    pub(crate) fn begin_build(
        &mut self,
        ctx: &mut RenderContext,
        source: &str,
    ) -> Result<TextureHandle> {
        if self.is_built() {
            return Err(crate::engine_err!(
                source,
                "already built; reset before rebuilding"
            ));
        }
        let handle = ctx.device_mut().create_texture(self.kind)?;
        let id = ctx.alloc_texture_id();
        ctx.set_active_unit(0);
        ctx.device_mut().bind_texture(self.kind, Some(handle));
        ctx.set_texture_unit(0, Some(id));
        self.handle = Some(handle);
        self.id = Some(id);
        Ok(handle)
    }

    /// Apply initial parameters and mipmaps after face uploads
    pub(crate) fn finish_build(&mut self, ctx: &mut RenderContext) {
        ctx.device_mut()
            .apply_texture_parameters(self.kind, self.filter, self.wrap_s, self.wrap_t);
        self.params_dirty = false;
        if self.mipmapped {
            if let Some(handle) = self.handle {
                ctx.device_mut().generate_mipmaps(self.kind, handle);
            }
        }
    }

    /// Warn about images the device handles poorly, without failing the
    /// build
    pub(crate) fn check_image(ctx: &RenderContext, image: &ImageData, source: &str) {
        let caps = ctx.capabilities();
        if !caps.supports_npot && !image.is_power_of_two() {
            engine_warn!(
                source,
                "{}x{} image is non-power-of-two on a device without NPOT support",
                image.width,
                image.height
            );
        }
        if image.width > caps.max_texture_size || image.height > caps.max_texture_size {
            engine_warn!(
                source,
                "{}x{} image exceeds the device maximum of {}",
                image.width,
                image.height,
                caps.max_texture_size
            );
        }
    }

    pub(crate) fn bind(
        &mut self,
        ctx: &mut RenderContext,
        unit: u32,
        source: &str,
    ) -> Result<()> {
        let (id, handle) = match (self.id, self.handle) {
            (Some(id), Some(handle)) => (id, handle),
            _ => {
                return Err(crate::engine_err!(source, "cannot bind an unbuilt resource"))
            }
        };

        let unit = ctx.clamp_unit(unit);
        let resident = ctx.texture_unit(unit) == Some(id);
        if resident && !self.params_dirty {
            return Ok(());
        }

        ctx.set_active_unit(unit);
        if !resident {
            ctx.device_mut().bind_texture(self.kind, Some(handle));
            ctx.set_texture_unit(unit, Some(id));
        }
        if self.params_dirty {
            ctx.device_mut()
                .apply_texture_parameters(self.kind, self.filter, self.wrap_s, self.wrap_t);
            self.params_dirty = false;
        }
        Ok(())
    }

    pub(crate) fn unbind(&mut self, ctx: &mut RenderContext) {
        let id = match self.id {
            Some(id) => id,
            None => return,
        };
        for unit in ctx.clear_units_for(id) {
            ctx.set_active_unit(unit);
            ctx.device_mut().bind_texture(self.kind, None);
        }
    }

    pub(crate) fn set_filter_mode(&mut self, filter: FilterMode) {
        if self.filter != filter {
            self.filter = filter;
            self.params_dirty = true;
        }
    }

    pub(crate) fn set_wrap_mode(&mut self, wrap_s: WrapMode, wrap_t: WrapMode) {
        if self.wrap_s != wrap_s || self.wrap_t != wrap_t {
            self.wrap_s = wrap_s;
            self.wrap_t = wrap_t;
            self.params_dirty = true;
        }
    }

    pub(crate) fn reset(&mut self, ctx: &mut RenderContext) {
        self.unbind(ctx);
        if let Some(handle) = self.handle.take() {
            ctx.device_mut().destroy_texture(handle);
        }
        self.id = None;
        self.params_dirty = false;
    }
}

// ===== TEXTURE =====

/// 2D texture resource
pub struct Texture {
    common: TextureCommon,
    width: u32,
    height: u32,
}

const SOURCE: &str = "ember::Texture";

impl Texture {
    /// Create an unbuilt texture with the given sampling parameters
    pub fn new(desc: TextureDesc) -> Self {
        Self {
            common: TextureCommon::new(TextureKind::Texture2d, desc),
            width: 0,
            height: 0,
        }
    }

    /// Upload image data, creating the GPU object.
    ///
    /// # Errors
    ///
    /// Fails when already built or when `image.pixels` does not match
    /// the stated dimensions. Oversize and NPOT images only warn.
    pub fn build(&mut self, ctx: &mut RenderContext, image: &ImageData) -> Result<()> {
        if image.pixels.len() != image.expected_len() {
            engine_bail!(
                SOURCE,
                "pixel data is {} bytes, expected {} for {}x{} {:?}",
                image.pixels.len(),
                image.expected_len(),
                image.width,
                image.height,
                image.format
            );
        }
        TextureCommon::check_image(ctx, image, SOURCE);

        let handle = self.common.begin_build(ctx, SOURCE)?;
        ctx.device_mut().upload_image(
            handle,
            None,
            image.width,
            image.height,
            image.format,
            &image.pixels,
        )?;
        self.common.finish_build(ctx);

        self.width = image.width;
        self.height = image.height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.common.filter
    }

    pub fn wrap_mode(&self) -> (WrapMode, WrapMode) {
        (self.common.wrap_s, self.common.wrap_t)
    }

    pub(crate) fn id(&self) -> Option<crate::device::TextureId> {
        self.common.id
    }
}

impl TextureResource for Texture {
    fn bind(&mut self, ctx: &mut RenderContext, unit: u32) -> Result<()> {
        self.common.bind(ctx, unit, SOURCE)
    }

    fn unbind(&mut self, ctx: &mut RenderContext) {
        self.common.unbind(ctx)
    }

    fn set_filter_mode(&mut self, filter: FilterMode) {
        self.common.set_filter_mode(filter)
    }

    fn set_wrap_mode(&mut self, wrap_s: WrapMode, wrap_t: WrapMode) {
        self.common.set_wrap_mode(wrap_s, wrap_t)
    }

    fn reset(&mut self, ctx: &mut RenderContext) {
        self.common.reset(ctx);
        self.width = 0;
        self.height = 0;
    }

    fn is_built(&self) -> bool {
        self.common.is_built()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if self.common.is_built() {
            engine_warn!(SOURCE, "texture dropped while still built; GPU object leaked");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;

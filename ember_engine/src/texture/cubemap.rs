/// Cubemap resource
///
/// Built from six face images supplied in the fixed order
/// +X, -X, +Y, -Y, +Z, -Z. Shares binding, parameter and lifecycle
/// behavior with `Texture` through `TextureCommon`.

use crate::device::{CubemapFace, RenderContext, TextureKind};
use crate::error::Result;
use crate::texture::{
    FilterMode, ImageData, TextureCommon, TextureDesc, TextureResource, WrapMode,
};
use crate::engine_bail;

const SOURCE: &str = "ember::Cubemap";

/// Six-faced cubemap texture
pub struct Cubemap {
    common: TextureCommon,
    face_size: u32,
}

impl Cubemap {
    /// Create an unbuilt cubemap with the given sampling parameters
    pub fn new(desc: TextureDesc) -> Self {
        Self {
            common: TextureCommon::new(TextureKind::Cubemap, desc),
            face_size: 0,
        }
    }

    /// Upload the six face images in +X, -X, +Y, -Y, +Z, -Z order.
    ///
    /// # Errors
    ///
    /// Fails when already built, when faces are not square, when the
    /// faces disagree in size or format, or when pixel data does not
    /// match the stated dimensions.
    pub fn build(&mut self, ctx: &mut RenderContext, faces: &[ImageData; 6]) -> Result<()> {
        let first = &faces[0];
        if first.width != first.height {
            engine_bail!(
                SOURCE,
                "faces must be square, got {}x{}",
                first.width,
                first.height
            );
        }
        for (face, image) in CubemapFace::ORDER.iter().zip(faces.iter()) {
            if image.width != first.width
                || image.height != first.height
                || image.format != first.format
            {
                engine_bail!(
                    SOURCE,
                    "face {:?} does not match the first face ({}x{} {:?})",
                    face,
                    first.width,
                    first.height,
                    first.format
                );
            }
            if image.pixels.len() != image.expected_len() {
                engine_bail!(
                    SOURCE,
                    "face {:?} pixel data is {} bytes, expected {}",
                    face,
                    image.pixels.len(),
                    image.expected_len()
                );
            }
        }
        TextureCommon::check_image(ctx, first, SOURCE);

        let handle = self.common.begin_build(ctx, SOURCE)?;
        for (face, image) in CubemapFace::ORDER.iter().zip(faces.iter()) {
            ctx.device_mut().upload_image(
                handle,
                Some(*face),
                image.width,
                image.height,
                image.format,
                &image.pixels,
            )?;
        }
        self.common.finish_build(ctx);

        self.face_size = first.width;
        Ok(())
    }

    /// Edge length of each face in pixels
    pub fn face_size(&self) -> u32 {
        self.face_size
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.common.filter
    }

    pub fn wrap_mode(&self) -> (WrapMode, WrapMode) {
        (self.common.wrap_s, self.common.wrap_t)
    }
}

impl TextureResource for Cubemap {
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
        self.face_size = 0;
    }

    fn is_built(&self) -> bool {
        self.common.is_built()
    }
}

impl Drop for Cubemap {
    fn drop(&mut self) {
        if self.common.is_built() {
            crate::engine_warn!(SOURCE, "cubemap dropped while still built; GPU object leaked");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "cubemap_tests.rs"]
mod tests;

/// Sprite submission data and the packed vertex layout

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};

use crate::render::Material;

/// Vertex layout shared by every sprite batch
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 4],
    pub uv: [f32; 2],
    pub colour: [f32; 4],
}

/// Vertices per sprite quad
pub const VERTICES_PER_SPRITE: usize = 4;
/// Indices per sprite quad (two triangles)
pub const INDICES_PER_SPRITE: usize = 6;

/// Index pattern of one quad, relative to its first vertex
pub(crate) const QUAD_INDICES: [u16; INDICES_PER_SPRITE] = [0, 1, 2, 2, 1, 3];

/// Sub-rectangle of a texture in normalised coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u: f32,
    pub v: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for UvRect {
    fn default() -> Self {
        Self {
            u: 0.0,
            v: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

/// One sprite submitted to the batcher for the current frame
#[derive(Clone)]
pub struct SpriteData {
    pub material: Arc<Material>,
    /// Local-to-world transform applied to the quad corners
    pub transform: Mat4,
    /// Quad size in local units
    pub size: Vec2,
    pub uvs: UvRect,
    pub colour: [f32; 4],
}

impl SpriteData {
    /// Expand into the quad's four corner vertices:
    /// top-left, top-right, bottom-left, bottom-right
    pub(crate) fn vertices(&self) -> [SpriteVertex; VERTICES_PER_SPRITE] {
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(self.size.x, 0.0),
            Vec2::new(0.0, self.size.y),
            Vec2::new(self.size.x, self.size.y),
        ];
        let uv_corners = [
            (self.uvs.u, self.uvs.v),
            (self.uvs.u + self.uvs.width, self.uvs.v),
            (self.uvs.u, self.uvs.v + self.uvs.height),
            (self.uvs.u + self.uvs.width, self.uvs.v + self.uvs.height),
        ];

        std::array::from_fn(|i| {
            let corner = corners[i];
            let position = self.transform * Vec4::new(corner.x, corner.y, 0.0, 1.0);
            SpriteVertex {
                position: position.to_array(),
                uv: [uv_corners[i].0, uv_corners[i].1],
                colour: self.colour,
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "sprite_tests.rs"]
mod tests;

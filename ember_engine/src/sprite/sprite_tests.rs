//! Unit tests for sprite.rs

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};

use crate::render::Material;
use crate::sprite::{SpriteData, UvRect, QUAD_INDICES};

fn sprite(transform: Mat4) -> SpriteData {
    SpriteData {
        material: Arc::new(Material::new("test")),
        transform,
        size: Vec2::new(2.0, 4.0),
        uvs: UvRect::default(),
        colour: [1.0, 0.5, 0.25, 1.0],
    }
}

#[test]
fn test_vertices_cover_the_quad_corners() {
    let vertices = sprite(Mat4::IDENTITY).vertices();

    assert_eq!(vertices[0].position, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(vertices[1].position, [2.0, 0.0, 0.0, 1.0]);
    assert_eq!(vertices[2].position, [0.0, 4.0, 0.0, 1.0]);
    assert_eq!(vertices[3].position, [2.0, 4.0, 0.0, 1.0]);
}

#[test]
fn test_vertices_apply_the_transform() {
    let vertices = sprite(Mat4::from_translation(Vec3::new(10.0, 20.0, 0.0))).vertices();
    assert_eq!(vertices[0].position, [10.0, 20.0, 0.0, 1.0]);
    assert_eq!(vertices[3].position, [12.0, 24.0, 0.0, 1.0]);
}

#[test]
fn test_vertices_carry_uv_subrect_and_colour() {
    let mut data = sprite(Mat4::IDENTITY);
    data.uvs = UvRect {
        u: 0.25,
        v: 0.5,
        width: 0.5,
        height: 0.25,
    };
    let vertices = data.vertices();

    assert_eq!(vertices[0].uv, [0.25, 0.5]);
    assert_eq!(vertices[1].uv, [0.75, 0.5]);
    assert_eq!(vertices[2].uv, [0.25, 0.75]);
    assert_eq!(vertices[3].uv, [0.75, 0.75]);
    for vertex in &vertices {
        assert_eq!(vertex.colour, [1.0, 0.5, 0.25, 1.0]);
    }
}

#[test]
fn test_quad_index_pattern_forms_two_triangles() {
    assert_eq!(QUAD_INDICES, [0, 1, 2, 2, 1, 3]);
}

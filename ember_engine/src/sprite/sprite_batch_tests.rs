//! Unit tests for sprite_batch.rs

use std::sync::{Arc, Mutex};

use glam::{Mat4, Vec2};

use crate::buffer::BufferRegistry;
use crate::device::mock_device::{MockCallLog, MockDevice};
use crate::device::RenderContext;
use crate::render::Material;
use crate::sprite::{SpriteBatch, SpriteData, SpriteVertex, UvRect, VERTICES_PER_SPRITE};

fn make_context() -> (RenderContext, MockCallLog) {
    let device = MockDevice::new();
    let log = device.call_log();
    (RenderContext::new(Box::new(device)), log)
}

fn sprite() -> SpriteData {
    SpriteData {
        material: Arc::new(Material::new("batch")),
        transform: Mat4::IDENTITY,
        size: Vec2::ONE,
        uvs: UvRect::default(),
        colour: [1.0; 4],
    }
}

#[test]
fn test_build_prefills_index_pattern() {
    let (mut ctx, log) = make_context();
    let registry = Arc::new(Mutex::new(BufferRegistry::new()));
    let _batch = SpriteBatch::build(&mut ctx, registry, 8).unwrap();

    // Vertex and index buffers allocated, index pattern written once
    assert_eq!(log.count("create_buffer"), 2);
    assert_eq!(log.count("map_buffer"), 1);
}

#[test]
fn test_build_rejects_capacity_beyond_u16_indices() {
    let (mut ctx, _log) = make_context();
    let registry = Arc::new(Mutex::new(BufferRegistry::new()));
    assert!(SpriteBatch::build(&mut ctx, registry, 20_000).is_err());
}

#[test]
fn test_fill_packs_vertices_and_counts() {
    let (mut ctx, _log) = make_context();
    let registry = Arc::new(Mutex::new(BufferRegistry::new()));
    let mut batch = SpriteBatch::build(&mut ctx, registry, 4).unwrap();

    batch.fill(&mut ctx, &[sprite(), sprite()]).unwrap();
    // Two sprites packed: drawing both is valid, a third is not
    assert!(batch.draw(&mut ctx, 0, 2).is_ok());
    assert!(batch.draw(&mut ctx, 0, 3).is_err());
}

#[test]
fn test_fill_rejects_overflow() {
    let (mut ctx, _log) = make_context();
    let registry = Arc::new(Mutex::new(BufferRegistry::new()));
    let mut batch = SpriteBatch::build(&mut ctx, registry, 1).unwrap();
    assert!(batch.fill(&mut ctx, &[sprite(), sprite()]).is_err());
}

#[test]
fn test_draw_issues_offset_and_count_in_indices() {
    let (mut ctx, log) = make_context();
    let registry = Arc::new(Mutex::new(BufferRegistry::new()));
    let mut batch = SpriteBatch::build(&mut ctx, registry, 4).unwrap();
    batch.fill(&mut ctx, &[sprite(), sprite(), sprite()]).unwrap();
    log.clear();

    batch.draw(&mut ctx, 1, 2).unwrap();
    assert!(log.calls().contains(&"draw_indexed(6, 12)".to_string()));
}

#[test]
fn test_draw_rejects_range_beyond_fill() {
    let (mut ctx, _log) = make_context();
    let registry = Arc::new(Mutex::new(BufferRegistry::new()));
    let mut batch = SpriteBatch::build(&mut ctx, registry, 4).unwrap();
    batch.fill(&mut ctx, &[sprite()]).unwrap();
    assert!(batch.draw(&mut ctx, 0, 2).is_err());
}

#[test]
fn test_vertex_layout_is_densely_packed() {
    assert_eq!(
        std::mem::size_of::<SpriteVertex>(),
        (4 + 2 + 4) * std::mem::size_of::<f32>()
    );
    assert_eq!(VERTICES_PER_SPRITE, 4);
}

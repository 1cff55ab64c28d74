//! Integration tests for the dynamic sprite batcher over the headless backend
//!
//! Run with: cargo test --test batcher_integration_tests
//!
//! Asserts the coalescing rules through real device draw counters: one
//! draw per run of same-material sprites, runs split on material change
//! or scissor toggle, and a forced flush when a batch fills up.


use ember_engine::ember::ScissorRect;
use headless_test_utils::{make_material, make_sprite, make_system, make_system_with_sprite_capacity};

// ============================================================================
// COALESCING
// ============================================================================

#[test]
fn test_same_material_sprites_coalesce_into_one_draw() {
    let (mut system, probe) = make_system();
    let material = make_material("atlas");

    for _ in 0..5 {
        system.render_sprite(make_sprite(&material)).unwrap();
    }
    system.flush_sprites().unwrap();

    assert_eq!(probe.lock().unwrap().stats().draws, 1);
}

#[test]
fn test_material_change_splits_draws() {
    let (mut system, probe) = make_system();
    let grass = make_material("grass");
    let stone = make_material("stone");

    system.render_sprite(make_sprite(&grass)).unwrap();
    system.render_sprite(make_sprite(&stone)).unwrap();
    system.render_sprite(make_sprite(&grass)).unwrap();
    system.flush_sprites().unwrap();

    // Submission order is preserved, so the second grass sprite cannot
    // merge into the first run
    assert_eq!(probe.lock().unwrap().stats().draws, 3);
}

#[test]
fn test_flush_without_sprites_draws_nothing() {
    let (mut system, probe) = make_system();
    system.flush_sprites().unwrap();
    assert_eq!(probe.lock().unwrap().stats().draws, 0);
}

#[test]
fn test_consecutive_frames_each_flush_their_own_sprites() {
    let (mut system, probe) = make_system();
    let material = make_material("atlas");

    system.render_sprite(make_sprite(&material)).unwrap();
    system.flush_sprites().unwrap();

    system.render_sprite(make_sprite(&material)).unwrap();
    system.render_sprite(make_sprite(&material)).unwrap();
    system.flush_sprites().unwrap();

    assert_eq!(probe.lock().unwrap().stats().draws, 2);
}

// ============================================================================
// SCISSOR
// ============================================================================

#[test]
fn test_scissor_toggle_splits_runs() {
    let (mut system, probe) = make_system();
    let material = make_material("ui");
    let rect = ScissorRect {
        x: 0,
        y: 0,
        width: 100,
        height: 50,
    };

    system.render_sprite(make_sprite(&material)).unwrap();
    system.enable_scissor(rect);
    system.render_sprite(make_sprite(&material)).unwrap();
    system.disable_scissor();
    system.flush_sprites().unwrap();

    let probe = probe.lock().unwrap();
    assert_eq!(probe.stats().draws, 2);
    // ScissorOff was replayed last
    assert_eq!(probe.scissor(), None);
}

#[test]
fn test_scissor_left_enabled_persists_on_device() {
    let (mut system, probe) = make_system();
    let material = make_material("ui");
    let rect = ScissorRect {
        x: 4,
        y: 8,
        width: 64,
        height: 32,
    };

    system.enable_scissor(rect);
    system.render_sprite(make_sprite(&material)).unwrap();
    system.flush_sprites().unwrap();

    assert_eq!(probe.lock().unwrap().scissor(), Some(rect));
}

// ============================================================================
// CAPACITY
// ============================================================================

#[test]
fn test_full_batch_forces_an_early_flush() {
    let (mut system, probe) = make_system_with_sprite_capacity(2);
    let material = make_material("atlas");

    system.render_sprite(make_sprite(&material)).unwrap();
    system.render_sprite(make_sprite(&material)).unwrap();
    // Third sprite does not fit; the first two are flushed to make room
    system.render_sprite(make_sprite(&material)).unwrap();
    assert_eq!(probe.lock().unwrap().stats().draws, 1);

    system.flush_sprites().unwrap();
    assert_eq!(probe.lock().unwrap().stats().draws, 2);
}

// ============================================================================
// CONTEXT LOSS
// ============================================================================

#[test]
fn test_batcher_survives_context_loss() {
    let (mut system, probe) = make_system();
    let material = make_material("atlas");

    system.suspend(&mut []).unwrap();
    probe.lock().unwrap().simulate_context_loss();
    system.resume(&mut []).unwrap();

    system.render_sprite(make_sprite(&material)).unwrap();
    system.flush_sprites().unwrap();
    assert_eq!(probe.lock().unwrap().stats().draws, 1);
}

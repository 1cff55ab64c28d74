//! Integration tests for the Engine singleton over the headless backend
//!
//! Run with: cargo test --test engine_integration_tests
//!
//! ENGINE_STATE is process-global, so every test runs under #[serial]
//! and starts by destroying any singleton a previous test left behind.


use std::sync::Arc;

use serial_test::serial;

use ember_engine::ember::model::{Joint, Skeleton};
use ember_engine::Engine;
use ember_engine_device_headless::HeadlessDevice;
use headless_test_utils::{make_material, make_sprite};

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Clear every singleton a previous test may have left registered
fn cleanup() {
    let _ = Engine::initialize();
    let _ = Engine::destroy_render_system();
    let _ = Engine::destroy_resource_registry();
    let _ = Engine::destroy_task_scheduler();
}

// ============================================================================
// RENDER SYSTEM LIFECYCLE
// ============================================================================

#[test]
#[serial]
fn test_render_system_lifecycle_through_the_engine() {
    cleanup();
    Engine::create_render_system(Box::new(HeadlessDevice::new())).unwrap();

    {
        let render_system = Engine::render_system().unwrap();
        let mut guard = render_system.lock().unwrap();
        let material = make_material("atlas");
        guard.render_sprite(make_sprite(&material)).unwrap();
        guard.flush_sprites().unwrap();
    }

    Engine::destroy_render_system().unwrap();
    assert!(Engine::render_system().is_err());
}

#[test]
#[serial]
fn test_duplicate_render_system_is_rejected() {
    cleanup();
    Engine::create_render_system(Box::new(HeadlessDevice::new())).unwrap();
    assert!(Engine::create_render_system(Box::new(HeadlessDevice::new())).is_err());
    Engine::destroy_render_system().unwrap();
}

// ============================================================================
// RESOURCE REGISTRY
// ============================================================================

#[test]
#[serial]
fn test_resources_stored_through_the_engine_are_shared() {
    cleanup();
    Engine::create_resource_registry().unwrap();

    let skeleton = Arc::new(
        Skeleton::new(vec![Joint {
            name: "root".to_string(),
            parent: None,
        }])
        .unwrap(),
    );

    {
        let registry = Engine::resource_registry().unwrap();
        registry
            .lock()
            .unwrap()
            .store_skeleton("player", skeleton.clone());
    }

    let registry = Engine::resource_registry().unwrap();
    let stored = registry.lock().unwrap().skeleton("player").unwrap();
    assert!(Arc::ptr_eq(&stored, &skeleton));

    Engine::destroy_resource_registry().unwrap();
}

// ============================================================================
// TASK SCHEDULER
// ============================================================================

#[test]
#[serial]
fn test_scheduled_main_thread_tasks_run_on_demand() {
    cleanup();
    Engine::create_task_scheduler(2).unwrap();

    let scheduler = Engine::task_scheduler().unwrap();
    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    for _ in 0..3 {
        let counter = counter.clone();
        scheduler.schedule_main_thread(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
    }

    assert_eq!(scheduler.main_thread_task_count(), 3);
    scheduler.execute_main_thread_tasks();
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(scheduler.main_thread_task_count(), 0);

    Engine::destroy_task_scheduler().unwrap();
}

#[test]
#[serial]
fn test_background_tasks_complete() {
    cleanup();
    Engine::create_task_scheduler(2).unwrap();

    let scheduler = Engine::task_scheduler().unwrap();
    let (sender, receiver) = std::sync::mpsc::channel();
    for index in 0..4 {
        let sender = sender.clone();
        scheduler.schedule(move || {
            let _ = sender.send(index);
        });
    }

    let mut received: Vec<i32> = receiver.iter().take(4).collect();
    received.sort_unstable();
    assert_eq!(received, vec![0, 1, 2, 3]);

    Engine::destroy_task_scheduler().unwrap();
}

/// Ember Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the render
/// system, resource registry and task scheduler. It uses thread-safe
/// static storage with RwLock for safe concurrent access.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;

use crate::device::GraphicsDevice;
use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::render::RenderSystem;
use crate::resource::ResourceRegistry;
use crate::task::TaskScheduler;

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    render_system: RwLock<Option<Arc<Mutex<RenderSystem>>>>,
    resource_registry: RwLock<Option<Arc<Mutex<ResourceRegistry>>>>,
    task_scheduler: RwLock<Option<Arc<TaskScheduler>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            render_system: RwLock::new(None),
            resource_registry: RwLock::new(None),
            task_scheduler: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of all engine subsystems using a singleton
/// pattern with thread-safe access.
///
/// # Example
///
/// ```no_run
/// use ember_engine::Engine;
/// use ember_engine_device_headless::HeadlessDevice;
///
/// // Initialize engine
/// Engine::initialize()?;
///
/// // Create the render system over a backend device
/// Engine::create_render_system(Box::new(HeadlessDevice::new()))?;
///
/// // Access it globally
/// let render_system = Engine::render_system()?;
///
/// // Cleanup
/// Engine::shutdown();
/// # Ok::<(), ember_engine::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("ember::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("ember::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("ember::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating
    /// any subsystems.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the entire engine and destroy all singletons
    ///
    /// After calling this, `initialize()` must be called again before
    /// creating new subsystems.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            // Clear the registry BEFORE the render system (resources
            // reference GPU objects)
            if let Ok(mut registry) = state.resource_registry.write() {
                *registry = None;
            }
            if let Ok(mut scheduler) = state.task_scheduler.write() {
                *scheduler = None;
            }
            if let Ok(mut render_system) = state.render_system.write() {
                *render_system = None;
            }
        }
    }

    // ===== RENDER SYSTEM API =====

    /// Create and register the render system singleton over a backend
    /// device
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A render system already exists
    /// - The device rejects the initial allocations
    pub fn create_render_system(device: Box<dyn GraphicsDevice>) -> Result<()> {
        let render_system = RenderSystem::new(device)?;
        Self::register_render_system(Arc::new(Mutex::new(render_system)))?;
        crate::engine_info!("ember::Engine", "Render system singleton created successfully");
        Ok(())
    }

    pub(crate) fn register_render_system(render_system: Arc<Mutex<RenderSystem>>) -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let mut lock = state.render_system.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Render system lock poisoned".to_string(),
            ))
        })?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "Render system already exists. Call Engine::destroy_render_system() first."
                    .to_string(),
            )));
        }

        *lock = Some(render_system);
        Ok(())
    }

    /// Get the render system singleton
    pub fn render_system() -> Result<Arc<Mutex<RenderSystem>>> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let lock = state.render_system.read().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Render system lock poisoned".to_string(),
            ))
        })?;

        lock.clone().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Render system not created. Call Engine::create_render_system() first."
                    .to_string(),
            ))
        })
    }

    /// Destroy the render system singleton
    ///
    /// All existing references remain valid until dropped.
    pub fn destroy_render_system() -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized".to_string(),
            ))
        })?;

        let mut lock = state.render_system.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Render system lock poisoned".to_string(),
            ))
        })?;

        *lock = None;
        crate::engine_info!("ember::Engine", "Render system singleton destroyed");
        Ok(())
    }

    // ===== RESOURCE REGISTRY API =====

    /// Create and register the resource registry singleton
    pub fn create_resource_registry() -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let mut lock = state.resource_registry.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "ResourceRegistry lock poisoned".to_string(),
            ))
        })?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "ResourceRegistry already exists. Call Engine::destroy_resource_registry() first."
                    .to_string(),
            )));
        }

        *lock = Some(Arc::new(Mutex::new(ResourceRegistry::new())));
        crate::engine_info!("ember::Engine", "ResourceRegistry singleton created successfully");
        Ok(())
    }

    /// Get the resource registry singleton
    pub fn resource_registry() -> Result<Arc<Mutex<ResourceRegistry>>> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let lock = state.resource_registry.read().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "ResourceRegistry lock poisoned".to_string(),
            ))
        })?;

        lock.clone().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "ResourceRegistry not created. Call Engine::create_resource_registry() first."
                    .to_string(),
            ))
        })
    }

    /// Destroy the resource registry singleton
    pub fn destroy_resource_registry() -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized".to_string(),
            ))
        })?;

        let mut lock = state.resource_registry.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "ResourceRegistry lock poisoned".to_string(),
            ))
        })?;

        *lock = None;
        crate::engine_info!("ember::Engine", "ResourceRegistry singleton destroyed");
        Ok(())
    }

    // ===== TASK SCHEDULER API =====

    /// Create and register the task scheduler singleton with the given
    /// number of worker threads
    pub fn create_task_scheduler(worker_count: usize) -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let mut lock = state.task_scheduler.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "TaskScheduler lock poisoned".to_string(),
            ))
        })?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "TaskScheduler already exists. Call Engine::destroy_task_scheduler() first."
                    .to_string(),
            )));
        }

        *lock = Some(Arc::new(TaskScheduler::new(worker_count)?));
        crate::engine_info!("ember::Engine", "TaskScheduler singleton created successfully");
        Ok(())
    }

    /// Get the task scheduler singleton
    pub fn task_scheduler() -> Result<Arc<TaskScheduler>> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })?;

        let lock = state.task_scheduler.read().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "TaskScheduler lock poisoned".to_string(),
            ))
        })?;

        lock.clone().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "TaskScheduler not created. Call Engine::create_task_scheduler() first."
                    .to_string(),
            ))
        })
    }

    /// Destroy the task scheduler singleton, joining its workers once
    /// the last reference drops
    pub fn destroy_task_scheduler() -> Result<()> {
        let state = ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized".to_string(),
            ))
        })?;

        let mut lock = state.task_scheduler.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "TaskScheduler lock poisoned".to_string(),
            ))
        })?;

        *lock = None;
        crate::engine_info!("ember::Engine", "TaskScheduler singleton destroyed");
        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut registry) = state.resource_registry.write() {
                *registry = None;
            }
            if let Ok(mut scheduler) = state.task_scheduler.write() {
                *scheduler = None;
            }
            if let Ok(mut render_system) = state.render_system.write() {
                *render_system = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file
    /// logger, capture logger for tests, etc.)
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR
    /// logs)
    ///
    /// Used by the engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

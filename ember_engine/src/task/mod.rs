/// Task module - background workers and main-thread task queue

// Module declarations
pub mod task_scheduler;

// Re-exports
pub use task_scheduler::*;

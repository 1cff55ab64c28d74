/// Resource module - named storage for shared engine resources

// Module declarations
pub mod registry;

// Re-exports
pub use registry::*;

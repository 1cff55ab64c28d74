/*!
# Ember Engine - Headless Device Backend

CPU-only implementation of the Ember engine's `GraphicsDevice` trait.

The headless device stores buffer and texture objects in host memory
and records every call it receives. It backs integration tests and
server-side tooling where no GPU context exists, and it can simulate a
GPU context loss to exercise the engine's backup/restore paths.
*/

// Implementation modules
mod headless_device;

pub use headless_device::{HeadlessDevice, HeadlessStats, SharedHeadlessDevice};

//! Integration test suite.
//!
//! 1. Built-in record access (actions, frames, rich text)
//! 2. Streams and area-scoped resolution
//! 3. Configuration and schema declarations
//! 4. Property tests over offsets, numeric fields and resizing

pub mod helpers;
pub mod property_tests;
pub mod record_tests;
pub mod setup_tests;
pub mod stream_tests;

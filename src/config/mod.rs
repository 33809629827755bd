//! Configuration module for the search server connection
//!
//! This module provides the `SearchConfig` struct, its type-safe builder,
//! and loaders for process-start configuration sources.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod loading;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{SearchConfigBuilder, WithHost};
pub use types::{BackpressureMode, SearchConfig, UnknownEntryPolicy};

//! Storage abstraction layer for Bantam.
//!
//! A small pluggable storage system: index files are written and read
//! through the [`Storage`] trait, with file system and in-memory backends.

pub mod file;
pub mod memory;
pub mod structured;
pub mod traits;

// Re-export commonly used types
pub use file::*;
pub use memory::*;
pub use structured::*;
pub use traits::*;

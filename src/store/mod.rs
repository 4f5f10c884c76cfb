//! Storage port implementations shipped with the registry.

mod memory;

pub use memory::{MemoryRepository, OperationCounts};

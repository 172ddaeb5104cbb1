// Adapters layer: concrete implementations for external systems.

pub mod mma;

pub use mma::{MmaRegistrySource, MmaSourceConfig};

//! Persistent key-value slots backing credentials and device identity

pub mod memory;
pub mod ports;

pub use memory::InMemoryKeyValueStore;
pub use ports::KeyValueStore;

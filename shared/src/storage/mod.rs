pub mod factory;
pub mod memory;

pub use factory::{ShareBackend, StorageFactory};
pub use memory::MemoryShareStore;

//! Registry infrastructure - catalogue service and snapshot stores

mod in_memory;
mod json_file;
mod service;

pub use in_memory::InMemoryRegistryStore;
pub use json_file::JsonFileRegistryStore;
pub use service::ModelRegistry;

//! Result store adapters

mod json_file;
mod memory;

pub use json_file::JsonFileResultStore;
pub use memory::InMemoryResultStore;

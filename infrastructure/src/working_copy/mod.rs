//! Working copy adapters

mod git;
mod memory;
mod paths;

pub use git::GitWorkingCopy;
pub use memory::{InMemoryWorkingCopy, MemoryCommit};

//! Local content cache
//!
//! Downloaded files live in one flat directory, named by content checksum.

pub mod index;
pub mod store;

pub use index::{split_file_name, CacheIndex};
pub use store::{CacheError, CacheStore};

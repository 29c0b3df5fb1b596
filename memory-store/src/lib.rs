pub mod dedup;
pub mod markers;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use dedup::DedupCache;
pub use markers::MarkerStore;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use store::MemoryStore;

#[cfg(test)]
mod tests;

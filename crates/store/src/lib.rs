//! Health profile storage for AirAdvisor.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryProfileStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProfileStore;

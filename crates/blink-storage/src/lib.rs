pub mod memory;
pub mod mysql;

pub use blink_core::error::StorageError;
pub use blink_core::repository::{ReadRepository, Repository, UrlRecord};
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;

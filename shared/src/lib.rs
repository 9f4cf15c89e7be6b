pub mod config;
pub mod db;
pub mod models;
pub mod storage;
pub mod telemetry;
pub mod test_environment;
pub mod traits;
pub mod utils;

pub use config::DatabaseConfig;
pub use db::repositories::ShareRepository;
pub use db::{DatabaseError, DatabasePool};
pub use models::{NewShare, Share};
pub use storage::{MemoryShareStore, ShareBackend, StorageFactory};
pub use traits::ShareStore;

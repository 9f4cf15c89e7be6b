pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::DatabasePool;

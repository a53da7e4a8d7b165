pub mod config_store;
pub mod todo_repository;

pub use config_store::*;
pub use todo_repository::*;

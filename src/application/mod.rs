pub mod error;
pub mod todo_store;

pub use error::*;
pub use todo_store::*;

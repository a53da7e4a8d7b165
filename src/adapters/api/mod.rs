pub mod client;
pub mod dto;
pub mod todo_repo;

pub use client::*;
pub use dto::*;
pub use todo_repo::*;

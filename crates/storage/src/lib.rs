#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AnswerRepository, InMemoryRepository, InMemoryResultCache, ResultCache, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};

#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    CourseRepository, GapQuizRepository, InMemoryRepository, ProgressRepository, Storage,
    StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Failures inside the persistence collaborator. Propagated to callers
/// unmodified; the core never retries.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database error: {0}")]
    Database(#[from] DieselError),
}

/// Errors from the review scheduling core.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("flashcard not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from flashcard CRUD operations.
#[derive(Error, Debug)]
pub enum CardError {
    #[error("flashcard not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from category CRUD operations.
#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("category not found")]
    NotFound,
    #[error("category name already exists")]
    NameTaken,
    #[error("cannot delete category with {0} flashcards")]
    InUse(i64),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DieselError> for ReviewError {
    fn from(err: DieselError) -> Self {
        ReviewError::Storage(StorageError::Database(err))
    }
}

impl From<DieselError> for CardError {
    fn from(err: DieselError) -> Self {
        CardError::Storage(StorageError::Database(err))
    }
}

impl From<DieselError> for CategoryError {
    fn from(err: DieselError) -> Self {
        // UNIQUE violation on categories.name surfaces as NameTaken.
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                CategoryError::NameTaken
            }
            other => CategoryError::Storage(StorageError::Database(other)),
        }
    }
}

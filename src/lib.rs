//! cardbox: a personal flashcard study library.
//!
//! Cards are organized into categories and reviewed on a simple
//! spaced-repetition schedule driven by a per-card difficulty counter. The
//! [`scheduler`] module holds the scheduling core (due-set selection and
//! review recording); [`store`] is the SQLite persistence collaborator it is
//! constructed with; [`card`] and [`category`] are the plain CRUD
//! repositories around the same tables.

pub mod card;
pub mod category;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod schema;
pub mod store;

pub use error::{CardError, CategoryError, ReviewError, StorageError};
pub use model::{Category, Flashcard, FlashcardWithCategory, ReviewHistoryEntry, ReviewResponse};
pub use scheduler::{DEFAULT_REVIEW_LIMIT, Scheduler};
pub use store::{CardStore, DbPool, SqliteCardStore};

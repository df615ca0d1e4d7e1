use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::error::StorageError;
use crate::model::{Flashcard, NewCategory, NewReviewHistoryEntry};
use crate::schema::{categories, flashcards, review_history};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Builds a connection pool for the given SQLite database path.
pub fn connect_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder().build(manager)
}

/// Builds a pool from the `DATABASE_PATH` environment variable,
/// defaulting to `flashcards.db` in the working directory.
pub fn connect_pool_from_env() -> Result<DbPool, r2d2::Error> {
    dotenv::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "flashcards.db".into());
    connect_pool(&database_url)
}

/// Creates the tables if they do not exist yet and seeds the default
/// categories when the database is empty.
///
/// `flashcards.category_id` is deliberately a soft foreign key: there is no
/// cascade, and the category repository rejects deleting a category that
/// still has flashcards.
pub fn initialize_database(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    conn.batch_execute(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER,
            front_content TEXT NOT NULL,
            back_content TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_reviewed TIMESTAMP,
            review_count INTEGER NOT NULL DEFAULT 0,
            difficulty_level INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (category_id) REFERENCES categories (id)
        );

        CREATE TABLE IF NOT EXISTS review_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            flashcard_id INTEGER NOT NULL,
            reviewed_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            performance_rating INTEGER NOT NULL,
            FOREIGN KEY (flashcard_id) REFERENCES flashcards (id)
        );
        "#,
    )?;

    let existing: i64 = categories::table.count().get_result(conn)?;
    if existing == 0 {
        let defaults = vec![
            NewCategory {
                name: "Languages",
                description: Some("Vocabulary and phrases for language learning"),
            },
            NewCategory {
                name: "General Knowledge",
                description: Some("Facts and information for general learning"),
            },
            NewCategory {
                name: "Programming",
                description: Some("Programming concepts and syntax"),
            },
        ];
        diesel::insert_into(categories::table)
            .values(&defaults)
            .execute(conn)?;
        log::info!("database initialized with default categories");
    }

    Ok(())
}

/// The persistence capabilities the review scheduling core depends on.
///
/// Injected into the scheduler at construction so the core stays agnostic of
/// how cards are actually stored.
pub trait CardStore {
    fn fetch_all_cards(&self) -> Result<Vec<Flashcard>, StorageError>;

    fn fetch_card(&self, card_id: i32) -> Result<Option<Flashcard>, StorageError>;

    /// Writes the post-review scheduling fields. Returns `false` when no
    /// flashcard with that id exists.
    fn update_card_review_state(
        &self,
        card_id: i32,
        difficulty_level: i32,
        review_count: i32,
        last_reviewed: NaiveDateTime,
    ) -> Result<bool, StorageError>;

    fn append_history(
        &self,
        card_id: i32,
        rating: i32,
        reviewed_at: NaiveDateTime,
    ) -> Result<(), StorageError>;

    /// Applies the state update and the history append as one unit.
    ///
    /// The default body composes the two writes; backends that can do better
    /// should override this with a real transaction so a review is never
    /// half-recorded.
    fn apply_review(
        &self,
        card_id: i32,
        difficulty_level: i32,
        review_count: i32,
        last_reviewed: NaiveDateTime,
        rating: i32,
    ) -> Result<bool, StorageError> {
        if !self.update_card_review_state(card_id, difficulty_level, review_count, last_reviewed)? {
            return Ok(false);
        }
        self.append_history(card_id, rating, last_reviewed)?;
        Ok(true)
    }
}

/// SQLite-backed store. A pooled connection is acquired per operation and
/// returned to the pool on every exit path.
pub struct SqliteCardStore {
    pool: DbPool,
}

impl SqliteCardStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CardStore for SqliteCardStore {
    fn fetch_all_cards(&self) -> Result<Vec<Flashcard>, StorageError> {
        let mut conn = self.pool.get()?;
        let cards = flashcards::table
            .select(Flashcard::as_select())
            .load(&mut conn)?;
        Ok(cards)
    }

    fn fetch_card(&self, card_id: i32) -> Result<Option<Flashcard>, StorageError> {
        let mut conn = self.pool.get()?;
        let card = flashcards::table
            .find(card_id)
            .select(Flashcard::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(card)
    }

    fn update_card_review_state(
        &self,
        card_id: i32,
        difficulty_level: i32,
        review_count: i32,
        last_reviewed: NaiveDateTime,
    ) -> Result<bool, StorageError> {
        let mut conn = self.pool.get()?;
        let affected = diesel::update(flashcards::table.find(card_id))
            .set((
                flashcards::difficulty_level.eq(difficulty_level),
                flashcards::review_count.eq(review_count),
                flashcards::last_reviewed.eq(Some(last_reviewed)),
            ))
            .execute(&mut conn)?;
        Ok(affected > 0)
    }

    fn append_history(
        &self,
        card_id: i32,
        rating: i32,
        reviewed_at: NaiveDateTime,
    ) -> Result<(), StorageError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(review_history::table)
            .values(&NewReviewHistoryEntry {
                flashcard_id: card_id,
                reviewed_at,
                performance_rating: rating,
            })
            .execute(&mut conn)?;
        Ok(())
    }

    /// Single transaction on one connection, so the scheduling-field update
    /// and the history append land together or not at all.
    fn apply_review(
        &self,
        card_id: i32,
        difficulty_level: i32,
        review_count: i32,
        last_reviewed: NaiveDateTime,
        rating: i32,
    ) -> Result<bool, StorageError> {
        let mut conn = self.pool.get()?;
        let applied = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let affected = diesel::update(flashcards::table.find(card_id))
                .set((
                    flashcards::difficulty_level.eq(difficulty_level),
                    flashcards::review_count.eq(review_count),
                    flashcards::last_reviewed.eq(Some(last_reviewed)),
                ))
                .execute(conn)?;

            if affected == 0 {
                return Ok(false);
            }

            diesel::insert_into(review_history::table)
                .values(&NewReviewHistoryEntry {
                    flashcard_id: card_id,
                    reviewed_at: last_reviewed,
                    performance_rating: rating,
                })
                .execute(conn)?;

            Ok(true)
        })?;
        Ok(applied)
    }
}

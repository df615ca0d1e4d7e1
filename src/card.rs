use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::error::CardError;
use crate::model::{Flashcard, FlashcardWithCategory, NewFlashcard, ReviewHistoryEntry};
use crate::schema::{categories, flashcards, review_history};

pub struct FlashcardRepository;

impl FlashcardRepository {
    /// Lists flashcards newest first, optionally filtered by category, with
    /// the category name joined in.
    pub fn all(
        conn: &mut SqliteConnection,
        category_id: Option<i32>,
    ) -> Result<Vec<FlashcardWithCategory>, CardError> {
        let mut query = flashcards::table
            .left_join(categories::table)
            .select((Flashcard::as_select(), categories::name.nullable()))
            .order(flashcards::created_at.desc())
            .into_boxed();

        if let Some(category_id) = category_id {
            query = query.filter(flashcards::category_id.eq(category_id));
        }

        let rows: Vec<(Flashcard, Option<String>)> = query.load(conn)?;
        Ok(rows
            .into_iter()
            .map(|(card, category_name)| FlashcardWithCategory { card, category_name })
            .collect())
    }

    pub fn find(
        conn: &mut SqliteConnection,
        card_id: i32,
    ) -> Result<FlashcardWithCategory, CardError> {
        let row: Option<(Flashcard, Option<String>)> = flashcards::table
            .left_join(categories::table)
            .filter(flashcards::id.eq(card_id))
            .select((Flashcard::as_select(), categories::name.nullable()))
            .first(conn)
            .optional()?;

        row.map(|(card, category_name)| FlashcardWithCategory { card, category_name })
            .ok_or(CardError::NotFound)
    }

    pub fn create(
        conn: &mut SqliteConnection,
        front_content: &str,
        back_content: &str,
        category_id: Option<i32>,
    ) -> Result<Flashcard, CardError> {
        diesel::insert_into(flashcards::table)
            .values(&NewFlashcard {
                category_id,
                front_content,
                back_content,
            })
            .execute(conn)?;

        let card_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
            .get_result::<i32>(conn)?;

        let card = flashcards::table
            .find(card_id)
            .select(Flashcard::as_select())
            .first(conn)?;
        Ok(card)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        card_id: i32,
        front_content: &str,
        back_content: &str,
        category_id: Option<i32>,
    ) -> Result<(), CardError> {
        let affected = diesel::update(flashcards::table.find(card_id))
            .set((
                flashcards::front_content.eq(front_content),
                flashcards::back_content.eq(back_content),
                flashcards::category_id.eq(category_id),
            ))
            .execute(conn)?;

        if affected == 0 {
            return Err(CardError::NotFound);
        }
        Ok(())
    }

    /// Review history for one card, newest first.
    pub fn history(
        conn: &mut SqliteConnection,
        card_id: i32,
    ) -> Result<Vec<ReviewHistoryEntry>, CardError> {
        let entries = review_history::table
            .filter(review_history::flashcard_id.eq(card_id))
            .order(review_history::reviewed_at.desc())
            .select(ReviewHistoryEntry::as_select())
            .load(conn)?;
        Ok(entries)
    }

    /// Deletes a flashcard and its review history in one transaction.
    pub fn delete(conn: &mut SqliteConnection, card_id: i32) -> Result<(), CardError> {
        let affected = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(review_history::table.filter(review_history::flashcard_id.eq(card_id)))
                .execute(conn)?;
            diesel::delete(flashcards::table.find(card_id)).execute(conn)
        })?;

        if affected == 0 {
            return Err(CardError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryRepository;
    use crate::model::NewReviewHistoryEntry;
    use crate::store::initialize_database;
    use chrono::NaiveDate;

    fn test_conn() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        initialize_database(&mut conn).unwrap();
        conn
    }

    #[test]
    fn create_sets_scheduling_defaults() {
        let mut conn = test_conn();
        let card = FlashcardRepository::create(&mut conn, "2 + 2", "4", None).unwrap();
        assert_eq!(card.review_count, 0);
        assert_eq!(card.difficulty_level, 0);
        assert!(card.last_reviewed.is_none());
        assert!(card.category_id.is_none());
    }

    #[test]
    fn all_filters_by_category_and_joins_the_name() {
        let mut conn = test_conn();
        let category = CategoryRepository::create(&mut conn, "Math", None).unwrap();
        FlashcardRepository::create(&mut conn, "2 + 2", "4", Some(category.id)).unwrap();
        FlashcardRepository::create(&mut conn, "capital of France", "Paris", None).unwrap();

        let math = FlashcardRepository::all(&mut conn, Some(category.id)).unwrap();
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].category_name.as_deref(), Some("Math"));

        let everything = FlashcardRepository::all(&mut conn, None).unwrap();
        assert_eq!(everything.len(), 2);
    }

    #[test]
    fn find_missing_card_is_not_found() {
        let mut conn = test_conn();
        let err = FlashcardRepository::find(&mut conn, 999).unwrap_err();
        assert!(matches!(err, CardError::NotFound));
    }

    #[test]
    fn update_rewrites_content_and_category() {
        let mut conn = test_conn();
        let card = FlashcardRepository::create(&mut conn, "draft", "draft", None).unwrap();
        let category = CategoryRepository::create(&mut conn, "Chemistry", None).unwrap();

        FlashcardRepository::update(&mut conn, card.id, "H2O", "water", Some(category.id))
            .unwrap();

        let found = FlashcardRepository::find(&mut conn, card.id).unwrap();
        assert_eq!(found.card.front_content, "H2O");
        assert_eq!(found.card.back_content, "water");
        assert_eq!(found.category_name.as_deref(), Some("Chemistry"));
    }

    #[test]
    fn delete_removes_card_and_its_history() {
        let mut conn = test_conn();
        let card = FlashcardRepository::create(&mut conn, "front", "back", None).unwrap();
        diesel::insert_into(review_history::table)
            .values((
                review_history::flashcard_id.eq(card.id),
                review_history::reviewed_at.eq(chrono::Utc::now().naive_utc()),
                review_history::performance_rating.eq(4),
            ))
            .execute(&mut conn)
            .unwrap();

        FlashcardRepository::delete(&mut conn, card.id).unwrap();

        let err = FlashcardRepository::find(&mut conn, card.id).unwrap_err();
        assert!(matches!(err, CardError::NotFound));
        assert!(FlashcardRepository::history(&mut conn, card.id).unwrap().is_empty());
    }

    #[test]
    fn history_lists_reviews_newest_first() {
        let mut conn = test_conn();
        let card = FlashcardRepository::create(&mut conn, "front", "back", None).unwrap();

        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2026, 3, d)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        };
        diesel::insert_into(review_history::table)
            .values(&vec![
                NewReviewHistoryEntry {
                    flashcard_id: card.id,
                    reviewed_at: day(1),
                    performance_rating: 2,
                },
                NewReviewHistoryEntry {
                    flashcard_id: card.id,
                    reviewed_at: day(3),
                    performance_rating: 5,
                },
            ])
            .execute(&mut conn)
            .unwrap();

        let history = FlashcardRepository::history(&mut conn, card.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].performance_rating, 5);
        assert_eq!(history[1].performance_rating, 2);
        assert!(history.iter().all(|e| e.flashcard_id == card.id));
    }

    #[test]
    fn delete_missing_card_is_not_found() {
        let mut conn = test_conn();
        let err = FlashcardRepository::delete(&mut conn, 999).unwrap_err();
        assert!(matches!(err, CardError::NotFound));
    }
}

use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::schema::{categories, flashcards, review_history};

/// A study category; flashcards may optionally belong to one.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

/// A single flashcard together with its review-scheduling state.
///
/// `difficulty_level` starts at 0 and is unbounded above; it doubles as the
/// recall-strength proxy driving the review interval (level + 1 days).
/// `last_reviewed` stays `None` until the first recorded review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = flashcards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Flashcard {
    pub id: i32,
    pub category_id: Option<i32>,
    pub front_content: String,
    pub back_content: String,
    pub created_at: NaiveDateTime,
    pub last_reviewed: Option<NaiveDateTime>,
    pub review_count: i32,
    pub difficulty_level: i32,
}

#[derive(Insertable)]
#[diesel(table_name = flashcards)]
pub struct NewFlashcard<'a> {
    pub category_id: Option<i32>,
    pub front_content: &'a str,
    pub back_content: &'a str,
}

/// A flashcard joined with the name of its category, for listing views.
#[derive(Debug, Serialize)]
pub struct FlashcardWithCategory {
    #[serde(flatten)]
    pub card: Flashcard,
    pub category_name: Option<String>,
}

/// One immutable review event. Appended on every recorded review and
/// removed only when its flashcard is deleted.
#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = review_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReviewHistoryEntry {
    pub id: i32,
    pub flashcard_id: i32,
    pub reviewed_at: NaiveDateTime,
    pub performance_rating: i32, // 1-5, clamped before insertion
}

#[derive(Insertable)]
#[diesel(table_name = review_history)]
pub struct NewReviewHistoryEntry {
    pub flashcard_id: i32,
    pub reviewed_at: NaiveDateTime,
    pub performance_rating: i32,
}

/// Standard result shape surfaced to the presentation layer.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReviewResponse {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()) }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ReviewResponse {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewError;
    use serde_json::json;

    #[test]
    fn review_response_success_omits_the_error_field() {
        let response = ReviewResponse::from(Ok::<(), ReviewError>(()));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": true})
        );
    }

    #[test]
    fn review_response_carries_the_error_message() {
        let result: Result<(), ReviewError> = Err(ReviewError::NotFound);
        let response = ReviewResponse::from(result);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": false, "error": "flashcard not found"})
        );
    }
}

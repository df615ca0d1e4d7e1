//! Review scheduling core: picks which cards are due and records review
//! outcomes.
//!
//! The interval heuristic is a per-card difficulty counter: a card at
//! difficulty level `n` comes back `n + 1` days after its last review.
//! Good ratings push the level up (longer intervals), poor ratings pull it
//! back down, with a floor at 0.

use chrono::{Duration, NaiveDateTime, Utc};
use rand::seq::SliceRandom;

use crate::error::ReviewError;
use crate::model::Flashcard;
use crate::store::CardStore;

/// Default cap on the size of a review session.
pub const DEFAULT_REVIEW_LIMIT: usize = 20;

/// Normalizes a performance rating into the accepted 1-5 range.
/// Out-of-range values are clamped, not rejected.
pub fn clamp_rating(rating: i32) -> i32 {
    rating.clamp(1, 5)
}

/// Days until a card at the given difficulty level comes due again.
pub fn review_interval(difficulty_level: i32) -> Duration {
    Duration::days(i64::from(difficulty_level) + 1)
}

/// A card is due when it has never been reviewed, or when the interval for
/// its difficulty level has elapsed since the last review.
pub fn is_due(card: &Flashcard, now: NaiveDateTime) -> bool {
    match card.last_reviewed {
        None => true,
        Some(last) => now >= last + review_interval(card.difficulty_level),
    }
}

/// Difficulty transition for one review. Pure function of the prior level
/// and the (already clamped) rating.
pub fn next_difficulty(difficulty_level: i32, rating: i32) -> i32 {
    if rating >= 4 {
        difficulty_level + 1
    } else if rating <= 2 {
        (difficulty_level - 1).max(0)
    } else {
        difficulty_level
    }
}

/// The review scheduling core, generic over its storage collaborator.
pub struct Scheduler<S: CardStore> {
    store: S,
}

impl<S: CardStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a uniformly random sample of at most `limit` due cards.
    ///
    /// Read-only; the due set is recomputed against wall-clock time on every
    /// call, and the order is intentionally unstable between calls.
    pub fn select_due(&self, limit: usize) -> Result<Vec<Flashcard>, ReviewError> {
        self.select_due_at(Utc::now().naive_utc(), limit)
    }

    /// `select_due` capped at the default session size.
    pub fn select_due_default(&self) -> Result<Vec<Flashcard>, ReviewError> {
        self.select_due(DEFAULT_REVIEW_LIMIT)
    }

    /// `select_due` against an explicit clock, for deterministic callers.
    pub fn select_due_at(
        &self,
        now: NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<Flashcard>, ReviewError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let cards = self.store.fetch_all_cards()?;
        let total = cards.len();
        let mut due: Vec<Flashcard> =
            cards.into_iter().filter(|card| is_due(card, now)).collect();
        log::debug!("{} of {} cards due for review", due.len(), total);

        // Uniform sample without replacement: shuffle, then keep the prefix.
        due.shuffle(&mut rand::rng());
        due.truncate(limit);
        Ok(due)
    }

    /// Records one review of `card_id` with the given performance rating.
    ///
    /// The rating is clamped to 1-5 before anything else. The scheduling
    /// fields and the history entry are written as one atomic unit per card;
    /// a missing card fails with `NotFound` and writes nothing. Re-issuing
    /// the call records a second review on purpose.
    pub fn record_review(&self, card_id: i32, rating: i32) -> Result<Flashcard, ReviewError> {
        self.record_review_at(card_id, rating, Utc::now().naive_utc())
    }

    /// `record_review` against an explicit clock.
    pub fn record_review_at(
        &self,
        card_id: i32,
        rating: i32,
        now: NaiveDateTime,
    ) -> Result<Flashcard, ReviewError> {
        let rating = clamp_rating(rating);

        let card = self
            .store
            .fetch_card(card_id)?
            .ok_or(ReviewError::NotFound)?;

        let difficulty_level = next_difficulty(card.difficulty_level, rating);
        let review_count = card.review_count + 1;

        let applied = self
            .store
            .apply_review(card_id, difficulty_level, review_count, now, rating)?;
        if !applied {
            // Card vanished between the fetch and the write.
            return Err(ReviewError::NotFound);
        }

        Ok(Flashcard {
            last_reviewed: Some(now),
            review_count,
            difficulty_level,
            ..card
        })
    }
}

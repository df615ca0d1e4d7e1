use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::error::CategoryError;
use crate::model::{Category, NewCategory};
use crate::schema::{categories, flashcards};

pub struct CategoryRepository;

impl CategoryRepository {
    pub fn all(conn: &mut SqliteConnection) -> Result<Vec<Category>, CategoryError> {
        let list = categories::table
            .order(categories::name.asc())
            .select(Category::as_select())
            .load(conn)?;
        Ok(list)
    }

    pub fn find(conn: &mut SqliteConnection, category_id: i32) -> Result<Category, CategoryError> {
        categories::table
            .find(category_id)
            .select(Category::as_select())
            .first(conn)
            .optional()?
            .ok_or(CategoryError::NotFound)
    }

    /// Creates a category. Duplicate names fail with `NameTaken`.
    pub fn create(
        conn: &mut SqliteConnection,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, CategoryError> {
        diesel::insert_into(categories::table)
            .values(&NewCategory { name, description })
            .execute(conn)?;

        let category_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
            .get_result::<i32>(conn)?;

        Self::find(conn, category_id)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        category_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), CategoryError> {
        let affected = diesel::update(categories::table.find(category_id))
            .set((
                categories::name.eq(name),
                categories::description.eq(description),
            ))
            .execute(conn)?;

        if affected == 0 {
            return Err(CategoryError::NotFound);
        }
        Ok(())
    }

    /// Deletes a category, but only when no flashcards reference it.
    ///
    /// The category foreign key is soft: instead of cascading, deletion of a
    /// category that still has flashcards is rejected with `InUse`.
    pub fn delete(conn: &mut SqliteConnection, category_id: i32) -> Result<(), CategoryError> {
        let in_use: i64 = flashcards::table
            .filter(flashcards::category_id.eq(category_id))
            .count()
            .get_result(conn)?;

        if in_use > 0 {
            return Err(CategoryError::InUse(in_use));
        }

        let affected =
            diesel::delete(categories::table.find(category_id)).execute(conn)?;
        if affected == 0 {
            return Err(CategoryError::NotFound);
        }
        Ok(())
    }
}

use diesel::{Connection, SqliteConnection};
use rand::seq::SliceRandom;

use crate::error::AppError;
use crate::models::{FoodView, ToggleAction};
use crate::query;

/// Flip the favorite edge between `user_id` and `food_id` in one transaction.
pub fn toggle(
    user_id: i32,
    food_id: i32,
    conn: &mut SqliteConnection,
) -> Result<ToggleAction, AppError> {
    conn.transaction(|conn| {
        if query::find_food(food_id, conn)?.is_none() {
            return Err(AppError::FoodNotFound(food_id));
        }
        let action = if query::is_favorite(user_id, food_id, conn)? {
            query::remove_favorite(user_id, food_id, conn)?;
            ToggleAction::Removed
        } else {
            query::add_favorite(user_id, food_id, conn)?;
            ToggleAction::Added
        };
        log::debug!("user {user_id} favorite {food_id}: {action:?}");
        Ok(action)
    })
}

pub fn list(user_id: i32, conn: &mut SqliteConnection) -> Result<Vec<FoodView>, AppError> {
    Ok(query::favorite_foods(user_id, conn)?
        .into_iter()
        .map(|food| FoodView::new(food, true))
        .collect())
}

/// Pick one food uniformly at random.
pub fn surprise(user_id: Option<i32>, conn: &mut SqliteConnection) -> Result<FoodView, AppError> {
    let ids = query::food_ids(conn)?;
    let food_id = *ids
        .choose(&mut rand::thread_rng())
        .ok_or(AppError::NoFoodsAvailable)?;
    let food = query::find_food(food_id, conn)?.ok_or(AppError::NoFoodsAvailable)?;
    let is_favorite = match user_id {
        Some(user_id) => query::is_favorite(user_id, food.id, conn)?,
        None => false,
    };
    Ok(FoodView::new(food, is_favorite))
}

use std::collections::HashSet;

use diesel::prelude::*;

use crate::keywords::Keywords;
use crate::models::{Favorite, Food, FoodMood, Mood, NewFood, NewMood, NewUser, User};
use crate::schema::{favorites, food_moods, foods, moods, users};

pub(crate) fn find_user(user_id: i32, conn: &mut SqliteConnection) -> QueryResult<Option<User>> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()
}

pub(crate) fn find_user_by_username(
    username: &str,
    conn: &mut SqliteConnection,
) -> QueryResult<Option<User>> {
    users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()
}

pub(crate) fn insert_user(
    username: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> QueryResult<User> {
    diesel::insert_into(users::table)
        .values(&NewUser {
            username,
            password_hash,
        })
        .returning(User::as_returning())
        .get_result(conn)
}

/// True when neither moods nor foods have been stored yet.
pub(crate) fn is_empty(conn: &mut SqliteConnection) -> QueryResult<bool> {
    let moods: i64 = moods::table.count().get_result(conn)?;
    let foods: i64 = foods::table.count().get_result(conn)?;
    Ok(moods == 0 && foods == 0)
}

pub(crate) fn mood_names(conn: &mut SqliteConnection) -> QueryResult<Vec<String>> {
    moods::table
        .select(moods::name)
        .order(moods::id)
        .load(conn)
}

/// Mood names are stored lowercase, so callers lowercase `name` first.
pub(crate) fn find_mood_by_name(
    name: &str,
    conn: &mut SqliteConnection,
) -> QueryResult<Option<Mood>> {
    moods::table
        .filter(moods::name.eq(name))
        .select(Mood::as_select())
        .first(conn)
        .optional()
}

pub(crate) fn insert_mood(
    name: &str,
    keywords: &Keywords,
    conn: &mut SqliteConnection,
) -> QueryResult<Mood> {
    diesel::insert_into(moods::table)
        .values(&NewMood { name, keywords })
        .returning(Mood::as_returning())
        .get_result(conn)
}

pub(crate) fn all_foods(conn: &mut SqliteConnection) -> QueryResult<Vec<Food>> {
    foods::table
        .select(Food::as_select())
        .order(foods::id)
        .load(conn)
}

pub(crate) fn first_foods(limit: i64, conn: &mut SqliteConnection) -> QueryResult<Vec<Food>> {
    foods::table
        .select(Food::as_select())
        .order(foods::id)
        .limit(limit)
        .load(conn)
}

pub(crate) fn find_food(food_id: i32, conn: &mut SqliteConnection) -> QueryResult<Option<Food>> {
    foods::table
        .find(food_id)
        .select(Food::as_select())
        .first(conn)
        .optional()
}

pub(crate) fn food_ids(conn: &mut SqliteConnection) -> QueryResult<Vec<i32>> {
    foods::table.select(foods::id).order(foods::id).load(conn)
}

pub(crate) fn insert_food(
    name: &str,
    keywords: &Keywords,
    conn: &mut SqliteConnection,
) -> QueryResult<Food> {
    diesel::insert_into(foods::table)
        .values(&NewFood { name, keywords })
        .returning(Food::as_returning())
        .get_result(conn)
}

pub(crate) fn link_food_mood(
    food_id: i32,
    mood_id: i32,
    conn: &mut SqliteConnection,
) -> QueryResult<usize> {
    diesel::insert_or_ignore_into(food_moods::table)
        .values(&FoodMood { food_id, mood_id })
        .execute(conn)
}

pub(crate) fn favorite_ids(user_id: i32, conn: &mut SqliteConnection) -> QueryResult<HashSet<i32>> {
    let ids = favorites::table
        .filter(favorites::user_id.eq(user_id))
        .select(favorites::food_id)
        .load::<i32>(conn)?;
    Ok(ids.into_iter().collect())
}

pub(crate) fn is_favorite(
    user_id: i32,
    food_id: i32,
    conn: &mut SqliteConnection,
) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        favorites::table.find((user_id, food_id)),
    ))
    .get_result(conn)
}

pub(crate) fn add_favorite(
    user_id: i32,
    food_id: i32,
    conn: &mut SqliteConnection,
) -> QueryResult<usize> {
    diesel::insert_or_ignore_into(favorites::table)
        .values(&Favorite { user_id, food_id })
        .execute(conn)
}

pub(crate) fn remove_favorite(
    user_id: i32,
    food_id: i32,
    conn: &mut SqliteConnection,
) -> QueryResult<usize> {
    diesel::delete(favorites::table.find((user_id, food_id))).execute(conn)
}

pub(crate) fn favorite_foods(user_id: i32, conn: &mut SqliteConnection) -> QueryResult<Vec<Food>> {
    foods::table
        .inner_join(favorites::table)
        .filter(favorites::user_id.eq(user_id))
        .select(Food::as_select())
        .order(foods::id)
        .load(conn)
}

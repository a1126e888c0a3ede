use diesel::prelude::*;
use serde::Serialize;

use crate::keywords::Keywords;
use crate::schema::{favorites, food_moods, foods, moods, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = foods)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Food {
    pub id: i32,
    pub name: String,
    pub keywords: Keywords,
}

#[derive(Insertable)]
#[diesel(table_name = foods)]
pub(crate) struct NewFood<'a> {
    pub name: &'a str,
    pub keywords: &'a Keywords,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = moods)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Mood {
    pub id: i32,
    pub name: String,
    pub keywords: Keywords,
}

#[derive(Insertable)]
#[diesel(table_name = moods)]
pub(crate) struct NewMood<'a> {
    pub name: &'a str,
    pub keywords: &'a Keywords,
}

#[derive(Insertable)]
#[diesel(table_name = food_moods)]
pub(crate) struct FoodMood {
    pub food_id: i32,
    pub mood_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = favorites)]
pub(crate) struct Favorite {
    pub user_id: i32,
    pub food_id: i32,
}

/// Food as returned by the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodView {
    pub id: i32,
    pub name: String,
    pub keywords: Keywords,
    pub is_favorite: bool,
}

impl FoodView {
    pub fn new(food: Food, is_favorite: bool) -> Self {
        FoodView {
            id: food.id,
            name: food.name,
            keywords: food.keywords,
            is_favorite,
        }
    }
}

/// Response body of `POST /api/favorite/{food_id}`.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub status: &'static str,
    pub action: ToggleAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

//! Mood-driven food search.
//!
//! Foods are scored by how many of their keywords appear in the selected
//! mood's keyword list. Foods sharing nothing with the mood are dropped, the
//! rest are ordered by score (highest first) with ties kept in storage order,
//! and at most [`MAX_RESULTS`] are returned. An empty or unknown mood is not
//! an error: the first [`MAX_RESULTS`] foods come back unranked.

use std::collections::HashSet;

use diesel::SqliteConnection;

use crate::keywords::Keywords;
use crate::models::{Food, FoodView};
use crate::query;

pub const MAX_RESULTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredFood {
    pub food: Food,
    pub score: usize,
}

/// Score and order `foods` (given in storage order) against `target`.
pub fn rank(foods: Vec<Food>, target: &Keywords) -> Vec<ScoredFood> {
    if target.is_empty() {
        return foods
            .into_iter()
            .take(MAX_RESULTS)
            .map(|food| ScoredFood { food, score: 0 })
            .collect();
    }

    let mut scored: Vec<ScoredFood> = foods
        .into_iter()
        .filter_map(|food| {
            let score = food.keywords.overlap(target);
            (score > 0).then_some(ScoredFood { food, score })
        })
        .collect();
    // sort_by is stable: equal scores keep storage order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_RESULTS);
    scored
}

/// Keywords of the named mood, empty when the name is blank or unknown.
pub(crate) fn target_keywords(
    mood_name: Option<&str>,
    conn: &mut SqliteConnection,
) -> diesel::QueryResult<Keywords> {
    let name = match mood_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_lowercase(),
        _ => return Ok(Keywords::default()),
    };
    let mood = query::find_mood_by_name(&name, conn)?;
    if mood.is_none() {
        log::debug!("unknown mood {name:?}, returning unranked foods");
    }
    Ok(mood.map(|m| m.keywords).unwrap_or_default())
}

pub fn search(
    mood_name: Option<&str>,
    user_id: Option<i32>,
    conn: &mut SqliteConnection,
) -> diesel::QueryResult<Vec<FoodView>> {
    let target = target_keywords(mood_name, conn)?;
    let foods = if target.is_empty() {
        query::first_foods(MAX_RESULTS as i64, conn)?
    } else {
        query::all_foods(conn)?
    };
    let favorites = match user_id {
        Some(id) => query::favorite_ids(id, conn)?,
        None => HashSet::new(),
    };

    Ok(rank(foods, &target)
        .into_iter()
        .map(|scored| {
            let is_favorite = favorites.contains(&scored.food.id);
            FoodView::new(scored.food, is_favorite)
        })
        .collect())
}

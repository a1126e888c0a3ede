//! One-time import of moods and foods from a JSON document.
//!
//! The import only runs against a store with no moods and no foods, so it is
//! safe to call on every start-up.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use diesel::{Connection, SqliteConnection};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::keywords::Keywords;
use crate::query;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("database error during seeding: {0}")]
    Database(#[from] diesel::result::Error),
}

#[derive(Debug, Deserialize)]
pub struct SeedData {
    /// Mood name to the keywords it matches, in document order.
    #[serde(deserialize_with = "ordered_moods")]
    pub moods: Vec<(String, Keywords)>,
    #[serde(default)]
    pub foods: Vec<SeedFood>,
}

fn ordered_moods<'de, D>(deserializer: D) -> Result<Vec<(String, Keywords)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MoodsVisitor;

    impl<'de> Visitor<'de> for MoodsVisitor {
        type Value = Vec<(String, Keywords)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of mood names to keyword lists")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut moods = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Keywords>()? {
                moods.push(entry);
            }
            Ok(moods)
        }
    }

    deserializer.deserialize_map(MoodsVisitor)
}

#[derive(Debug, Deserialize)]
pub struct SeedFood {
    pub name: String,
    #[serde(default)]
    pub keywords: Keywords,
    #[serde(default)]
    pub moods: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The store already held moods or foods; nothing was written.
    Skipped,
    Imported { moods: usize, foods: usize },
}

impl SeedData {
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

pub fn import(data: &SeedData, conn: &mut SqliteConnection) -> Result<ImportOutcome, SeedError> {
    if !query::is_empty(conn)? {
        log::info!("database already seeded, skipping import");
        return Ok(ImportOutcome::Skipped);
    }

    conn.transaction(|conn| {
        let mut mood_ids = HashMap::new();
        for (name, keywords) in &data.moods {
            let name = name.trim().to_lowercase();
            if mood_ids.contains_key(&name) {
                log::warn!("duplicate mood {name:?} in seed data, keeping the first");
                continue;
            }
            let mood = query::insert_mood(&name, keywords, conn)?;
            mood_ids.insert(name, mood.id);
        }

        for seed in &data.foods {
            let food = query::insert_food(seed.name.trim(), &seed.keywords, conn)?;
            for mood in &seed.moods {
                match mood_ids.get(&mood.trim().to_lowercase()) {
                    Some(mood_id) => {
                        query::link_food_mood(food.id, *mood_id, conn)?;
                    }
                    None => log::warn!("food {:?} references unknown mood {mood:?}", seed.name),
                }
            }
        }

        log::info!(
            "seeded {} moods and {} foods",
            mood_ids.len(),
            data.foods.len()
        );
        Ok(ImportOutcome::Imported {
            moods: mood_ids.len(),
            foods: data.foods.len(),
        })
    })
}

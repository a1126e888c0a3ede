//! Keyword token lists shared by foods and moods.
//!
//! Stored as a single comma-joined `TEXT` column. Parsing trims surrounding
//! whitespace, drops empty tokens and keeps only the first occurrence of a
//! repeated token. Matching stays case-sensitive.

use std::fmt;

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

const SEPARATOR: char = ',';

/// Ordered, de-duplicated list of keyword tokens.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, diesel::AsExpression, diesel::FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct Keywords(Vec<String>);

impl Keywords {
    /// Parse a comma-separated column value.
    pub fn parse(raw: &str) -> Self {
        raw.split(SEPARATOR).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tokens shared with `other`.
    pub fn overlap(&self, other: &Keywords) -> usize {
        self.iter().filter(|token| other.contains(token)).count()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for Keywords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tokens: Vec<String> = Vec::new();
        for token in iter {
            let token = token.as_ref().trim();
            if token.is_empty() || tokens.iter().any(|t| t == token) {
                continue;
            }
            tokens.push(token.to_owned());
        }
        Keywords(tokens)
    }
}

impl<'de> Deserialize<'de> for Keywords {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tokens = Vec::<String>::deserialize(deserializer)?;
        Ok(tokens.into_iter().collect())
    }
}

impl fmt::Display for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl ToSql<Text, Sqlite> for Keywords {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.to_string());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Keywords {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(Keywords::parse(&raw))
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a game within the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(GameId)
    }
}

impl From<i64> for GameId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One board game entry in the catalog.
///
/// Every field is required in the bundled dataset; strings may be empty
/// and `images` may be an empty list, but none may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub name: String,
    /// Shown on the list view.
    pub short_description: String,
    /// Shown on the detail view.
    pub long_description: String,
    /// Representative cover image (URI or path).
    pub image: String,
    /// Gallery images, in display order.
    pub images: Vec<String>,
    /// Free-form player count, e.g. `"2-4"`.
    pub players: String,
    /// Free-form play time, e.g. `"30-45 min"`.
    pub duration: String,
    /// Link to the external rules.
    pub how_to_play_link: String,
}

use std::collections::HashMap;

use crate::game::{GameId, GameRecord};
use crate::router::IdParam;

/// Dataset compiled into the binary.
const BUNDLED_GAMES_JSON: &str = include_str!("../data/board_games.json");

/// Errors raised while loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The dataset is not a JSON array of complete game records.
    Parse(serde_json::Error),
    /// Two records share the same id.
    DuplicateId(GameId),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid game dataset: {e}"),
            Self::DuplicateId(id) => write!(f, "duplicate game id {id}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Result of looking up a detail-view id in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameLookup<'a> {
    Found(&'a GameRecord),
    /// Well-formed id with no matching record.
    Missing(GameId),
    /// The raw id segment, which was not an integer.
    InvalidId(String),
}

impl<'a> GameLookup<'a> {
    pub fn record(&self) -> Option<&'a GameRecord> {
        match self {
            Self::Found(record) => Some(*record),
            Self::Missing(_) | Self::InvalidId(_) => None,
        }
    }
}

/// Read-only, ordered collection of game records.
///
/// Built once by whoever composes the application and handed out by
/// reference. There are no mutating operations.
#[derive(Debug, Clone)]
pub struct GameCatalog {
    games: Vec<GameRecord>,
    index: HashMap<GameId, usize>,
}

impl GameCatalog {
    /// Load the dataset bundled at build time.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_GAMES_JSON)
    }

    /// Parse a JSON array of game records.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let games: Vec<GameRecord> = serde_json::from_str(json)?;
        Self::from_records(games)
    }

    /// Build a catalog, keeping record order. Fails on a duplicate id.
    pub fn from_records(games: Vec<GameRecord>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(games.len());
        for (pos, game) in games.iter().enumerate() {
            if index.insert(game.id, pos).is_some() {
                tracing::warn!(id = %game.id, name = %game.name, "Duplicate game id in dataset");
                return Err(CatalogError::DuplicateId(game.id));
            }
        }
        tracing::info!(count = games.len(), "Game catalog loaded");
        Ok(Self { games, index })
    }

    /// Every record, in load order.
    pub fn all(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn get(&self, id: GameId) -> Option<&GameRecord> {
        self.index.get(&id).map(|&pos| &self.games[pos])
    }

    /// Turn a routed id parameter into a terminal lookup outcome.
    pub fn lookup(&self, id: &IdParam) -> GameLookup<'_> {
        match id {
            IdParam::Valid(id) => match self.get(*id) {
                Some(record) => GameLookup::Found(record),
                None => GameLookup::Missing(*id),
            },
            IdParam::Invalid(raw) => GameLookup::InvalidId(raw.clone()),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameRecord> {
        self.games.iter()
    }

    /// Ids in load order.
    pub fn ids(&self) -> impl Iterator<Item = GameId> + '_ {
        self.games.iter().map(|game| game.id)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl<'a> IntoIterator for &'a GameCatalog {
    type Item = &'a GameRecord;
    type IntoIter = std::slice::Iter<'a, GameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

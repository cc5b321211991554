pub mod catalog;
pub mod game;
pub mod router;

pub use catalog::{CatalogError, GameCatalog, GameLookup};
pub use game::{GameId, GameRecord};
pub use router::{DetailParams, IdParam, Resolution, Route, RouteName, Router};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::catalog::GameCatalog;
    use crate::game::{GameId, GameRecord};

    /// Create a record with the given id and placeholder text derived from it.
    pub fn make_record(id: i64) -> GameRecord {
        GameRecord {
            id: GameId(id),
            name: format!("Game {id}"),
            short_description: format!("Short description of game {id}"),
            long_description: format!("Long description of game {id}"),
            image: format!("/images/{id}/cover.jpg"),
            images: vec![format!("/images/{id}/1.jpg")],
            players: "2-4".to_string(),
            duration: "30 min".to_string(),
            how_to_play_link: format!("https://example.com/rules/{id}"),
        }
    }

    /// Create a catalog holding one record per id, in the given order.
    ///
    /// Panics if `ids` contains duplicates.
    pub fn make_catalog(ids: &[i64]) -> GameCatalog {
        GameCatalog::from_records(ids.iter().copied().map(make_record).collect())
            .expect("test catalog ids must be unique")
    }
}

pub mod config;
pub mod error;

use boardshelf_core::router::DetailParams;
use boardshelf_core::{
    GameCatalog, GameId, GameLookup, GameRecord, Resolution, Route, RouteName, Router,
};

use config::AppConfig;
use error::AppError;

/// View identifier for unmatched URLs.
pub const NOT_FOUND_VIEW: &str = "not-found";

/// What a navigation should display, with the data each view reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    Home {
        games: &'a [GameRecord],
    },
    GameDetail {
        lookup: GameLookup<'a>,
        referrer: String,
    },
    NotFound {
        path: String,
    },
}

impl Screen<'_> {
    pub fn view_id(&self) -> &'static str {
        match self {
            Self::Home { .. } => RouteName::Home.as_str(),
            Self::GameDetail { .. } => RouteName::GameDetail.as_str(),
            Self::NotFound { .. } => NOT_FOUND_VIEW,
        }
    }
}

/// Application root: owns the catalog, router and config, and hands out
/// read-only access to them.
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    catalog: GameCatalog,
    router: Router,
}

impl App {
    pub fn new(config: AppConfig, catalog: GameCatalog) -> Self {
        let router = Router::with_base(&config.base_path);
        Self {
            config,
            catalog,
            router,
        }
    }

    /// Build the app around the bundled catalog.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let catalog = GameCatalog::bundled()?;
        Ok(Self::new(config, catalog))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Resolve `url` and build the screen it leads to.
    pub fn navigate(&self, url: &str) -> Screen<'_> {
        let screen = match self.router.resolve_url(url) {
            Resolution::Matched(Route::Home) => Screen::Home {
                games: self.catalog.all(),
            },
            Resolution::Matched(Route::GameDetail(DetailParams { id, referrer })) => {
                let lookup = self.catalog.lookup(&id);
                match &lookup {
                    GameLookup::Found(game) => {
                        tracing::debug!(id = %game.id, name = %game.name, %referrer, "Showing game");
                    },
                    GameLookup::Missing(id) => {
                        tracing::debug!(%id, "No game with this id");
                    },
                    GameLookup::InvalidId(raw) => {
                        tracing::debug!(raw = %raw, "Game id is not an integer");
                    },
                }
                Screen::GameDetail { lookup, referrer }
            },
            Resolution::Unmatched { path } => {
                tracing::warn!(%path, "No route for path");
                Screen::NotFound { path }
            },
        };
        tracing::info!(url, view = screen.view_id(), "Navigated");
        screen
    }

    /// The screen for the configured start URL.
    pub fn start(&self) -> Screen<'_> {
        self.navigate(&self.config.start_url)
    }

    /// Link from a list entry (or elsewhere) to a game's detail view.
    pub fn detail_href(&self, id: GameId, from: &str) -> String {
        self.router.href(&Route::game_detail(id, from))
    }

    pub fn home_href(&self) -> String {
        self.router.href(&Route::Home)
    }
}

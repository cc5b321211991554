use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use boardshelf_app::config::{AppConfig, LogConfig};
use boardshelf_app::{App, Screen};
use boardshelf_core::GameLookup;

fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let (config, source) = AppConfig::load();
    init_tracing(&config.log);
    source.log();

    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let app = match App::from_config(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        },
    };

    tracing::info!(games = app.catalog().len(), base = %app.home_href(), "Boardshelf starting");
    for (pattern, name) in app.router().routes() {
        tracing::debug!(pattern, route = %name, "Route registered");
    }

    match app.start() {
        Screen::Home { games } => {
            for game in games {
                tracing::info!(
                    id = %game.id,
                    name = %game.name,
                    players = %game.players,
                    duration = %game.duration,
                    href = %app.detail_href(game.id, "home"),
                    "{}",
                    game.short_description
                );
            }
        },
        Screen::GameDetail { lookup, referrer } => match lookup {
            GameLookup::Found(game) => {
                tracing::info!(
                    id = %game.id,
                    name = %game.name,
                    images = game.images.len(),
                    rules = %game.how_to_play_link,
                    %referrer,
                    "{}",
                    game.long_description
                );
            },
            GameLookup::Missing(id) => {
                tracing::warn!(%id, %referrer, "Game not found");
            },
            GameLookup::InvalidId(raw) => {
                tracing::warn!(%raw, %referrer, "Invalid game id");
            },
        },
        Screen::NotFound { path } => {
            tracing::warn!(%path, back = %app.home_href(), "Page not found");
        },
    }

    ExitCode::SUCCESS
}

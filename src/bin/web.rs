//! Single binary web server for the bracket API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Admin tokens come from BRACKET_API_TOKENS, e.g. `secret:admin,mod-key:moderator`.

use actix_web::{web::Data, App, HttpServer};
use rivals_bracket::{api, BracketLimits, BracketStore, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);
    log::info!(
        "Brackets: up to {} teams, grand final reset {}, {} API token(s)",
        config.max_teams,
        if config.grand_final_reset { "on" } else { "off" },
        config.tokens.len()
    );

    let store = Data::new(BracketStore::new(BracketLimits {
        max_teams: config.max_teams,
        grand_final_reset: config.grand_final_reset,
    }));
    let tokens = Data::new(config.tokens.clone());

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(tokens.clone())
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

//! Esports bracket engine: library with models, bracket logic, store and REST API.

pub mod api;
pub mod auth;
pub mod config;
pub mod logic;
pub mod models;
pub mod store;
pub mod view;

pub use auth::{authorize_bracket_admin, ApiTokens, Role};
pub use config::Config;
pub use logic::{
    delete_bracket, generate_bracket, generate_seeding_order, record_result, seed_teams,
    standings, update_match, MatchOutcome, ScoreUpdate, Standings,
};
pub use models::{
    Bracket, BracketError, BracketFormat, BracketMatch, BracketSettings, BracketType, Event,
    EventId, EventStatus, MatchFormat, MatchId, MatchStatus, SeedingType, Team, TeamId,
};
pub use store::{BracketLimits, BracketStore};
pub use view::BracketView;

//! Data structures for brackets: teams, matches, events.

mod event;
mod game;
mod team;

pub use event::{
    Bracket, BracketError, BracketFormat, BracketSettings, Event, EventId, EventStatus, SeedingType,
};
pub use game::{
    BracketMatch, BracketType, MapResult, MatchFormat, MatchId, MatchKey, MatchStatus, Slot,
    SlotSource,
};
pub use team::{SeedAssignment, Team, TeamId, DEFAULT_RATING};

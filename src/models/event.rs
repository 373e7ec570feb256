//! Event, Bracket and their settings.

use crate::models::game::{BracketMatch, BracketType, MatchFormat, MatchKey, MatchStatus};
use crate::models::team::{SeedAssignment, Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Errors that can occur during bracket operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Bad input: unknown format, too few teams, tied score, ...
    Validation(String),
    /// Unknown event or match.
    NotFound(String),
    /// No valid credentials.
    Unauthorized,
    /// Credentials valid but the role may not mutate brackets.
    Forbidden,
    /// The operation would break bracket consistency (double completion, occupied slot, ...).
    Integrity(String),
    /// Store unusable (poisoned lock).
    Internal(String),
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::Validation(msg) => write!(f, "{msg}"),
            BracketError::NotFound(what) => write!(f, "{what} not found"),
            BracketError::Unauthorized => write!(f, "Authentication required"),
            BracketError::Forbidden => {
                write!(f, "Unauthorized. Admin or moderator access required.")
            }
            BracketError::Integrity(msg) => write!(f, "{msg}"),
            BracketError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for BracketError {}

/// Unique identifier for an event.
pub type EventId = Uuid;

/// Phase of the event.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Teams registered, no bracket yet.
    #[default]
    Upcoming,
    /// Bracket generated, matches being played.
    Ongoing,
    /// A champion has been decided.
    Completed,
}

/// Bracket format.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketFormat {
    #[default]
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl fmt::Display for BracketFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BracketFormat::SingleElimination => "single_elimination",
            BracketFormat::DoubleElimination => "double_elimination",
            BracketFormat::RoundRobin => "round_robin",
            BracketFormat::Swiss => "swiss",
        };
        f.write_str(s)
    }
}

impl FromStr for BracketFormat {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_elimination" => Ok(BracketFormat::SingleElimination),
            "double_elimination" => Ok(BracketFormat::DoubleElimination),
            "round_robin" => Ok(BracketFormat::RoundRobin),
            "swiss" => Ok(BracketFormat::Swiss),
            other => Err(BracketError::Validation(format!(
                "unsupported format: {other}"
            ))),
        }
    }
}

/// How seeds are assigned before the bracket is built.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingType {
    /// Highest rating first.
    #[default]
    Rating,
    /// Organizer-provided seeds.
    Manual,
    Random,
}

impl FromStr for SeedingType {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(SeedingType::Rating),
            "manual" => Ok(SeedingType::Manual),
            "random" => Ok(SeedingType::Random),
            other => Err(BracketError::Validation(format!(
                "unsupported seeding type: {other}"
            ))),
        }
    }
}

/// Options chosen when generating a bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketSettings {
    pub format: BracketFormat,
    pub seeding_type: SeedingType,
    /// Series length for every match but the last one.
    pub match_format: MatchFormat,
    /// Series length of the final (or grand final).
    pub finals_format: MatchFormat,
    /// Double elimination: replay the grand final when the losers-bracket champion wins it.
    pub grand_final_reset: bool,
}

impl Default for BracketSettings {
    fn default() -> Self {
        Self {
            format: BracketFormat::SingleElimination,
            seeding_type: SeedingType::Rating,
            match_format: MatchFormat::Bo3,
            finals_format: MatchFormat::Bo5,
            grand_final_reset: false,
        }
    }
}

/// All matches of one event, created together at generation time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub settings: BracketSettings,
    /// Sorted by seed, seed 1 first.
    pub seeds: Vec<SeedAssignment>,
    pub matches: Vec<BracketMatch>,
    pub generated_at: DateTime<Utc>,
    pub champion_id: Option<TeamId>,
}

impl Bracket {
    pub fn new(settings: BracketSettings, seeds: Vec<SeedAssignment>, matches: Vec<BracketMatch>) -> Self {
        Self {
            settings,
            seeds,
            matches,
            generated_at: Utc::now(),
            champion_id: None,
        }
    }

    pub fn format(&self) -> BracketFormat {
        self.settings.format
    }

    pub fn teams_count(&self) -> usize {
        self.seeds.len()
    }

    pub fn team_for_seed(&self, seed: u32) -> Option<TeamId> {
        self.seeds.iter().find(|s| s.seed == seed).map(|s| s.team_id)
    }

    pub fn seed_of(&self, team: TeamId) -> Option<u32> {
        self.seeds.iter().find(|s| s.team_id == team).map(|s| s.seed)
    }

    pub fn find_match(&self, key: MatchKey) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.key() == key)
    }

    pub fn find_match_mut(&mut self, key: MatchKey) -> Option<&mut BracketMatch> {
        self.matches.iter_mut().find(|m| m.key() == key)
    }

    /// Matches of one part of the bracket, in round then position order.
    pub fn matches_of(&self, bracket_type: BracketType) -> Vec<&BracketMatch> {
        let mut ms: Vec<_> = self
            .matches
            .iter()
            .filter(|m| m.bracket_type == bracket_type)
            .collect();
        ms.sort_by_key(|m| (m.round, m.bracket_position));
        ms
    }

    /// Highest round number of one part of the bracket (0 when absent).
    pub fn rounds(&self, bracket_type: BracketType) -> u32 {
        self.matches
            .iter()
            .filter(|m| m.bracket_type == bracket_type)
            .map(|m| m.round)
            .max()
            .unwrap_or(0)
    }

    /// Matches that are not byes.
    pub fn playable_matches(&self) -> usize {
        self.matches.iter().filter(|m| !m.is_bye).count()
    }

    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(|m| m.status == MatchStatus::Completed)
    }

    /// True once any real match has started or finished.
    pub fn has_played_matches(&self) -> bool {
        self.matches.iter().any(|m| m.is_played())
    }

    /// Lowest round that still has an unfinished match.
    pub fn current_round(&self) -> u32 {
        self.matches
            .iter()
            .filter(|m| !m.is_completed())
            .map(|m| m.round)
            .min()
            .unwrap_or_else(|| self.matches.iter().map(|m| m.round).max().unwrap_or(0))
    }
}

/// An event: registered teams and, once generated, its bracket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Format used when a generate request does not name one.
    pub format: Option<BracketFormat>,
    pub status: EventStatus,
    pub teams: Vec<Team>,
    pub current_round: u32,
    pub bracket: Option<Bracket>,
    pub winner_id: Option<TeamId>,
}

impl Event {
    /// Create a new event with no teams.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format: None,
            status: EventStatus::Upcoming,
            teams: Vec::new(),
            current_round: 0,
            bracket: None,
            winner_id: None,
        }
    }

    /// Create an event with initial teams. Names must be unique (case-insensitive).
    pub fn with_teams(name: impl Into<String>, teams: Vec<Team>) -> Result<Self, BracketError> {
        let mut event = Self::new(name);
        for team in teams {
            event.register_team(team)?;
        }
        Ok(event)
    }

    /// Register a team. Rejected once a bracket exists; team names are unique (case-insensitive).
    pub fn register_team(&mut self, mut team: Team) -> Result<(), BracketError> {
        if self.bracket.is_some() {
            return Err(BracketError::Integrity(
                "teams cannot change while a bracket exists".to_string(),
            ));
        }
        let name = team.name.trim().to_string();
        if name.is_empty() {
            return Err(BracketError::Validation("team name is required".to_string()));
        }
        if self.teams.iter().any(|t| t.name.eq_ignore_ascii_case(&name)) {
            return Err(BracketError::Validation(format!(
                "a team named {name} is already registered"
            )));
        }
        team.name = name;
        self.teams.push(team);
        Ok(())
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn bracket(&self) -> Result<&Bracket, BracketError> {
        self.bracket
            .as_ref()
            .ok_or_else(|| BracketError::NotFound("bracket".to_string()))
    }

    pub fn bracket_mut(&mut self) -> Result<&mut Bracket, BracketError> {
        self.bracket
            .as_mut()
            .ok_or_else(|| BracketError::NotFound("bracket".to_string()))
    }
}

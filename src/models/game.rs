//! Bracket match, its slots and where each slot is fed from.

use crate::models::event::BracketError;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match a team occupies.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Team1,
    Team2,
}

impl Slot {
    /// Side fed by the match at `position` of the previous round: odd → team1, even → team2.
    pub fn for_position(position: u32) -> Self {
        if position % 2 == 1 {
            Slot::Team1
        } else {
            Slot::Team2
        }
    }
}

/// Which part of the bracket a match belongs to. Ordering is display order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    Main,
    Winners,
    Losers,
    GrandFinal,
    RoundRobin,
    Swiss,
}

impl fmt::Display for BracketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BracketType::Main => "main",
            BracketType::Winners => "winners",
            BracketType::Losers => "losers",
            BracketType::GrandFinal => "grand_final",
            BracketType::RoundRobin => "round_robin",
            BracketType::Swiss => "swiss",
        };
        f.write_str(s)
    }
}

/// Lifecycle of a match: upcoming → live → completed, never reopened.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Upcoming,
    Live,
    Completed,
}

/// Best-of-N series length.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFormat {
    Bo1,
    #[default]
    Bo3,
    Bo5,
    Bo7,
}

impl FromStr for MatchFormat {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bo1" => Ok(MatchFormat::Bo1),
            "bo3" => Ok(MatchFormat::Bo3),
            "bo5" => Ok(MatchFormat::Bo5),
            "bo7" => Ok(MatchFormat::Bo7),
            other => Err(BracketError::Validation(format!(
                "unsupported match format: {other}"
            ))),
        }
    }
}

/// Address of a match inside a bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MatchKey {
    pub bracket_type: BracketType,
    pub round: u32,
    pub position: u32,
}

impl MatchKey {
    pub fn new(bracket_type: BracketType, round: u32, position: u32) -> Self {
        Self {
            bracket_type,
            round,
            position,
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} round {} position {}", self.bracket_type, self.round, self.position)
    }
}

/// Where a team slot gets its team from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotSource {
    /// Filled at generation with the team holding this seed.
    Seed { seed: u32 },
    /// No opponent will ever arrive.
    Bye,
    /// Winner of another match.
    Winner { of: MatchKey },
    /// Loser of another match (double elimination drop-down).
    Loser { of: MatchKey },
    /// Decided by standings once the previous round is over (Swiss).
    Standings,
}

/// Per-map result inside a series.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MapResult {
    pub map_name: String,
    pub team1_score: u32,
    pub team2_score: u32,
}

/// A single match of a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    pub round: u32,
    pub bracket_position: u32,
    pub bracket_type: BracketType,
    /// None while the feeding match is unplayed, or for a bye.
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub team1_source: SlotSource,
    pub team2_source: SlotSource,
    pub team1_score: u32,
    pub team2_score: u32,
    pub status: MatchStatus,
    pub format: MatchFormat,
    /// Set on completion; stays None for a match that had no team at all.
    pub winner_id: Option<TeamId>,
    /// Resolved without being played.
    pub is_bye: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub maps: Vec<MapResult>,
}

impl BracketMatch {
    pub fn new(
        key: MatchKey,
        format: MatchFormat,
        team1_source: SlotSource,
        team2_source: SlotSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            round: key.round,
            bracket_position: key.position,
            bracket_type: key.bracket_type,
            team1_id: None,
            team2_id: None,
            team1_source,
            team2_source,
            team1_score: 0,
            team2_score: 0,
            status: MatchStatus::Upcoming,
            format,
            winner_id: None,
            is_bye: false,
            scheduled_at: None,
            completed_at: None,
            maps: Vec::new(),
        }
    }

    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.bracket_type, self.round, self.bracket_position)
    }

    pub fn team(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::Team1 => self.team1_id,
            Slot::Team2 => self.team2_id,
        }
    }

    pub fn set_team(&mut self, slot: Slot, team: Option<TeamId>) {
        match slot {
            Slot::Team1 => self.team1_id = team,
            Slot::Team2 => self.team2_id = team,
        }
    }

    pub fn source(&self, slot: Slot) -> SlotSource {
        match slot {
            Slot::Team1 => self.team1_source,
            Slot::Team2 => self.team2_source,
        }
    }

    pub fn set_source(&mut self, slot: Slot, source: SlotSource) {
        match slot {
            Slot::Team1 => self.team1_source = source,
            Slot::Team2 => self.team2_source = source,
        }
    }

    /// Both teams known.
    pub fn is_ready(&self) -> bool {
        self.team1_id.is_some() && self.team2_id.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// A real (non-bye) match that has started or finished.
    pub fn is_played(&self) -> bool {
        !self.is_bye && self.status != MatchStatus::Upcoming
    }

    /// The other team of a completed match, if there was one.
    pub fn loser_id(&self) -> Option<TeamId> {
        let winner = self.winner_id?;
        if self.team1_id == Some(winner) {
            self.team2_id
        } else {
            self.team1_id
        }
    }
}

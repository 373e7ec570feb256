//! Display structure of a bracket: matches grouped by round, with round names and team names.

use crate::logic::elimination_rounds;
use crate::models::{
    Bracket, BracketFormat, BracketMatch, BracketType, Event, EventId, EventStatus, MatchFormat,
    MatchId, MatchStatus, SeedingType, TeamId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize)]
pub struct TeamView {
    pub id: TeamId,
    pub name: String,
    pub short_name: Option<String>,
    pub seed: Option<u32>,
    pub score: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchView {
    pub id: MatchId,
    pub position: u32,
    pub team1: Option<TeamView>,
    pub team2: Option<TeamView>,
    pub status: MatchStatus,
    pub format: MatchFormat,
    pub winner_id: Option<TeamId>,
    pub is_bye: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoundView {
    pub round: u32,
    pub bracket_type: BracketType,
    pub name: String,
    pub matches: Vec<MatchView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BracketMetadata {
    pub teams_count: usize,
    pub rounds: u32,
    pub matches_count: usize,
    pub seeding_type: SeedingType,
    pub match_format: MatchFormat,
    pub finals_format: MatchFormat,
}

#[derive(Clone, Debug, Serialize)]
pub struct BracketView {
    pub event_id: EventId,
    pub event_name: String,
    pub format: BracketFormat,
    pub status: EventStatus,
    pub current_round: u32,
    pub metadata: BracketMetadata,
    pub bracket: Vec<RoundView>,
    pub champion_id: Option<TeamId>,
}

impl BracketView {
    pub fn new(event: &Event, bracket: &Bracket) -> Self {
        let rounds = [
            BracketType::Main,
            BracketType::Winners,
            BracketType::RoundRobin,
            BracketType::Swiss,
        ]
        .into_iter()
        .map(|t| bracket.rounds(t))
        .max()
        .unwrap_or(0);
        Self {
            event_id: event.id,
            event_name: event.name.clone(),
            format: bracket.format(),
            status: event.status,
            current_round: event.current_round,
            metadata: BracketMetadata {
                teams_count: bracket.teams_count(),
                rounds,
                matches_count: bracket.matches.len(),
                seeding_type: bracket.settings.seeding_type,
                match_format: bracket.settings.match_format,
                finals_format: bracket.settings.finals_format,
            },
            bracket: rounds_view(event, bracket),
            champion_id: bracket.champion_id,
        }
    }
}

/// Matches grouped by (bracket type, round), in display order.
pub fn rounds_view(event: &Event, bracket: &Bracket) -> Vec<RoundView> {
    let mut grouped: BTreeMap<(BracketType, u32), Vec<&BracketMatch>> = BTreeMap::new();
    for m in &bracket.matches {
        grouped.entry((m.bracket_type, m.round)).or_default().push(m);
    }
    let n = bracket.teams_count();
    grouped
        .into_iter()
        .map(|((bracket_type, round), mut matches)| {
            matches.sort_by_key(|m| m.bracket_position);
            let total = match bracket_type {
                BracketType::Losers => bracket.rounds(BracketType::Losers),
                _ => elimination_rounds(n),
            };
            RoundView {
                round,
                bracket_type,
                name: round_name(bracket_type, round, total),
                matches: matches
                    .into_iter()
                    .map(|m| match_view(event, bracket, m))
                    .collect(),
            }
        })
        .collect()
}

/// Human-readable round name. `total_rounds` is the round count of that part of the bracket.
pub fn round_name(bracket_type: BracketType, round: u32, total_rounds: u32) -> String {
    match bracket_type {
        BracketType::Main | BracketType::Winners => {
            let prefix = if bracket_type == BracketType::Winners {
                "Upper "
            } else {
                ""
            };
            match total_rounds.saturating_sub(round) + 1 {
                1 => format!("{prefix}Final"),
                2 => format!("{prefix}Semi-Finals"),
                3 => format!("{prefix}Quarter-Finals"),
                4 => format!("{prefix}Round of 16"),
                _ => format!("{prefix}Round {round}"),
            }
        }
        BracketType::Losers if round == total_rounds => "Lower Final".to_string(),
        BracketType::Losers => format!("Lower Round {round}"),
        BracketType::GrandFinal if round == 1 => "Grand Final".to_string(),
        BracketType::GrandFinal => "Grand Final Reset".to_string(),
        BracketType::RoundRobin | BracketType::Swiss => format!("Round {round}"),
    }
}

fn match_view(event: &Event, bracket: &Bracket, m: &BracketMatch) -> MatchView {
    let team_view = |id: Option<TeamId>, score: u32| {
        id.map(|id| TeamView {
            id,
            name: event
                .team(id)
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            short_name: event.team(id).and_then(|t| t.short_name.clone()),
            seed: bracket.seed_of(id),
            score,
        })
    };
    MatchView {
        id: m.id,
        position: m.bracket_position,
        team1: team_view(m.team1_id, m.team1_score),
        team2: team_view(m.team2_id, m.team2_score),
        status: m.status,
        format: m.format,
        winner_id: m.winner_id,
        is_bye: m.is_bye,
        scheduled_at: m.scheduled_at,
    }
}

//! Standings tables for round robin and Swiss brackets.

use crate::models::{Bracket, BracketFormat, BracketType, TeamId};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Points for a round robin win.
pub const POINTS_PER_WIN: u32 = 3;

/// One row of a round robin table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundRobinStanding {
    pub team_id: TeamId,
    pub seed: u32,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    /// Maps won across all series (series score).
    pub map_wins: u32,
    pub map_losses: u32,
    pub map_diff: i64,
    /// Rounds won inside individual maps, from per-map results.
    pub round_wins: u32,
    pub round_losses: u32,
    pub round_diff: i64,
    pub points: u32,
    pub win_percentage: f64,
}

/// One row of a Swiss table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SwissStanding {
    pub team_id: TeamId,
    pub seed: u32,
    /// A bye counts as a win.
    pub wins: u32,
    pub losses: u32,
    /// Sum of the wins of every opponent met.
    pub buchholz: u32,
    pub opponents: Vec<TeamId>,
    pub had_bye: bool,
}

impl SwissStanding {
    pub fn has_played(&self, other: TeamId) -> bool {
        self.opponents.contains(&other)
    }
}

/// Standings of a bracket, by format.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "table", rename_all = "snake_case")]
pub enum Standings {
    RoundRobin(Vec<RoundRobinStanding>),
    Swiss(Vec<SwissStanding>),
}

/// Standings for round robin and Swiss brackets; elimination brackets have none.
pub fn standings(bracket: &Bracket) -> Option<Standings> {
    match bracket.format() {
        BracketFormat::RoundRobin => Some(Standings::RoundRobin(round_robin_standings(bracket))),
        BracketFormat::Swiss => Some(Standings::Swiss(swiss_standings(bracket))),
        BracketFormat::SingleElimination | BracketFormat::DoubleElimination => None,
    }
}

/// Round robin table ordered by points, map difference, round difference, then seed.
pub fn round_robin_standings(bracket: &Bracket) -> Vec<RoundRobinStanding> {
    let mut rows: Vec<RoundRobinStanding> = bracket
        .seeds
        .iter()
        .map(|s| RoundRobinStanding {
            team_id: s.team_id,
            seed: s.seed,
            played: 0,
            wins: 0,
            losses: 0,
            map_wins: 0,
            map_losses: 0,
            map_diff: 0,
            round_wins: 0,
            round_losses: 0,
            round_diff: 0,
            points: 0,
            win_percentage: 0.0,
        })
        .collect();
    let index: HashMap<TeamId, usize> = rows.iter().enumerate().map(|(i, r)| (r.team_id, i)).collect();

    for m in bracket.matches_of(BracketType::RoundRobin) {
        if !m.is_completed() {
            continue;
        }
        let (Some(t1), Some(t2)) = (m.team1_id, m.team2_id) else {
            continue;
        };
        let (Some(&i1), Some(&i2)) = (index.get(&t1), index.get(&t2)) else {
            continue;
        };
        let (rounds1, rounds2) = m.maps.iter().fold((0, 0), |(a, b), map| {
            (a + map.team1_score, b + map.team2_score)
        });
        for (i, maps_for, maps_against, rounds_for, rounds_against) in [
            (i1, m.team1_score, m.team2_score, rounds1, rounds2),
            (i2, m.team2_score, m.team1_score, rounds2, rounds1),
        ] {
            let row = &mut rows[i];
            row.played += 1;
            row.map_wins += maps_for;
            row.map_losses += maps_against;
            row.round_wins += rounds_for;
            row.round_losses += rounds_against;
        }
        if m.winner_id == Some(t1) {
            rows[i1].wins += 1;
            rows[i1].points += POINTS_PER_WIN;
            rows[i2].losses += 1;
        } else if m.winner_id == Some(t2) {
            rows[i2].wins += 1;
            rows[i2].points += POINTS_PER_WIN;
            rows[i1].losses += 1;
        }
    }

    for row in &mut rows {
        row.map_diff = i64::from(row.map_wins) - i64::from(row.map_losses);
        row.round_diff = i64::from(row.round_wins) - i64::from(row.round_losses);
        if row.played > 0 {
            row.win_percentage =
                (f64::from(row.wins) / f64::from(row.played) * 1000.0).round() / 10.0;
        }
    }
    rows.sort_by_key(|r| (Reverse(r.points), Reverse(r.map_diff), Reverse(r.round_diff), r.seed));
    rows
}

/// Swiss table ordered by wins, Buchholz, then seed.
pub fn swiss_standings(bracket: &Bracket) -> Vec<SwissStanding> {
    let mut rows: Vec<SwissStanding> = bracket
        .seeds
        .iter()
        .map(|s| SwissStanding {
            team_id: s.team_id,
            seed: s.seed,
            wins: 0,
            losses: 0,
            buchholz: 0,
            opponents: Vec::new(),
            had_bye: false,
        })
        .collect();
    let index: HashMap<TeamId, usize> = rows.iter().enumerate().map(|(i, r)| (r.team_id, i)).collect();

    for m in bracket.matches_of(BracketType::Swiss) {
        if !m.is_completed() {
            continue;
        }
        let Some(winner) = m.winner_id.and_then(|w| index.get(&w).copied()) else {
            continue;
        };
        rows[winner].wins += 1;
        if m.is_bye {
            rows[winner].had_bye = true;
            continue;
        }
        if let Some(loser) = m.loser_id().and_then(|l| index.get(&l).copied()) {
            rows[loser].losses += 1;
            let (w_id, l_id) = (rows[winner].team_id, rows[loser].team_id);
            rows[winner].opponents.push(l_id);
            rows[loser].opponents.push(w_id);
        }
    }

    let wins: HashMap<TeamId, u32> = rows.iter().map(|r| (r.team_id, r.wins)).collect();
    for row in &mut rows {
        row.buchholz = row.opponents.iter().filter_map(|o| wins.get(o)).sum();
    }
    rows.sort_by_key(|r| (Reverse(r.wins), Reverse(r.buchholz), r.seed));
    rows
}

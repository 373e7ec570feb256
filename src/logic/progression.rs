//! Match results and everything they set in motion: advancement, drop-downs, byes, champion.

use super::elimination::{
    elimination_rounds, grand_final_reset, loser_target, winner_target,
};
use super::standings::{round_robin_standings, swiss_standings};
use super::swiss::advance_swiss;
use crate::models::{
    Bracket, BracketError, BracketFormat, BracketMatch, BracketType, Event, EventStatus,
    MapResult, MatchId, MatchKey, MatchStatus, Slot, SlotSource, TeamId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest score accepted for either team.
pub const MAX_SCORE: u32 = 99;

/// Requested change to a match: scores and target status.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub team1_score: u32,
    pub team2_score: u32,
    pub status: MatchStatus,
    #[serde(default)]
    pub maps: Vec<MapResult>,
}

impl ScoreUpdate {
    pub fn completed(team1_score: u32, team2_score: u32) -> Self {
        Self {
            team1_score,
            team2_score,
            status: MatchStatus::Completed,
            maps: Vec::new(),
        }
    }

    pub fn live(team1_score: u32, team2_score: u32) -> Self {
        Self {
            status: MatchStatus::Live,
            ..Self::completed(team1_score, team2_score)
        }
    }
}

/// A team written into a later match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Advancement {
    pub team_id: TeamId,
    pub match_id: MatchId,
    pub slot: Slot,
    /// Sent down to the losers bracket rather than advancing.
    pub dropped: bool,
}

/// What a match update did.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub winner_id: Option<TeamId>,
    pub advancements: Vec<Advancement>,
    pub champion_id: Option<TeamId>,
}

/// Apply a score/status update to a match of `event` and run advancement.
///
/// Errors leave `event` partially modified; callers run this on a copy and keep it only on
/// success (see [`crate::store::BracketStore`]).
pub fn update_match(
    event: &mut Event,
    match_id: MatchId,
    update: &ScoreUpdate,
    now: DateTime<Utc>,
) -> Result<MatchOutcome, BracketError> {
    if update.team1_score > MAX_SCORE || update.team2_score > MAX_SCORE {
        return Err(BracketError::Validation(format!(
            "scores must be between 0 and {MAX_SCORE}"
        )));
    }
    let bracket = event.bracket_mut()?;
    let idx = bracket
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or_else(|| BracketError::NotFound("match".to_string()))?;
    let outcome = record_result(bracket, idx, update, now)?;
    sync_event(event);
    Ok(outcome)
}

/// Validate the status transition, store scores, and on completion advance the winner.
pub fn record_result(
    bracket: &mut Bracket,
    idx: usize,
    update: &ScoreUpdate,
    now: DateTime<Utc>,
) -> Result<MatchOutcome, BracketError> {
    check_transition(&bracket.matches[idx], update)?;

    let m = &mut bracket.matches[idx];
    m.team1_score = update.team1_score;
    m.team2_score = update.team2_score;
    if !update.maps.is_empty() {
        m.maps = update.maps.clone();
    }
    m.status = update.status;
    let mut outcome = MatchOutcome {
        match_id: m.id,
        status: m.status,
        winner_id: None,
        advancements: Vec::new(),
        champion_id: None,
    };
    if update.status != MatchStatus::Completed {
        return Ok(outcome);
    }

    let winner = if update.team1_score > update.team2_score {
        m.team1_id
    } else {
        m.team2_id
    };
    let key = m.key();
    outcome.winner_id = winner;
    complete_match(bracket, idx, winner, now, &mut outcome.advancements)?;
    log::info!("Match {} ({key}) completed", outcome.match_id);

    match bracket.format() {
        BracketFormat::SingleElimination | BracketFormat::DoubleElimination => {
            if start_grand_final_reset(bracket, idx) {
                return Ok(outcome);
            }
            resolve_byes(bracket, now, &mut outcome.advancements)?;
        }
        BracketFormat::RoundRobin => {}
        BracketFormat::Swiss => {
            if advance_swiss(bracket, key.round)? {
                resolve_byes(bracket, now, &mut outcome.advancements)?;
            }
        }
    }
    bracket.champion_id = champion(bracket);
    outcome.champion_id = bracket.champion_id;
    Ok(outcome)
}

/// Auto-resolve every match that can no longer get two teams.
///
/// One team present and the other slot dead: the present team wins 0–0. Both slots dead:
/// the match completes with no winner. Repeats until nothing changes, since each resolution
/// can make slots further down the bracket dead too.
pub fn resolve_byes(
    bracket: &mut Bracket,
    now: DateTime<Utc>,
    advancements: &mut Vec<Advancement>,
) -> Result<(), BracketError> {
    loop {
        let next = bracket.matches.iter().enumerate().find_map(|(i, m)| {
            if m.status != MatchStatus::Upcoming {
                return None;
            }
            bye_resolution(bracket, m).map(|winner| (i, winner))
        });
        let Some((idx, winner)) = next else {
            return Ok(());
        };
        bracket.matches[idx].is_bye = true;
        complete_match(bracket, idx, winner, now, advancements)?;
        if let Some(team) = winner {
            log::info!("Team {team} advanced by bye from {}", bracket.matches[idx].key());
        }
    }
}

/// Champion of the bracket once its deciding match (or last round) is over.
pub fn champion(bracket: &Bracket) -> Option<TeamId> {
    let n = bracket.teams_count();
    match bracket.format() {
        BracketFormat::SingleElimination => bracket
            .find_match(MatchKey::new(BracketType::Main, elimination_rounds(n), 1))
            .filter(|m| m.is_completed())
            .and_then(|m| m.winner_id),
        BracketFormat::DoubleElimination => bracket
            .matches_of(BracketType::GrandFinal)
            .last()
            .filter(|m| m.is_completed())
            .and_then(|m| m.winner_id),
        BracketFormat::RoundRobin if bracket.is_complete() => {
            round_robin_standings(bracket).first().map(|s| s.team_id)
        }
        BracketFormat::Swiss if bracket.is_complete() => {
            swiss_standings(bracket).first().map(|s| s.team_id)
        }
        BracketFormat::RoundRobin | BracketFormat::Swiss => None,
    }
}

/// Copy bracket progress onto the event: current round, status and winner.
pub fn sync_event(event: &mut Event) {
    let Some(bracket) = &event.bracket else {
        return;
    };
    event.current_round = bracket.current_round();
    event.winner_id = bracket.champion_id;
    event.status = if bracket.champion_id.is_some() {
        EventStatus::Completed
    } else {
        EventStatus::Ongoing
    };
}

fn check_transition(m: &BracketMatch, update: &ScoreUpdate) -> Result<(), BracketError> {
    use MatchStatus::*;
    match (m.status, update.status) {
        (Completed, _) => Err(BracketError::Integrity(
            "match already completed".to_string(),
        )),
        (Live, Upcoming) => Err(BracketError::Integrity(
            "a live match cannot return to upcoming".to_string(),
        )),
        (_, Live | Completed) if !m.is_ready() => Err(BracketError::Validation(
            "both teams must be known before the match can start".to_string(),
        )),
        (_, Completed) if update.team1_score == update.team2_score => {
            Err(BracketError::Validation(
                "a completed match needs a winner; tied scores are not allowed".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Mark the match completed and move winner and loser to the slots they feed.
fn complete_match(
    bracket: &mut Bracket,
    idx: usize,
    winner: Option<TeamId>,
    now: DateTime<Utc>,
    advancements: &mut Vec<Advancement>,
) -> Result<(), BracketError> {
    let m = &mut bracket.matches[idx];
    m.status = MatchStatus::Completed;
    m.winner_id = winner;
    m.completed_at = Some(now);
    let (key, loser) = (m.key(), m.loser_id());

    let n = bracket.teams_count();
    if let (Some(team), Some((target, slot))) = (winner, winner_target(key, n)) {
        advancements.push(place_team(bracket, target, slot, team, false)?);
    }
    if let (Some(team), Some((target, slot))) = (loser, loser_target(key, n)) {
        advancements.push(place_team(bracket, target, slot, team, true)?);
    }
    Ok(())
}

fn place_team(
    bracket: &mut Bracket,
    target: MatchKey,
    slot: Slot,
    team: TeamId,
    dropped: bool,
) -> Result<Advancement, BracketError> {
    let m = bracket.find_match_mut(target).ok_or_else(|| {
        BracketError::Integrity(format!("advancement target {target} does not exist"))
    })?;
    if m.is_completed() {
        return Err(BracketError::Integrity(format!(
            "advancement target {target} is already completed"
        )));
    }
    match m.team(slot) {
        Some(existing) if existing != team => {
            return Err(BracketError::Integrity(format!(
                "{slot:?} of {target} is already taken"
            )));
        }
        _ => m.set_team(slot, Some(team)),
    }
    if dropped {
        log::info!("Team {team} dropped to {target} ({slot:?})");
    } else {
        log::info!("Team {team} advanced to {target} ({slot:?})");
    }
    Ok(Advancement {
        team_id: team,
        match_id: m.id,
        slot,
        dropped,
    })
}

/// `Some(winner)` when the match must resolve without being played.
fn bye_resolution(bracket: &Bracket, m: &BracketMatch) -> Option<Option<TeamId>> {
    let dead1 = slot_is_dead(bracket, m, Slot::Team1);
    let dead2 = slot_is_dead(bracket, m, Slot::Team2);
    match (m.team1_id, m.team2_id) {
        (Some(team), None) if dead2 => Some(Some(team)),
        (None, Some(team)) if dead1 => Some(Some(team)),
        (None, None) if dead1 && dead2 => Some(None),
        _ => None,
    }
}

/// An empty slot that nothing will ever fill.
fn slot_is_dead(bracket: &Bracket, m: &BracketMatch, slot: Slot) -> bool {
    if m.team(slot).is_some() {
        return false;
    }
    match m.source(slot) {
        SlotSource::Bye => true,
        SlotSource::Winner { of } => bracket
            .find_match(of)
            .is_some_and(|f| f.is_completed() && f.winner_id.is_none()),
        SlotSource::Loser { of } => bracket
            .find_match(of)
            .is_some_and(|f| f.is_completed() && f.loser_id().is_none()),
        SlotSource::Seed { .. } | SlotSource::Standings => false,
    }
}

/// Create the grand-final replay when enabled and the losers-bracket champion took the first.
fn start_grand_final_reset(bracket: &mut Bracket, idx: usize) -> bool {
    let gf = &bracket.matches[idx];
    let triggered = bracket.settings.grand_final_reset
        && gf.bracket_type == BracketType::GrandFinal
        && gf.round == 1
        && gf.winner_id.is_some()
        && gf.winner_id == gf.team2_id;
    if triggered {
        let reset = grand_final_reset(gf);
        log::info!("Grand final reset scheduled ({})", reset.key());
        bracket.matches.push(reset);
    }
    triggered
}

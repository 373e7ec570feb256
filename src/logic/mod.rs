//! Bracket business logic: seeding, construction per format, progression, standings.

mod elimination;
mod progression;
mod round_robin;
mod seeding;
mod standings;
mod swiss;

pub use elimination::{
    advancement_target, build_double_elimination, build_single_elimination, elimination_rounds,
    grand_final_key, loser_target, losers_round_matches, losers_rounds, winner_target,
};
pub use progression::{
    champion, record_result, resolve_byes, sync_event, update_match, Advancement, MatchOutcome,
    ScoreUpdate, MAX_SCORE,
};
pub use round_robin::{build_round_robin, round_robin_schedule};
pub use seeding::{bracket_size, generate_seeding_order, seed_teams};
pub use standings::{
    round_robin_standings, standings, swiss_standings, RoundRobinStanding, Standings,
    SwissStanding, POINTS_PER_WIN,
};
pub use swiss::{advance_swiss, build_swiss, pair_swiss_round, swiss_rounds};

use crate::models::{
    Bracket, BracketError, BracketFormat, BracketMatch, BracketSettings, BracketType, Event,
    EventStatus, SeedAssignment,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::BTreeMap;

/// Teams supported per bracket unless configured otherwise.
pub const DEFAULT_MAX_TEAMS: usize = 64;

pub(crate) fn require_participants(n: usize) -> Result<(), BracketError> {
    if n < 2 {
        return Err(BracketError::Validation(format!(
            "insufficient participants: need at least 2 teams to generate bracket, got {n}"
        )));
    }
    Ok(())
}

/// Build every match of a bracket for already-seeded teams.
pub fn build_matches(
    seeds: &[SeedAssignment],
    settings: &BracketSettings,
) -> Result<Vec<BracketMatch>, BracketError> {
    match settings.format {
        BracketFormat::SingleElimination => build_single_elimination(seeds, settings),
        BracketFormat::DoubleElimination => build_double_elimination(seeds, settings),
        BracketFormat::RoundRobin => build_round_robin(seeds, settings),
        BracketFormat::Swiss => build_swiss(seeds, settings),
    }
}

/// Generate (or regenerate) the bracket of `event`. Returns the number of matches created.
///
/// 1. Refuse when the current bracket already has a live or completed match.
/// 2. Check the team count (2..=`max_teams`).
/// 3. Seed, build all rounds, schedule, resolve byes.
/// 4. Replace any previous bracket; event becomes ongoing.
pub fn generate_bracket<R: Rng + ?Sized>(
    event: &mut Event,
    settings: BracketSettings,
    max_teams: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<usize, BracketError> {
    if event.bracket.as_ref().is_some_and(|b| b.has_played_matches()) {
        return Err(BracketError::Integrity(
            "bracket already in progress; delete it before generating a new one".to_string(),
        ));
    }
    let n = event.teams.len();
    require_participants(n)?;
    if n > max_teams {
        return Err(BracketError::Validation(format!(
            "Maximum {max_teams} teams supported for bracket generation"
        )));
    }

    let seeds = seed_teams(&event.teams, settings.seeding_type, rng);
    let mut matches = build_matches(&seeds, &settings)?;
    schedule_matches(&mut matches, n, now);

    let mut bracket = Bracket::new(settings, seeds, matches);
    bracket.generated_at = now;
    let mut advancements = Vec::new();
    resolve_byes(&mut bracket, now, &mut advancements)?;
    let created = bracket.matches.len();

    event.bracket = Some(bracket);
    event.format = Some(settings.format);
    event.winner_id = None;
    sync_event(event);
    log::info!(
        "Generated {} bracket for event {}: {} teams, {} matches, {} bye advancements",
        settings.format,
        event.id,
        n,
        created,
        advancements.len()
    );
    Ok(created)
}

/// Remove the bracket of `event` and reset it to upcoming. Returns the number of matches removed.
pub fn delete_bracket(event: &mut Event) -> usize {
    let removed = event.bracket.take().map_or(0, |b| b.matches.len());
    event.status = EventStatus::Upcoming;
    event.current_round = 0;
    event.winner_id = None;
    removed
}

/// Staggered start times. Matches are slotted by play depth, so a losers round or the grand
/// final always starts after every match feeding it. Depth one is spaced 10 minutes apart after a
/// 30 minute lead, deeper slots 15 minutes apart with a 45 minute break between depths.
fn schedule_matches(matches: &mut [BracketMatch], teams: usize, start: DateTime<Utc>) {
    let mut by_depth: BTreeMap<u32, Vec<&mut BracketMatch>> = BTreeMap::new();
    for m in matches {
        by_depth.entry(play_depth(m, teams)).or_default().push(m);
    }
    let mut offset = 30;
    for (depth, mut slot) in by_depth {
        slot.sort_by_key(|m| (m.bracket_type, m.bracket_position));
        let spacing = if depth == 1 { 10 } else { 15 };
        let len = slot.len() as i64;
        for (i, m) in (1..).zip(slot) {
            m.scheduled_at = Some(start + Duration::minutes(offset + spacing * i));
        }
        offset += spacing * len + 45;
    }
}

/// Winners round `r` is depth `r`. Losers round `r` is fed by losers round `r - 1` and at most
/// winners round `r`. The grand final comes after both finals.
fn play_depth(m: &BracketMatch, teams: usize) -> u32 {
    match m.bracket_type {
        BracketType::Losers => m.round + 1,
        BracketType::GrandFinal => losers_rounds(teams) + 1 + m.round,
        BracketType::Main | BracketType::Winners | BracketType::RoundRobin | BracketType::Swiss => {
            m.round
        }
    }
}

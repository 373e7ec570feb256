//! Swiss system: fixed number of rounds, each paired from the standings of the previous ones.

use super::require_participants;
use super::seeding::bracket_size;
use super::standings::{swiss_standings, SwissStanding};
use crate::models::{
    Bracket, BracketError, BracketMatch, BracketSettings, BracketType, MatchKey, MatchStatus,
    SeedAssignment, SlotSource, TeamId,
};

/// Upper bound on backtracking steps before falling back to greedy pairing.
const PAIRING_SEARCH_BUDGET: usize = 100_000;

/// Rounds in a Swiss stage of `n` teams: ceil(log2(n)).
pub fn swiss_rounds(n: usize) -> u32 {
    bracket_size(n).trailing_zeros()
}

/// Round one paired by seed adjacency (1 v 2, 3 v 4, ...), later rounds as placeholders.
///
/// With an odd team count the lowest seed gets the round-one bye, and every round keeps one
/// extra placeholder for the bye handed out when it is paired.
pub fn build_swiss(
    seeds: &[SeedAssignment],
    settings: &BracketSettings,
) -> Result<Vec<BracketMatch>, BracketError> {
    let n = seeds.len();
    require_participants(n)?;
    let per_round = (n + 1) / 2;
    let mut matches = Vec::with_capacity(per_round * swiss_rounds(n) as usize);

    for (i, pair) in seeds.chunks(2).enumerate() {
        let key = MatchKey::new(BracketType::Swiss, 1, i as u32 + 1);
        let (first, second) = (&pair[0], pair.get(1));
        let mut m = BracketMatch::new(
            key,
            settings.match_format,
            SlotSource::Seed { seed: first.seed },
            second.map_or(SlotSource::Bye, |s| SlotSource::Seed { seed: s.seed }),
        );
        m.team1_id = Some(first.team_id);
        m.team2_id = second.map(|s| s.team_id);
        matches.push(m);
    }

    for round in 2..=swiss_rounds(n) {
        for position in 1..=per_round {
            matches.push(BracketMatch::new(
                MatchKey::new(BracketType::Swiss, round, position as u32),
                settings.match_format,
                SlotSource::Standings,
                SlotSource::Standings,
            ));
        }
    }
    Ok(matches)
}

/// Pair one round from ranked standings.
///
/// On an odd count the lowest-ranked team without a bye sits out. The rest are paired top
/// down, each team meeting the best-ranked remaining team it has not played yet; rematches
/// are only allowed when no rematch-free pairing exists.
pub fn pair_swiss_round(standings: &[SwissStanding]) -> Vec<(TeamId, Option<TeamId>)> {
    let mut pool: Vec<&SwissStanding> = standings.iter().collect();
    let bye = if pool.len() % 2 == 1 {
        let idx = pool
            .iter()
            .rposition(|s| !s.had_bye)
            .unwrap_or(pool.len() - 1);
        Some(pool.remove(idx).team_id)
    } else {
        None
    };

    let mut pairs = pair_without_rematch(&pool).unwrap_or_else(|| greedy_pairs(&pool));
    if let Some(team) = bye {
        pairs.push((team, None));
    }
    pairs
}

/// Fill round `round + 1` once every match of `round` is completed. Returns true when a new
/// round was paired.
pub fn advance_swiss(bracket: &mut Bracket, round: u32) -> Result<bool, BracketError> {
    let n = bracket.teams_count();
    if round >= swiss_rounds(n) {
        return Ok(false);
    }
    let round_done = bracket
        .matches
        .iter()
        .filter(|m| m.bracket_type == BracketType::Swiss && m.round == round)
        .all(|m| m.is_completed());
    if !round_done {
        return Ok(false);
    }

    let next = round + 1;
    let pairs = pair_swiss_round(&swiss_standings(bracket));
    let mut placeholders: Vec<&mut BracketMatch> = bracket
        .matches
        .iter_mut()
        .filter(|m| m.bracket_type == BracketType::Swiss && m.round == next)
        .collect();
    if placeholders.len() != pairs.len() {
        return Err(BracketError::Integrity(format!(
            "swiss round {next} has {} matches for {} pairings",
            placeholders.len(),
            pairs.len()
        )));
    }
    placeholders.sort_by_key(|m| m.bracket_position);
    for (m, (team1, team2)) in placeholders.into_iter().zip(pairs) {
        if m.status != MatchStatus::Upcoming || m.team1_id.is_some() || m.team2_id.is_some() {
            return Err(BracketError::Integrity(format!(
                "{} was already paired",
                m.key()
            )));
        }
        m.team1_id = Some(team1);
        m.team2_id = team2;
        if team2.is_none() {
            m.team2_source = SlotSource::Bye;
        }
    }
    log::info!("Paired swiss round {next}");
    Ok(true)
}

fn pair_without_rematch(pool: &[&SwissStanding]) -> Option<Vec<(TeamId, Option<TeamId>)>> {
    let mut used = vec![false; pool.len()];
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    let mut budget = PAIRING_SEARCH_BUDGET;
    if search(pool, &mut used, &mut pairs, &mut budget) {
        Some(pairs)
    } else {
        None
    }
}

fn search(
    pool: &[&SwissStanding],
    used: &mut [bool],
    pairs: &mut Vec<(TeamId, Option<TeamId>)>,
    budget: &mut usize,
) -> bool {
    let Some(first) = used.iter().position(|u| !u) else {
        return true;
    };
    used[first] = true;
    for j in first + 1..pool.len() {
        if *budget == 0 {
            break;
        }
        *budget -= 1;
        if used[j] || pool[first].has_played(pool[j].team_id) {
            continue;
        }
        used[j] = true;
        pairs.push((pool[first].team_id, Some(pool[j].team_id)));
        if search(pool, used, pairs, budget) {
            return true;
        }
        pairs.pop();
        used[j] = false;
    }
    used[first] = false;
    false
}

fn greedy_pairs(pool: &[&SwissStanding]) -> Vec<(TeamId, Option<TeamId>)> {
    let mut remaining: Vec<&SwissStanding> = pool.to_vec();
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    while remaining.len() >= 2 {
        let top = remaining.remove(0);
        let idx = remaining
            .iter()
            .position(|s| !top.has_played(s.team_id))
            .unwrap_or(0);
        let opponent = remaining.remove(idx);
        pairs.push((top.team_id, Some(opponent.team_id)));
    }
    pairs
}

//! Single and double elimination: bracket construction and advancement links.
//!
//! Every slot past round one is wired from the match that feeds it, using the same
//! [`winner_target`] / [`loser_target`] functions that move teams when a match completes.

use super::require_participants;
use super::seeding::{bracket_size, generate_seeding_order};
use crate::models::{
    BracketError, BracketMatch, BracketSettings, BracketType, MatchFormat, MatchKey,
    SeedAssignment, Slot, SlotSource, TeamId,
};
use std::collections::HashMap;

/// Rounds of a single-elimination (or winners) bracket for `n` teams: ceil(log2(n)).
pub fn elimination_rounds(n: usize) -> u32 {
    bracket_size(n).trailing_zeros()
}

/// Rounds of the losers bracket for `n` teams: 2 × (winners rounds − 1).
pub fn losers_rounds(n: usize) -> u32 {
    2 * (elimination_rounds(n) - 1)
}

/// Matches in losers round `round` of a bracket with `size` slots.
///
/// Rounds come in pairs of equal size: an odd round halves the field, the even round after
/// it takes the drop-downs from the winners bracket.
pub fn losers_round_matches(size: usize, round: u32) -> u32 {
    (size >> ((round + 1) / 2 + 1)) as u32
}

/// Next-round slot for the winner of `(round, position)`: `(round + 1, ceil(position / 2))`,
/// team1 for an odd position and team2 for an even one.
pub fn advancement_target(round: u32, position: u32) -> (u32, u32, Slot) {
    (round + 1, (position + 1) / 2, Slot::for_position(position))
}

pub fn grand_final_key(round: u32) -> MatchKey {
    MatchKey::new(BracketType::GrandFinal, round, 1)
}

/// Where the winner of `key` goes in a bracket of `n` teams. None when the match decides
/// the champion (or the bracket type has no advancement).
pub fn winner_target(key: MatchKey, n: usize) -> Option<(MatchKey, Slot)> {
    let rounds = elimination_rounds(n);
    match key.bracket_type {
        BracketType::Main | BracketType::Winners if key.round < rounds => {
            let (round, position, slot) = advancement_target(key.round, key.position);
            Some((MatchKey::new(key.bracket_type, round, position), slot))
        }
        BracketType::Winners => Some((grand_final_key(1), Slot::Team1)),
        BracketType::Losers if key.round >= losers_rounds(n) => {
            Some((grand_final_key(1), Slot::Team2))
        }
        BracketType::Losers if key.round % 2 == 1 => Some((
            MatchKey::new(BracketType::Losers, key.round + 1, key.position),
            Slot::Team1,
        )),
        BracketType::Losers => {
            let (round, position, slot) = advancement_target(key.round, key.position);
            Some((MatchKey::new(BracketType::Losers, round, position), slot))
        }
        _ => None,
    }
}

/// Where the loser of a winners-bracket match drops to.
///
/// Round one losers pair up in losers round one. The losers of winners round `j + 1` meet
/// the survivors of losers round `2j - 1` in losers round `2j`, taking the team2 slot;
/// for odd `j` they enter in reverse order so early rematches are pushed apart.
/// With two teams there is no losers bracket and the loser goes straight to the grand final.
pub fn loser_target(key: MatchKey, n: usize) -> Option<(MatchKey, Slot)> {
    if key.bracket_type != BracketType::Winners {
        return None;
    }
    if elimination_rounds(n) == 1 {
        return Some((grand_final_key(1), Slot::Team2));
    }
    if key.round == 1 {
        return Some((
            MatchKey::new(BracketType::Losers, 1, (key.position + 1) / 2),
            Slot::for_position(key.position),
        ));
    }
    let j = key.round - 1;
    let round = 2 * j;
    let matches = losers_round_matches(bracket_size(n), round);
    let position = if j % 2 == 1 {
        matches + 1 - key.position
    } else {
        key.position
    };
    Some((
        MatchKey::new(BracketType::Losers, round, position),
        Slot::Team2,
    ))
}

/// Single elimination: round one from the seeding order, later rounds pre-created empty.
pub fn build_single_elimination(
    seeds: &[SeedAssignment],
    settings: &BracketSettings,
) -> Result<Vec<BracketMatch>, BracketError> {
    require_participants(seeds.len())?;
    let mut matches = elimination_tree(
        seeds,
        BracketType::Main,
        settings.match_format,
        settings.finals_format,
    );
    wire_sources(&mut matches, seeds.len());
    Ok(matches)
}

/// Double elimination: winners bracket, losers bracket and one grand final.
pub fn build_double_elimination(
    seeds: &[SeedAssignment],
    settings: &BracketSettings,
) -> Result<Vec<BracketMatch>, BracketError> {
    let n = seeds.len();
    require_participants(n)?;
    let size = bracket_size(n);
    let mut matches = elimination_tree(
        seeds,
        BracketType::Winners,
        settings.match_format,
        settings.match_format,
    );
    for round in 1..=losers_rounds(n) {
        for position in 1..=losers_round_matches(size, round) {
            matches.push(BracketMatch::new(
                MatchKey::new(BracketType::Losers, round, position),
                settings.match_format,
                SlotSource::Standings,
                SlotSource::Standings,
            ));
        }
    }
    matches.push(BracketMatch::new(
        grand_final_key(1),
        settings.finals_format,
        SlotSource::Standings,
        SlotSource::Standings,
    ));
    wire_sources(&mut matches, n);
    Ok(matches)
}

/// Replay of the grand final after the losers-bracket champion won the first one.
pub fn grand_final_reset(grand_final: &BracketMatch) -> BracketMatch {
    let key = grand_final.key();
    let mut reset = BracketMatch::new(
        grand_final_key(key.round + 1),
        grand_final.format,
        SlotSource::Loser { of: key },
        SlotSource::Winner { of: key },
    );
    reset.team1_id = grand_final.loser_id();
    reset.team2_id = grand_final.winner_id;
    reset
}

fn elimination_tree(
    seeds: &[SeedAssignment],
    bracket_type: BracketType,
    match_format: MatchFormat,
    final_format: MatchFormat,
) -> Vec<BracketMatch> {
    let n = seeds.len();
    let rounds = elimination_rounds(n);
    let order = generate_seeding_order(n);
    let format_for = |round: u32| {
        if round == rounds {
            final_format
        } else {
            match_format
        }
    };

    let mut matches = Vec::with_capacity(order.len() - 1);
    for (i, pair) in order.chunks_exact(2).enumerate() {
        let key = MatchKey::new(bracket_type, 1, i as u32 + 1);
        let mut m = BracketMatch::new(
            key,
            format_for(1),
            seed_source(pair[0], n),
            seed_source(pair[1], n),
        );
        m.team1_id = team_for_seed(seeds, pair[0]);
        m.team2_id = team_for_seed(seeds, pair[1]);
        matches.push(m);
    }

    let mut in_round = order.len() / 2;
    for round in 2..=rounds {
        in_round = (in_round + 1) / 2;
        for position in 1..=in_round {
            matches.push(BracketMatch::new(
                MatchKey::new(bracket_type, round, position as u32),
                format_for(round),
                SlotSource::Standings,
                SlotSource::Standings,
            ));
        }
    }
    matches
}

fn seed_source(seed: u32, n: usize) -> SlotSource {
    if seed as usize <= n {
        SlotSource::Seed { seed }
    } else {
        SlotSource::Bye
    }
}

/// Seeds are sorted, so seed `k` sits at index `k - 1`; seeds past the end are byes.
fn team_for_seed(seeds: &[SeedAssignment], seed: u32) -> Option<TeamId> {
    seeds.get(seed as usize - 1).map(|s| s.team_id)
}

fn wire_sources(matches: &mut [BracketMatch], n: usize) {
    let index: HashMap<MatchKey, usize> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| (m.key(), i))
        .collect();
    let links: Vec<(MatchKey, Slot, SlotSource)> = matches
        .iter()
        .flat_map(|m| {
            let of = m.key();
            let winner = winner_target(of, n).map(|(t, s)| (t, s, SlotSource::Winner { of }));
            let loser = loser_target(of, n).map(|(t, s)| (t, s, SlotSource::Loser { of }));
            winner.into_iter().chain(loser)
        })
        .collect();
    for (target, slot, source) in links {
        if let Some(&i) = index.get(&target) {
            matches[i].set_source(slot, source);
        }
    }
}

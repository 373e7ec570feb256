//! Round robin: every pair of teams meets exactly once.

use super::require_participants;
use crate::models::{
    BracketError, BracketMatch, BracketSettings, BracketType, MatchKey, SeedAssignment,
    SlotSource,
};

/// Circle-method schedule for `n` teams as `(round, seed_a, seed_b)`.
///
/// Seed 1 stays fixed while the others rotate. With an even `n` each round holds `n / 2`
/// matches, so match `i` (1-based, in schedule order) lands in round `ceil(i / (n / 2))`.
/// With an odd `n` one team sits out each round and no match is emitted for it.
pub fn round_robin_schedule(n: usize) -> Vec<(u32, u32, u32)> {
    let mut slots: Vec<Option<u32>> = (1..=n as u32).map(Some).collect();
    if n % 2 == 1 {
        slots.push(None);
    }
    let len = slots.len();
    let mut schedule = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for round in 1..len as u32 {
        for i in 0..len / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[len - 1 - i]) {
                schedule.push((round, a.min(b), a.max(b)));
            }
        }
        slots[1..].rotate_right(1);
    }
    schedule
}

/// All N·(N−1)/2 matches, teams known from the start.
pub fn build_round_robin(
    seeds: &[SeedAssignment],
    settings: &BracketSettings,
) -> Result<Vec<BracketMatch>, BracketError> {
    require_participants(seeds.len())?;
    let mut matches = Vec::new();
    let mut position = 0;
    let mut current_round = 0;
    for (round, a, b) in round_robin_schedule(seeds.len()) {
        if round != current_round {
            current_round = round;
            position = 0;
        }
        position += 1;
        let mut m = BracketMatch::new(
            MatchKey::new(BracketType::RoundRobin, round, position),
            settings.match_format,
            SlotSource::Seed { seed: a },
            SlotSource::Seed { seed: b },
        );
        m.team1_id = Some(seeds[a as usize - 1].team_id);
        m.team2_id = Some(seeds[b as usize - 1].team_id);
        matches.push(m);
    }
    Ok(matches)
}

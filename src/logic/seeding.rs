//! Seeding: assign seeds to teams and lay them out in standard bracket order.

use crate::models::{SeedAssignment, SeedingType, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;

/// Smallest power of two that holds `n` teams (at least 2).
pub fn bracket_size(n: usize) -> usize {
    n.next_power_of_two().max(2)
}

/// Standard tournament seeding order for `n` teams.
///
/// The sequence has `bracket_size(n)` entries; consecutive pairs are round-one opponents
/// (1 v 8, 4 v 5, 2 v 7, 3 v 6 for eight teams). Seeds above `n` are byes.
///
/// Built by doubling: from `[1, 2]`, going from size `s` to `2s` every seed `k` is followed
/// by `2s + 1 - k`.
pub fn generate_seeding_order(n: usize) -> Vec<u32> {
    let size = bracket_size(n);
    let mut order = vec![1u32, 2];
    while order.len() < size {
        let mirror = (order.len() * 2 + 1) as u32;
        order = order.iter().flat_map(|&k| [k, mirror - k]).collect();
    }
    order
}

/// Assign seeds 1..=N to `teams`.
///
/// Rating and manual seeding are stable: teams that compare equal keep registration order,
/// so the same team list always gives the same seeds.
pub fn seed_teams<R: Rng + ?Sized>(
    teams: &[Team],
    seeding_type: SeedingType,
    rng: &mut R,
) -> Vec<SeedAssignment> {
    let mut ordered: Vec<&Team> = teams.iter().collect();
    match seeding_type {
        SeedingType::Rating => ordered.sort_by_key(|t| Reverse(t.effective_rating())),
        SeedingType::Manual => ordered.sort_by_key(|t| t.seed.unwrap_or(u32::MAX)),
        SeedingType::Random => ordered.shuffle(rng),
    }
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, t)| SeedAssignment {
            seed: i as u32 + 1,
            team_id: t.id,
        })
        .collect()
}

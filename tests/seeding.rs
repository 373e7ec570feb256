//! Integration tests for seeding: standard bracket order and seed assignment.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rivals_bracket::logic::{bracket_size, generate_seeding_order, seed_teams};
use rivals_bracket::{SeedingType, Team};
use std::collections::HashSet;

#[test]
fn seeding_order_for_eight_teams() {
    assert_eq!(generate_seeding_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
}

#[test]
fn seeding_order_for_four_and_sixteen_teams() {
    assert_eq!(generate_seeding_order(4), vec![1, 4, 2, 3]);
    assert_eq!(
        generate_seeding_order(16),
        vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
    );
}

#[test]
fn seeding_order_pads_to_power_of_two() {
    assert_eq!(bracket_size(2), 2);
    assert_eq!(bracket_size(5), 8);
    assert_eq!(bracket_size(33), 64);
    // 1 v bye, 4 v 5, 2 v bye, 3 v bye
    assert_eq!(generate_seeding_order(5), vec![1, 8, 4, 5, 2, 7, 3, 6]);
}

#[test]
fn seeding_order_is_a_permutation_with_mirrored_pairs() {
    for n in 2..=64 {
        let order = generate_seeding_order(n);
        let size = bracket_size(n);
        assert_eq!(order.len(), size);
        let unique: HashSet<u32> = order.iter().copied().collect();
        assert_eq!(unique.len(), size, "duplicate seed for n={n}");
        assert!(order.iter().all(|&s| s >= 1 && s as usize <= size));
        for pair in order.chunks(2) {
            assert_eq!(pair[0] + pair[1], size as u32 + 1, "n={n}");
        }
    }
}

#[test]
fn top_two_seeds_can_only_meet_in_the_final() {
    let order = generate_seeding_order(32);
    let half = order.len() / 2;
    assert!(order[..half].contains(&1));
    assert!(order[half..].contains(&2));
}

#[test]
fn seeding_order_is_deterministic() {
    assert_eq!(generate_seeding_order(12), generate_seeding_order(12));
}

#[test]
fn rating_seeding_puts_highest_rating_first() {
    let teams = vec![
        Team::new("Low").with_rating(900),
        Team::new("High").with_rating(1800),
        Team::new("Unrated"),
        Team::new("Mid").with_rating(1200),
    ];
    let seeds = seed_teams(&teams, SeedingType::Rating, &mut StdRng::seed_from_u64(1));
    let names: Vec<&str> = seeds
        .iter()
        .map(|s| teams.iter().find(|t| t.id == s.team_id).unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["High", "Mid", "Unrated", "Low"]);
    assert_eq!(seeds.iter().map(|s| s.seed).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[test]
fn rating_ties_keep_registration_order() {
    let teams: Vec<Team> = (0..6).map(|i| Team::new(format!("T{i}"))).collect();
    let seeds = seed_teams(&teams, SeedingType::Rating, &mut StdRng::seed_from_u64(1));
    for (s, t) in seeds.iter().zip(&teams) {
        assert_eq!(s.team_id, t.id);
    }
}

#[test]
fn manual_seeding_follows_requested_seeds() {
    let teams = vec![
        Team::new("C").with_seed(3),
        Team::new("A").with_seed(1),
        Team::new("Unseeded"),
        Team::new("B").with_seed(2),
    ];
    let seeds = seed_teams(&teams, SeedingType::Manual, &mut StdRng::seed_from_u64(1));
    assert_eq!(seeds[0].team_id, teams[1].id);
    assert_eq!(seeds[1].team_id, teams[3].id);
    assert_eq!(seeds[2].team_id, teams[0].id);
    assert_eq!(seeds[3].team_id, teams[2].id);
}

#[test]
fn random_seeding_is_a_permutation_and_reproducible_with_same_rng() {
    let teams: Vec<Team> = (0..10).map(|i| Team::new(format!("T{i}"))).collect();
    let a = seed_teams(&teams, SeedingType::Random, &mut StdRng::seed_from_u64(42));
    let b = seed_teams(&teams, SeedingType::Random, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
    let ids: HashSet<_> = a.iter().map(|s| s.team_id).collect();
    assert_eq!(ids.len(), teams.len());
    assert!(a.iter().enumerate().all(|(i, s)| s.seed == i as u32 + 1));
}

//! Integration tests for round robin: schedule, standings and champion.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rivals_bracket::logic::{
    generate_bracket, round_robin_schedule, round_robin_standings, standings, update_match,
    ScoreUpdate, Standings, DEFAULT_MAX_TEAMS, POINTS_PER_WIN,
};
use rivals_bracket::models::MapResult;
use rivals_bracket::{
    BracketFormat, BracketSettings, BracketType, Event, EventStatus, MatchStatus, Team,
};
use std::collections::HashSet;

fn round_robin_event(n: usize) -> Event {
    let teams = (0..n)
        .map(|i| Team::new(format!("Team {}", i + 1)).with_rating(2000 - i as i32))
        .collect();
    let mut event = Event::with_teams("League", teams).unwrap();
    let settings = BracketSettings {
        format: BracketFormat::RoundRobin,
        ..BracketSettings::default()
    };
    generate_bracket(
        &mut event,
        settings,
        DEFAULT_MAX_TEAMS,
        &mut StdRng::seed_from_u64(3),
        Utc::now(),
    )
    .unwrap();
    event
}

/// Complete every match; the better seed (team1) wins 2-0.
fn play_all(event: &mut Event) {
    let ids: Vec<_> = event.bracket().unwrap().matches.iter().map(|m| m.id).collect();
    for id in ids {
        update_match(event, id, &ScoreUpdate::completed(2, 0), Utc::now()).unwrap();
    }
}

#[test]
fn four_teams_play_six_matches_over_three_rounds() {
    let event = round_robin_event(4);
    let bracket = event.bracket().unwrap();
    assert_eq!(bracket.matches.len(), 6);
    assert_eq!(bracket.rounds(BracketType::RoundRobin), 3);
    assert!(bracket.matches.iter().all(|m| m.is_ready() && !m.is_bye));
}

#[test]
fn six_teams_play_fifteen_matches() {
    let event = round_robin_event(6);
    let bracket = event.bracket().unwrap();
    assert_eq!(bracket.matches.len(), 15);
    assert_eq!(bracket.rounds(BracketType::RoundRobin), 5);
}

#[test]
fn every_pair_meets_exactly_once() {
    for n in 2..=12 {
        let schedule = round_robin_schedule(n);
        assert_eq!(schedule.len(), n * (n - 1) / 2, "n={n}");
        let pairs: HashSet<(u32, u32)> = schedule.iter().map(|&(_, a, b)| (a, b)).collect();
        assert_eq!(pairs.len(), schedule.len(), "rematch for n={n}");
    }
}

#[test]
fn match_index_determines_round_for_even_counts() {
    for n in [4usize, 6, 8, 10] {
        let per_round = n / 2;
        for (i, &(round, _, _)) in round_robin_schedule(n).iter().enumerate() {
            let expected = (i + per_round) / per_round;
            assert_eq!(round as usize, expected, "n={n} match {}", i + 1);
        }
    }
}

#[test]
fn no_team_plays_twice_in_a_round() {
    for n in [5usize, 6, 9] {
        let schedule = round_robin_schedule(n);
        let rounds = schedule.iter().map(|&(r, _, _)| r).max().unwrap();
        for round in 1..=rounds {
            let mut seen = HashSet::new();
            for &(_, a, b) in schedule.iter().filter(|&&(r, _, _)| r == round) {
                assert!(seen.insert(a) && seen.insert(b), "n={n} round {round}");
            }
        }
    }
}

#[test]
fn odd_team_count_creates_no_bye_matches() {
    let event = round_robin_event(5);
    let bracket = event.bracket().unwrap();
    assert_eq!(bracket.matches.len(), 10);
    assert_eq!(bracket.rounds(BracketType::RoundRobin), 5);
    assert!(bracket.matches.iter().all(|m| !m.is_bye));
}

#[test]
fn standings_award_three_points_per_win() {
    let mut event = round_robin_event(4);
    play_all(&mut event);
    let table = round_robin_standings(event.bracket().unwrap());
    let points: Vec<u32> = table.iter().map(|r| r.points).collect();
    assert_eq!(points, vec![9, 6, 3, 0]);
    assert_eq!(table.iter().map(|r| r.points).sum::<u32>(), 6 * POINTS_PER_WIN);
    assert_eq!(table[0].seed, 1);
    assert_eq!(table[0].map_diff, 6);
    assert_eq!(table[0].win_percentage, 100.0);
    assert_eq!(table[3].win_percentage, 0.0);
}

#[test]
fn leader_is_champion_once_all_matches_are_done() {
    let mut event = round_robin_event(4);
    let first = event.bracket().unwrap().matches[0].id;
    update_match(&mut event, first, &ScoreUpdate::completed(2, 0), Utc::now()).unwrap();
    assert_eq!(event.winner_id, None);
    assert_eq!(event.status, EventStatus::Ongoing);

    let rest: Vec<_> = event
        .bracket()
        .unwrap()
        .matches
        .iter()
        .filter(|m| m.status == MatchStatus::Upcoming)
        .map(|m| m.id)
        .collect();
    for id in rest {
        update_match(&mut event, id, &ScoreUpdate::completed(2, 1), Utc::now()).unwrap();
    }
    let seed1 = event.bracket().unwrap().team_for_seed(1);
    assert_eq!(event.winner_id, seed1);
    assert_eq!(event.status, EventStatus::Completed);
}

#[test]
fn map_results_feed_round_difference() {
    let mut event = round_robin_event(2);
    let id = event.bracket().unwrap().matches[0].id;
    let update = ScoreUpdate {
        maps: vec![
            MapResult {
                map_name: "Mirage".to_string(),
                team1_score: 13,
                team2_score: 9,
            },
            MapResult {
                map_name: "Inferno".to_string(),
                team1_score: 13,
                team2_score: 11,
            },
        ],
        ..ScoreUpdate::completed(2, 0)
    };
    update_match(&mut event, id, &update, Utc::now()).unwrap();
    match standings(event.bracket().unwrap()) {
        Some(Standings::RoundRobin(table)) => {
            assert_eq!(table[0].round_wins, 26);
            assert_eq!(table[0].round_diff, 6);
            assert_eq!(table[1].round_diff, -6);
        }
        other => panic!("expected round robin standings, got {other:?}"),
    }
}

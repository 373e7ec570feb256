//! Integration tests for the event store: atomic updates under concurrency.

use rivals_bracket::logic::ScoreUpdate;
use rivals_bracket::{
    BracketError, BracketFormat, BracketLimits, BracketSettings, BracketStore, BracketType,
    EventStatus, MatchStatus, Team,
};
use std::sync::Arc;
use std::thread;

fn store_with_event(n: usize, format: BracketFormat) -> (BracketStore, uuid::Uuid) {
    let store = BracketStore::default();
    let teams = (0..n).map(|i| Team::new(format!("Team {}", i + 1))).collect();
    let event = store.create_event("Weekly", None, teams).unwrap();
    store
        .generate_bracket(
            event.id,
            BracketSettings {
                format,
                ..BracketSettings::default()
            },
        )
        .unwrap();
    (store, event.id)
}

#[test]
fn create_event_rejects_blank_name_and_duplicate_teams() {
    let store = BracketStore::default();
    assert!(matches!(
        store.create_event("  ", None, vec![]),
        Err(BracketError::Validation(_))
    ));
    let dupes = vec![Team::new("Alpha"), Team::new("alpha")];
    assert!(matches!(
        store.create_event("Cup", None, dupes),
        Err(BracketError::Validation(_))
    ));
}

#[test]
fn failed_update_leaves_event_untouched() {
    let (store, event_id) = store_with_event(4, BracketFormat::SingleElimination);
    let before = store.event(event_id).unwrap();
    let m = before.bracket().unwrap().matches[0].id;

    let err = store.update_match(m, &ScoreUpdate::completed(2, 2));
    assert!(matches!(err, Err(BracketError::Validation(_))));
    let after = store.event(event_id).unwrap();
    assert_eq!(before.bracket, after.bracket);
}

#[test]
fn concurrent_completions_of_one_match_succeed_once() {
    let (store, event_id) = store_with_event(8, BracketFormat::SingleElimination);
    let store = Arc::new(store);
    let match_id = store.event(event_id).unwrap().bracket().unwrap().matches[0].id;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let update = if i % 2 == 0 {
                    ScoreUpdate::completed(2, 0)
                } else {
                    ScoreUpdate::completed(0, 2)
                };
                store.update_match(match_id, &update)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, BracketError::Integrity(_))));

    // exactly one team went through to round two
    let event = store.event(event_id).unwrap();
    let bracket = event.bracket().unwrap();
    let next = &bracket.matches_of(BracketType::Main)[4];
    assert_eq!(next.round, 2);
    assert!(next.team1_id.is_some());
    assert_eq!(next.team2_id, None);
}

#[test]
fn grand_final_reset_follows_store_limits() {
    let store = BracketStore::new(BracketLimits {
        grand_final_reset: true,
        ..BracketLimits::default()
    });
    let teams = (0..2).map(|i| Team::new(format!("Team {}", i + 1))).collect();
    let event = store.create_event("Showmatch", Some(BracketFormat::DoubleElimination), teams).unwrap();
    let (_, event) = store
        .generate_bracket(
            event.id,
            BracketSettings {
                format: BracketFormat::DoubleElimination,
                ..BracketSettings::default()
            },
        )
        .unwrap();
    assert!(event.bracket().unwrap().settings.grand_final_reset);

    let winners_final = event.bracket().unwrap().matches_of(BracketType::Winners)[0].id;
    store.update_match(winners_final, &ScoreUpdate::completed(2, 0)).unwrap();
    let grand_final = store.event(event.id).unwrap().bracket().unwrap().matches_of(BracketType::GrandFinal)[0].id;
    let (outcome, event) = store.update_match(grand_final, &ScoreUpdate::completed(0, 3)).unwrap();
    assert_eq!(outcome.status, MatchStatus::Completed);
    assert_eq!(event.status, EventStatus::Ongoing);
    assert_eq!(event.bracket().unwrap().matches_of(BracketType::GrandFinal).len(), 2);
}

#[test]
fn team_limit_comes_from_store_limits() {
    let store = BracketStore::new(BracketLimits {
        max_teams: 4,
        ..BracketLimits::default()
    });
    let teams = (0..5).map(|i| Team::new(format!("Team {}", i + 1))).collect();
    let event = store.create_event("Crowded", None, teams).unwrap();
    let err = store.generate_bracket(event.id, BracketSettings::default());
    assert!(matches!(err, Err(BracketError::Validation(_))));
}

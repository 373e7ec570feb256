//! In-memory event store. Every mutation runs on a copy of the event and is committed only
//! when the whole operation succeeds.

use crate::logic::{self, MatchOutcome, ScoreUpdate};
use crate::models::{BracketError, BracketFormat, BracketSettings, Event, EventId, MatchId, Team};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Limits applied to every bracket generated through the store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BracketLimits {
    pub max_teams: usize,
    pub grand_final_reset: bool,
}

impl Default for BracketLimits {
    fn default() -> Self {
        Self {
            max_teams: logic::DEFAULT_MAX_TEAMS,
            grand_final_reset: false,
        }
    }
}

#[derive(Default)]
struct StoreState {
    events: HashMap<EventId, Event>,
    /// Which event owns each match.
    match_index: HashMap<MatchId, EventId>,
}

impl StoreState {
    fn reindex(&mut self, event: &Event) {
        self.match_index.retain(|_, owner| *owner != event.id);
        if let Some(bracket) = &event.bracket {
            for m in &bracket.matches {
                self.match_index.insert(m.id, event.id);
            }
        }
    }
}

#[derive(Default)]
pub struct BracketStore {
    state: RwLock<StoreState>,
    limits: BracketLimits,
}

impl BracketStore {
    pub fn new(limits: BracketLimits) -> Self {
        Self {
            state: RwLock::default(),
            limits,
        }
    }

    /// Register a new event with its teams and an optional default format.
    pub fn create_event(
        &self,
        name: &str,
        format: Option<BracketFormat>,
        teams: Vec<Team>,
    ) -> Result<Event, BracketError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BracketError::Validation("event name is required".to_string()));
        }
        let mut event = Event::with_teams(name, teams)?;
        event.format = format;
        let mut state = self.write()?;
        state.events.insert(event.id, event.clone());
        log::info!("Created event {} with {} teams", event.id, event.teams.len());
        Ok(event)
    }

    /// Snapshot of an event.
    pub fn event(&self, id: EventId) -> Result<Event, BracketError> {
        self.read()?
            .events
            .get(&id)
            .cloned()
            .ok_or_else(|| BracketError::NotFound("Event".to_string()))
    }

    /// Generate the bracket of an event; the grand-final reset flag comes from the store limits.
    /// Returns the number of matches created and the updated event.
    pub fn generate_bracket(
        &self,
        event_id: EventId,
        mut settings: BracketSettings,
    ) -> Result<(usize, Event), BracketError> {
        settings.grand_final_reset = self.limits.grand_final_reset;
        let max_teams = self.limits.max_teams;
        self.transaction(event_id, |event| {
            let created =
                logic::generate_bracket(event, settings, max_teams, &mut rand::thread_rng(), Utc::now())?;
            Ok((created, event.clone()))
        })
    }

    /// Delete every match of an event's bracket. Returns the number of matches removed.
    pub fn delete_bracket(&self, event_id: EventId) -> Result<usize, BracketError> {
        let removed = self.transaction(event_id, |event| Ok(logic::delete_bracket(event)))?;
        log::info!("Deleted bracket of event {event_id} ({removed} matches)");
        Ok(removed)
    }

    /// Update a match and run advancement, atomically. Returns the outcome and the updated event.
    pub fn update_match(
        &self,
        match_id: MatchId,
        update: &ScoreUpdate,
    ) -> Result<(MatchOutcome, Event), BracketError> {
        let event_id = self
            .read()?
            .match_index
            .get(&match_id)
            .copied()
            .ok_or_else(|| BracketError::NotFound("Match".to_string()))?;
        self.transaction(event_id, |event| {
            let outcome = logic::update_match(event, match_id, update, Utc::now())?;
            Ok((outcome, event.clone()))
        })
    }

    /// Run `op` on a copy of the event under the write lock; commit only on success.
    fn transaction<T>(
        &self,
        event_id: EventId,
        op: impl FnOnce(&mut Event) -> Result<T, BracketError>,
    ) -> Result<T, BracketError> {
        let mut state = self.write()?;
        let mut working = state
            .events
            .get(&event_id)
            .cloned()
            .ok_or_else(|| BracketError::NotFound("Event".to_string()))?;
        match op(&mut working) {
            Ok(value) => {
                state.reindex(&working);
                state.events.insert(event_id, working);
                Ok(value)
            }
            Err(e) => {
                log::warn!("Rolled back operation on event {event_id}: {e}");
                Err(e)
            }
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, BracketError> {
        self.state
            .read()
            .map_err(|_| BracketError::Internal("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, BracketError> {
        self.state
            .write()
            .map_err(|_| BracketError::Internal("lock error".to_string()))
    }
}

//! Team (participant) and seed assignment data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

/// Rating assumed for teams registered without one.
pub const DEFAULT_RATING: i32 = 1000;

/// A team registered for an event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: Option<String>,
    /// Strength indicator used by rating seeding.
    pub rating: Option<i32>,
    /// Seed requested by an organizer, used by manual seeding.
    pub seed: Option<u32>,
}

impl Team {
    /// Create a new team with the given name. Other fields start empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            short_name: None,
            rating: None,
            seed: None,
        }
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rating used for seeding; unknown ratings count as [`DEFAULT_RATING`].
    pub fn effective_rating(&self) -> i32 {
        self.rating.unwrap_or(DEFAULT_RATING)
    }
}

/// A 1-based seed given to a team before the bracket is built. Unique per bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SeedAssignment {
    pub seed: u32,
    pub team_id: TeamId,
}

// Like/dislike state machine - pure, no side effects
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::models::TuitStats;

/// One user's stance on one tuit. At most one Like record backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    None,
    Liked,
    Disliked,
}

impl Relationship {
    /// The `isDislike` flag of the backing record, or `None` when there is no record.
    pub fn is_dislike(&self) -> Option<bool> {
        match self {
            Self::None => None,
            Self::Liked => Some(false),
            Self::Disliked => Some(true),
        }
    }

    pub fn from_is_dislike(flag: Option<bool>) -> Self {
        match flag {
            None => Self::None,
            Some(false) => Self::Liked,
            Some(true) => Self::Disliked,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Liked => write!(f, "liked"),
            Self::Disliked => write!(f, "disliked"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Like,
    Dislike,
}

/// Change to the cached (likes, dislikes) pair that goes with a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CounterDelta {
    pub likes: i64,
    pub dislikes: i64,
}

impl CounterDelta {
    pub const fn new(likes: i64, dislikes: i64) -> Self {
        Self { likes, dislikes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Relationship,
    pub to: Relationship,
    pub delta: CounterDelta,
}

impl ToggleAction {
    /// Transition table. Toggling the current stance clears it, toggling the
    /// opposite stance flips the record.
    pub fn apply(self, from: Relationship) -> Transition {
        use Relationship as R;

        let (to, delta) = match (self, from) {
            (ToggleAction::Like, R::None) => (R::Liked, CounterDelta::new(1, 0)),
            (ToggleAction::Like, R::Liked) => (R::None, CounterDelta::new(-1, 0)),
            (ToggleAction::Like, R::Disliked) => (R::Liked, CounterDelta::new(2, -2)),
            (ToggleAction::Dislike, R::None) => (R::Disliked, CounterDelta::new(0, 1)),
            (ToggleAction::Dislike, R::Disliked) => (R::None, CounterDelta::new(0, -1)),
            (ToggleAction::Dislike, R::Liked) => (R::Disliked, CounterDelta::new(-2, 2)),
        };

        Transition { from, to, delta }
    }
}

/// How a toggle rewrites the tuit's cached like/dislike counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterPolicy {
    /// Counts read from the Like collection after the mutation.
    #[default]
    Recount,
    /// Counts read before the mutation plus the transition delta. Crossing
    /// between liked and disliked moves by two and can go negative.
    Delta,
}

/// Authoritative like/dislike counts aggregated from the Like collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    pub likes: i64,
    pub dislikes: i64,
}

impl Counts {
    pub fn plus(self, delta: CounterDelta) -> Self {
        Self {
            likes: self.likes + delta.likes,
            dislikes: self.dislikes + delta.dislikes,
        }
    }

    /// Replace the like/dislike counters, keeping the rest of the record.
    pub fn into_stats(self, mut stats: TuitStats) -> TuitStats {
        stats.likes = self.likes;
        stats.dislikes = self.dislikes;
        stats
    }
}

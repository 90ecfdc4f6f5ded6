//! Shared primitive IDs and quiz-related enums.

use serde::{Deserialize, Serialize};

/// ISO 3166-1 numeric country code, the join key between the geography
/// dataset and the catalog.
pub type CountryId = u32;
/// Monotonic tag identifying one target/selection cycle. Deferred actions
/// carry the generation they were scheduled under and are dropped when it
/// no longer matches.
pub type Generation = u64;

/// Transient outcome signal for the most recent guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Feedback {
    /// Awaiting a guess.
    #[default]
    Idle,
    /// Last guess matched the target.
    Correct,
    /// Last guess missed, attempts remain.
    Wrong,
    /// Attempts exhausted on the current target.
    Failed,
}

/// Outer game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Targets remain and attempts are available.
    #[default]
    InProgress,
    /// Every playable entity was solved. Success terminal state.
    Complete,
    /// Attempts were exhausted on some target. Terminal until reset.
    Over,
}

/// Presentation variant driving engine side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuizMode {
    /// Identify the target shown on the map by picking its flag.
    #[default]
    FlagSelect,
    /// Find the named target by clicking its region; the view is centered
    /// on each new target.
    MapClick,
    /// Reference browsing. No target, no scoring; submissions select and
    /// center a country.
    Explore,
}

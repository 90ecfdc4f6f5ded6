//! Session event stream payloads.

use crate::types::CountryId;

/// Events emitted from the single-writer session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    /// The dataset loaded and the playable set is ready.
    Loaded {
        /// Playable entity count.
        total: usize,
    },
    /// The dataset fetch failed; the session is terminally failed.
    LoadFailed {
        /// Human-readable failure message.
        message: String,
    },
    /// A new target was chosen.
    TargetChanged {
        /// Target numeric code.
        id: CountryId,
    },
    /// The view should center on these coordinates.
    CenteredOn {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },
    /// A guess matched the target.
    GuessCorrect {
        /// Solved numeric code.
        id: CountryId,
    },
    /// A guess missed with attempts remaining.
    GuessWrong {
        /// Guessed numeric code.
        id: CountryId,
        /// Attempts left on this target.
        attempts_left: u8,
    },
    /// The final attempt on a target was missed.
    TargetMissed {
        /// Target that was not identified.
        id: CountryId,
    },
    /// Wrong-guess feedback returned to idle.
    FeedbackCleared,
    /// Attempts were exhausted; the game is over.
    GameOver {
        /// Entities solved this play-through.
        solved: usize,
        /// Total playable entities.
        total: usize,
    },
    /// Every playable entity was solved.
    Completed {
        /// Total playable entities.
        total: usize,
    },
    /// A reset was applied and a fresh play-through started.
    ResetApplied,
}

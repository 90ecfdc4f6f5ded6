//! The quiz state machine.
//!
//! All transitions are synchronous. Operations that need a delayed
//! follow-up (showing feedback before moving on) return a [`Scheduled`]
//! action tagged with the current generation; the caller delivers it back
//! through [`QuizState::on_timer`] after the delay. The generation is
//! bumped whenever a new target cycle starts, so a timer scheduled
//! against an earlier cycle fires as a no-op instead of resurrecting
//! stale feedback. There is no timer cancellation.

use hashbrown::HashSet;
use rand::{seq::SliceRandom, Rng};

use crate::{
    playable::PlayableSet,
    types::{CountryId, Feedback, Generation, Phase, QuizMode},
};

/// Deferred transition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    /// After a correct guess: move to the next target.
    AdvanceTarget,
    /// After a wrong guess with attempts left: return feedback to idle.
    ClearFeedback,
    /// After the final wrong guess: end the game.
    EndGame,
}

/// A deferred action bound to the generation it was scheduled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    /// Generation at schedule time.
    pub generation: Generation,
    /// Action to apply when the delay elapses.
    pub action: DelayedAction,
}

/// Result of picking the next target.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// A new target was chosen. `center` is set when the view should move
    /// to the target's coordinates (map-click mode).
    Target {
        /// Numeric code of the new target.
        id: CountryId,
        /// Latitude/longitude to center on, when the mode asks for it.
        center: Option<[f64; 2]>,
    },
    /// Every playable entity is solved; phase is now [`Phase::Complete`].
    Complete,
    /// Nothing to select: the playable set is empty, or the mode has no
    /// targets.
    Idle,
}

/// Result of submitting a guess.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    /// The guess was ignored (no target, non-idle feedback, terminal
    /// phase, or already solved).
    Ignored,
    /// Explore mode: the entity became the current selection.
    Inspected {
        /// Selected numeric code.
        id: CountryId,
        /// Coordinates to center on, when known.
        center: Option<[f64; 2]>,
    },
    /// The guess matched the target.
    Correct {
        /// Solved numeric code.
        id: CountryId,
        /// Deferred advance to the next target.
        schedule: Scheduled,
    },
    /// The guess missed and attempts remain.
    Wrong {
        /// Guessed numeric code.
        id: CountryId,
        /// Attempts left on this target.
        attempts_left: u8,
        /// Deferred feedback clear.
        schedule: Scheduled,
    },
    /// The guess missed and exhausted the attempts.
    Failed {
        /// Guessed numeric code.
        id: CountryId,
        /// Target that was missed, kept populated so the view can reveal
        /// it.
        target: CountryId,
        /// Deferred game-over transition.
        schedule: Scheduled,
    },
}

/// Result of a timer delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerOutcome {
    /// The schedule no longer applies to the current state; nothing
    /// changed.
    Stale,
    /// Advanced to the next target (or completion).
    Advanced(SelectOutcome),
    /// Feedback returned to idle; the same target accepts guesses again.
    FeedbackCleared,
    /// The game is over.
    GameEnded {
        /// Entities solved this play-through.
        solved: usize,
        /// Total playable entities.
        total: usize,
    },
}

/// Per-session quiz state. Owned by one screen instance; discarded and
/// rebuilt on mode switch, never shared.
#[derive(Debug)]
pub struct QuizState {
    playable: PlayableSet,
    mode: QuizMode,
    max_attempts: u8,
    guessed: HashSet<CountryId>,
    target: Option<CountryId>,
    selected: Option<CountryId>,
    attempts: u8,
    feedback: Feedback,
    phase: Phase,
    generation: Generation,
}

impl QuizState {
    /// Creates a fresh state over a playable set. No target is chosen
    /// until [`QuizState::initialize`].
    pub fn new(playable: PlayableSet, mode: QuizMode, max_attempts: u8) -> Self {
        Self {
            playable,
            mode,
            max_attempts: max_attempts.max(1),
            guessed: HashSet::new(),
            target: None,
            selected: None,
            attempts: 0,
            feedback: Feedback::Idle,
            phase: Phase::InProgress,
            generation: 0,
        }
    }

    /// Picks the initial target. With an empty playable set the state
    /// stays in progress with no target.
    pub fn initialize(&mut self, rng: &mut impl Rng) -> SelectOutcome {
        self.select_next(rng)
    }

    /// Evaluates one guess against the current target.
    pub fn submit_guess(&mut self, id: CountryId) -> GuessOutcome {
        if self.mode == QuizMode::Explore {
            return self.inspect(id);
        }

        let Some(target) = self.target else {
            return GuessOutcome::Ignored;
        };
        if self.feedback != Feedback::Idle
            || self.phase != Phase::InProgress
            || self.guessed.contains(&id)
        {
            return GuessOutcome::Ignored;
        }

        self.selected = Some(id);
        if id == target {
            self.feedback = Feedback::Correct;
            self.guessed.insert(id);
            return GuessOutcome::Correct {
                id,
                schedule: self.schedule(DelayedAction::AdvanceTarget),
            };
        }

        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            self.feedback = Feedback::Failed;
            return GuessOutcome::Failed {
                id,
                target,
                schedule: self.schedule(DelayedAction::EndGame),
            };
        }

        self.feedback = Feedback::Wrong;
        GuessOutcome::Wrong {
            id,
            attempts_left: self.max_attempts - self.attempts,
            schedule: self.schedule(DelayedAction::ClearFeedback),
        }
    }

    /// Delivers an elapsed deferred action. A schedule whose generation
    /// does not match the current one, or whose action no longer fits the
    /// current feedback, is dropped without touching state.
    pub fn on_timer(&mut self, scheduled: Scheduled, rng: &mut impl Rng) -> TimerOutcome {
        if scheduled.generation != self.generation {
            return TimerOutcome::Stale;
        }
        match scheduled.action {
            DelayedAction::AdvanceTarget => {
                if self.feedback != Feedback::Correct {
                    return TimerOutcome::Stale;
                }
                TimerOutcome::Advanced(self.select_next(rng))
            }
            DelayedAction::ClearFeedback => {
                if self.feedback != Feedback::Wrong {
                    return TimerOutcome::Stale;
                }
                self.feedback = Feedback::Idle;
                self.selected = None;
                TimerOutcome::FeedbackCleared
            }
            DelayedAction::EndGame => {
                if self.feedback != Feedback::Failed || self.phase != Phase::InProgress {
                    return TimerOutcome::Stale;
                }
                // Target stays populated so the view can reveal it.
                self.phase = Phase::Over;
                TimerOutcome::GameEnded {
                    solved: self.guessed.len(),
                    total: self.playable.len(),
                }
            }
        }
    }

    /// Clears all progress and starts a fresh play-through.
    pub fn reset(&mut self, rng: &mut impl Rng) -> SelectOutcome {
        self.guessed.clear();
        self.phase = Phase::InProgress;
        self.select_next(rng)
    }

    /// Current target, when one is set.
    pub fn target(&self) -> Option<CountryId> {
        self.target
    }

    /// Current transient selection highlight.
    pub fn selected(&self) -> Option<CountryId> {
        self.selected
    }

    /// Solved numeric codes.
    pub fn guessed(&self) -> &HashSet<CountryId> {
        &self.guessed
    }

    /// Wrong guesses against the current target.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Configured attempt limit.
    pub fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    /// Current feedback signal.
    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// Current game phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Presentation mode this state serves.
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    /// Current generation tag.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Entities solved so far.
    pub fn solved(&self) -> usize {
        self.guessed.len()
    }

    /// Total playable entities.
    pub fn total(&self) -> usize {
        self.playable.len()
    }

    /// The playable set backing this session.
    pub fn playable(&self) -> &PlayableSet {
        &self.playable
    }

    fn schedule(&self, action: DelayedAction) -> Scheduled {
        Scheduled {
            generation: self.generation,
            action,
        }
    }

    fn inspect(&mut self, id: CountryId) -> GuessOutcome {
        let Some(entity) = self.playable.get(id) else {
            return GuessOutcome::Ignored;
        };
        self.selected = Some(id);
        GuessOutcome::Inspected {
            id,
            center: entity.record.latlng,
        }
    }

    /// Starts a new target cycle: bumps the generation, resets per-target
    /// state, and draws uniformly from the unsolved remainder.
    fn select_next(&mut self, rng: &mut impl Rng) -> SelectOutcome {
        self.generation += 1;
        self.selected = None;
        self.feedback = Feedback::Idle;
        self.attempts = 0;

        if self.mode == QuizMode::Explore {
            self.target = None;
            return SelectOutcome::Idle;
        }

        let remaining: Vec<CountryId> = self
            .playable
            .ids()
            .filter(|id| !self.guessed.contains(id))
            .collect();

        match remaining.choose(rng) {
            Some(&id) => {
                self.target = Some(id);
                let center = if self.mode == QuizMode::MapClick {
                    self.playable.get(id).and_then(|e| e.record.latlng)
                } else {
                    None
                };
                SelectOutcome::Target { id, center }
            }
            None => {
                self.target = None;
                if self.playable.is_empty() {
                    SelectOutcome::Idle
                } else {
                    self.phase = Phase::Complete;
                    SelectOutcome::Complete
                }
            }
        }
    }
}

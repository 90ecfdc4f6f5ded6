//! Session handle and the single-writer command loop.
//!
//! All quiz state lives inside one spawned task; handles submit commands
//! over an mpsc channel and read answers back on oneshot channels. Timers
//! and the dataset loader feed a separate internal channel, so the loop
//! can tell when the last public handle is gone and stop.

use rand::{rngs::SmallRng, SeedableRng};
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::Duration,
};

use crate::{
    catalog::Catalog,
    fetch::load_world,
    playable::{PlayableEntity, PlayableSet},
    quiz::{
        state::{DelayedAction, GuessOutcome, QuizState, Scheduled, SelectOutcome, TimerOutcome},
        viewport::Viewport,
    },
    types::{CountryId, Feedback, Phase, QuizMode},
    world::{geometry::ConcatUnion, regions::RegionCollection},
};

use super::events::QuizEvent;

/// Session handle failures.
#[derive(Debug)]
pub enum SessionError {
    /// The session loop is gone.
    ChannelClosed,
}

/// Per-session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Presentation variant this session serves.
    pub mode: QuizMode,
    /// Wrong guesses allowed per target before the game ends.
    pub max_attempts: u8,
    /// Delay before moving on after a correct guess, so the view can show
    /// positive feedback first.
    pub advance_delay_ms: u64,
    /// Delay before wrong-guess feedback returns to idle.
    pub retry_delay_ms: u64,
    /// Delay between the final miss and game over, during which the view
    /// reveals the answer.
    pub reveal_delay_ms: u64,
    /// Minimum zoom applied when centering on a target. Never lowers an
    /// already-closer view.
    pub min_focus_zoom: f64,
    /// Broadcast buffer capacity for [`QuizEvent`] subscribers.
    pub events_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: QuizMode::FlagSelect,
            max_attempts: 3,
            advance_delay_ms: 800,
            retry_delay_ms: 650,
            reveal_delay_ms: 1500,
            min_focus_zoom: 2.0,
            events_capacity: 256,
        }
    }
}

/// Synchronous reply to a submitted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessFeedback {
    /// The guess did not apply to the current state.
    Ignored,
    /// Correct; the next target follows after the advance delay.
    Correct,
    /// Wrong; the same target accepts guesses again after the retry
    /// delay.
    Wrong {
        /// Attempts left on this target.
        attempts_left: u8,
    },
    /// Wrong and out of attempts; game over follows the reveal delay.
    Failed,
    /// Explore mode: the entity is now selected.
    Inspected,
}

/// Load status of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// The dataset fetch is still outstanding.
    Loading,
    /// The playable set is built and the quiz is live.
    Ready,
    /// The dataset fetch failed. Terminal; recover by spawning a new
    /// session.
    Failed {
        /// Human-readable failure message.
        message: String,
    },
}

/// Read-only view of session state for the presentation layer.
#[derive(Debug, Clone)]
pub struct QuizSnapshot {
    /// Load status.
    pub status: SessionStatus,
    /// Presentation variant.
    pub mode: QuizMode,
    /// Game phase.
    pub phase: Phase,
    /// Transient feedback signal.
    pub feedback: Feedback,
    /// Wrong guesses against the current target.
    pub attempts: u8,
    /// Configured attempt limit.
    pub max_attempts: u8,
    /// Current target entity, when one is set.
    pub target: Option<PlayableEntity>,
    /// Transient selection highlight.
    pub selected: Option<CountryId>,
    /// Solved numeric codes.
    pub guessed: Vec<CountryId>,
    /// Solved count.
    pub solved: usize,
    /// Total playable entities.
    pub total: usize,
    /// Entities matching the current query, in display order.
    pub entities: Vec<PlayableEntity>,
    /// Current free-text filter.
    pub query: String,
    /// Current map viewport.
    pub viewport: Viewport,
}

/// Cloneable handle to a running session loop.
pub struct QuizHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<QuizEvent>,
}

impl Clone for QuizHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Guess {
        id: CountryId,
        resp: oneshot::Sender<GuessFeedback>,
    },
    Reset {
        resp: oneshot::Sender<()>,
    },
    SetQuery {
        text: String,
        resp: oneshot::Sender<()>,
    },
    ZoomIn {
        resp: oneshot::Sender<Viewport>,
    },
    ZoomOut {
        resp: oneshot::Sender<Viewport>,
    },
    ResetView {
        resp: oneshot::Sender<Viewport>,
    },
    Snapshot {
        resp: oneshot::Sender<QuizSnapshot>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

// Messages originating inside the session (timers, the dataset loader).
// Kept off the public command channel so its closure still marks the last
// handle going away.
enum Internal {
    TimerFired(Scheduled),
    WorldReady(Result<PlayableSet, String>),
}

enum Screen {
    Loading,
    Ready(QuizState),
    Failed(String),
}

struct Session {
    screen: Screen,
    config: SessionConfig,
    query: String,
    viewport: Viewport,
    rng: SmallRng,
    events_tx: broadcast::Sender<QuizEvent>,
    internal_tx: mpsc::Sender<Internal>,
}

/// Spawns a session over an already-built playable set.
pub fn spawn_session(playable: PlayableSet, config: SessionConfig) -> QuizHandle {
    let (handle, mut session, cmd_rx, internal_rx) = new_session(config);

    let mut state = QuizState::new(
        playable,
        session.config.mode,
        session.config.max_attempts,
    );
    let outcome = state.initialize(&mut session.rng);
    session.screen = Screen::Ready(state);
    session.apply_selection(outcome);

    run_loop(session, cmd_rx, internal_rx);
    handle
}

/// Spawns a session that first fetches the world dataset from `url`.
///
/// The fetch result is fed back over the internal channel; if every
/// handle is dropped before the response arrives, the loop is gone and
/// the result is discarded without mutating anything.
pub fn spawn_session_loading(
    catalog: Catalog,
    url: impl Into<String>,
    config: SessionConfig,
) -> QuizHandle {
    let (handle, session, cmd_rx, internal_rx) = new_session(config);

    let url = url.into();
    let loader_tx = session.internal_tx.clone();
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let result = match load_world(&client, &url).await {
            Ok(topo) => {
                let regions = RegionCollection::from_topology(&topo, &ConcatUnion);
                Ok(PlayableSet::build(&regions, &catalog))
            }
            Err(err) => Err(err.message()),
        };
        let _ = loader_tx.send(Internal::WorldReady(result)).await;
    });

    run_loop(session, cmd_rx, internal_rx);
    handle
}

fn new_session(
    config: SessionConfig,
) -> (
    QuizHandle,
    Session,
    mpsc::Receiver<Command>,
    mpsc::Receiver<Internal>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(256);
    let (internal_tx, internal_rx) = mpsc::channel::<Internal>(256);
    let (events_tx, _) = broadcast::channel::<QuizEvent>(config.events_capacity.max(1));

    let session = Session {
        screen: Screen::Loading,
        config,
        query: String::new(),
        viewport: Viewport::default(),
        rng: SmallRng::from_entropy(),
        events_tx: events_tx.clone(),
        internal_tx,
    };

    let handle = QuizHandle { cmd_tx, events_tx };
    (handle, session, cmd_rx, internal_rx)
}

fn run_loop(
    mut session: Session,
    mut cmd_rx: mpsc::Receiver<Command>,
    mut internal_rx: mpsc::Receiver<Internal>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if session.handle_command(cmd) {
                            break;
                        }
                    }
                    // Every handle dropped; nothing can observe this
                    // session any more.
                    None => break,
                },
                Some(msg) = internal_rx.recv() => session.handle_internal(msg),
            }
        }
    });
}

impl QuizHandle {
    /// Subscribes to the session event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<QuizEvent> {
        self.events_tx.subscribe()
    }

    /// Submits a guess (flag pick or region click) against the current
    /// target.
    pub async fn guess(&self, id: CountryId) -> Result<GuessFeedback, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Guess { id, resp: tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Clears progress and starts a fresh play-through.
    pub async fn reset(&self) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Reset { resp: tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Sets the free-text filter over display names.
    pub async fn set_query(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetQuery {
                text: text.into(),
                resp: tx,
            })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// One zoom step in. Returns the resulting viewport.
    pub async fn zoom_in(&self) -> Result<Viewport, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ZoomIn { resp: tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// One zoom step out. Returns the resulting viewport.
    pub async fn zoom_out(&self) -> Result<Viewport, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ZoomOut { resp: tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Returns the viewport to the whole-world view.
    pub async fn reset_view(&self) -> Result<Viewport, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::ResetView { resp: tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Reads a consistent snapshot of session state.
    pub async fn snapshot(&self) -> Result<QuizSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Snapshot { resp: tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Stops the session loop.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::ChannelClosed)
    }
}

impl Session {
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Guess { id, resp } => {
                let feedback = self.apply_guess(id);
                let _ = resp.send(feedback);
            }
            Command::Reset { resp } => {
                self.query.clear();
                if let Screen::Ready(state) = &mut self.screen {
                    let outcome = state.reset(&mut self.rng);
                    let _ = self.events_tx.send(QuizEvent::ResetApplied);
                    self.apply_selection(outcome);
                }
                let _ = resp.send(());
            }
            Command::SetQuery { text, resp } => {
                self.query = text;
                let _ = resp.send(());
            }
            Command::ZoomIn { resp } => {
                self.viewport.zoom_in();
                let _ = resp.send(self.viewport);
            }
            Command::ZoomOut { resp } => {
                self.viewport.zoom_out();
                let _ = resp.send(self.viewport);
            }
            Command::ResetView { resp } => {
                self.viewport.reset();
                let _ = resp.send(self.viewport);
            }
            Command::Snapshot { resp } => {
                let _ = resp.send(self.snapshot());
            }
            Command::Shutdown { resp } => {
                let _ = resp.send(());
                return true;
            }
        }
        false
    }

    fn handle_internal(&mut self, msg: Internal) {
        match msg {
            Internal::TimerFired(scheduled) => self.apply_timer(scheduled),
            Internal::WorldReady(result) => self.apply_world_ready(result),
        }
    }

    fn apply_guess(&mut self, id: CountryId) -> GuessFeedback {
        let Screen::Ready(state) = &mut self.screen else {
            return GuessFeedback::Ignored;
        };

        match state.submit_guess(id) {
            GuessOutcome::Ignored => GuessFeedback::Ignored,
            GuessOutcome::Inspected { center, .. } => {
                if let Some(latlng) = center {
                    self.focus(latlng);
                }
                GuessFeedback::Inspected
            }
            GuessOutcome::Correct { id, schedule } => {
                let _ = self.events_tx.send(QuizEvent::GuessCorrect { id });
                self.spawn_timer(schedule);
                GuessFeedback::Correct
            }
            GuessOutcome::Wrong {
                id,
                attempts_left,
                schedule,
            } => {
                let _ = self
                    .events_tx
                    .send(QuizEvent::GuessWrong { id, attempts_left });
                self.spawn_timer(schedule);
                GuessFeedback::Wrong { attempts_left }
            }
            GuessOutcome::Failed {
                target, schedule, ..
            } => {
                let _ = self.events_tx.send(QuizEvent::TargetMissed { id: target });
                self.spawn_timer(schedule);
                GuessFeedback::Failed
            }
        }
    }

    fn apply_timer(&mut self, scheduled: Scheduled) {
        let Screen::Ready(state) = &mut self.screen else {
            return;
        };

        match state.on_timer(scheduled, &mut self.rng) {
            TimerOutcome::Stale => {
                tracing::debug!(?scheduled, "dropped stale timer");
            }
            TimerOutcome::Advanced(outcome) => self.apply_selection(outcome),
            TimerOutcome::FeedbackCleared => {
                let _ = self.events_tx.send(QuizEvent::FeedbackCleared);
            }
            TimerOutcome::GameEnded { solved, total } => {
                let _ = self.events_tx.send(QuizEvent::GameOver { solved, total });
            }
        }
    }

    fn apply_world_ready(&mut self, result: Result<PlayableSet, String>) {
        if !matches!(self.screen, Screen::Loading) {
            return;
        }
        match result {
            Ok(playable) => {
                let total = playable.len();
                let mut state =
                    QuizState::new(playable, self.config.mode, self.config.max_attempts);
                let outcome = state.initialize(&mut self.rng);
                self.screen = Screen::Ready(state);
                let _ = self.events_tx.send(QuizEvent::Loaded { total });
                self.apply_selection(outcome);
            }
            Err(message) => {
                tracing::warn!(%message, "session failed to load dataset");
                let _ = self.events_tx.send(QuizEvent::LoadFailed {
                    message: message.clone(),
                });
                self.screen = Screen::Failed(message);
            }
        }
    }

    fn apply_selection(&mut self, outcome: SelectOutcome) {
        match outcome {
            SelectOutcome::Target { id, center } => {
                let _ = self.events_tx.send(QuizEvent::TargetChanged { id });
                if let Some(latlng) = center {
                    self.focus(latlng);
                }
            }
            SelectOutcome::Complete => {
                let total = match &self.screen {
                    Screen::Ready(state) => state.total(),
                    _ => 0,
                };
                let _ = self.events_tx.send(QuizEvent::Completed { total });
            }
            SelectOutcome::Idle => {}
        }
    }

    fn focus(&mut self, latlng: [f64; 2]) {
        self.viewport.focus(latlng, self.config.min_focus_zoom);
        let _ = self.events_tx.send(QuizEvent::CenteredOn {
            lat: latlng[0],
            lng: latlng[1],
        });
    }

    fn spawn_timer(&self, scheduled: Scheduled) {
        let delay_ms = match scheduled.action {
            DelayedAction::AdvanceTarget => self.config.advance_delay_ms,
            DelayedAction::ClearFeedback => self.config.retry_delay_ms,
            DelayedAction::EndGame => self.config.reveal_delay_ms,
        };
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            let _ = tx.send(Internal::TimerFired(scheduled)).await;
        });
    }

    fn snapshot(&self) -> QuizSnapshot {
        match &self.screen {
            Screen::Ready(state) => QuizSnapshot {
                status: SessionStatus::Ready,
                mode: state.mode(),
                phase: state.phase(),
                feedback: state.feedback(),
                attempts: state.attempts(),
                max_attempts: state.max_attempts(),
                target: state
                    .target()
                    .and_then(|id| state.playable().get(id).cloned()),
                selected: state.selected(),
                guessed: state.guessed().iter().copied().collect(),
                solved: state.solved(),
                total: state.total(),
                entities: state
                    .playable()
                    .filter(&self.query)
                    .into_iter()
                    .cloned()
                    .collect(),
                query: self.query.clone(),
                viewport: self.viewport,
            },
            Screen::Loading => self.empty_snapshot(SessionStatus::Loading),
            Screen::Failed(message) => self.empty_snapshot(SessionStatus::Failed {
                message: message.clone(),
            }),
        }
    }

    fn empty_snapshot(&self, status: SessionStatus) -> QuizSnapshot {
        QuizSnapshot {
            status,
            mode: self.config.mode,
            phase: Phase::InProgress,
            feedback: Feedback::Idle,
            attempts: 0,
            max_attempts: self.config.max_attempts,
            target: None,
            selected: None,
            guessed: Vec::new(),
            solved: 0,
            total: 0,
            entities: Vec::new(),
            query: self.query.clone(),
            viewport: self.viewport,
        }
    }
}

//! Session host: the contract between the story layer and the minigames.
//!
//! The story layer starts a session from a validated request, feeds it input
//! and pumps its clock. The session reports a single [`MinigameResult`] through
//! its completion callback and is inert afterwards. Closing a running session
//! stops its ticks and suppresses the callback.

use minigame_rules::{
    EntityId, MinigameKind, MinigameRequest, MinigameResult, MinigameTuning, RulesError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::duel::DuelEngine;
use crate::events::MinigameInput;
use crate::infiltration::InfiltrationEngine;
use crate::repair::RepairEngine;
use crate::scheduler::{Clock, InputQueue, SystemClock, Tick, TickScheduler, VirtualClock};

/// Behaviour shared by every minigame engine.
///
/// Engines own all their state. The host applies queued input at the start of
/// a tick, then runs the tick, then reads [`Minigame::outcome`].
pub trait Minigame {
    type Input;

    fn kind(&self) -> MinigameKind;

    /// Apply one input. Ignored once the game is over.
    fn apply_input(&mut self, input: Self::Input);

    /// Advance the simulation by one frame of `dt` seconds.
    fn on_frame(&mut self, dt: f64);

    /// One countdown interval elapsed.
    fn on_countdown(&mut self);

    /// The terminal result, once reached. Never changes afterwards.
    fn outcome(&self) -> Option<MinigameResult>;
}

/// The engine behind a session.
#[derive(Debug, Clone)]
pub enum ActiveMinigame {
    Duel(DuelEngine),
    Repair(RepairEngine),
    Infiltration(InfiltrationEngine),
}

impl ActiveMinigame {
    /// Build the engine for a request, drawing all randomness from `rng`.
    pub fn launch(request: &MinigameRequest, tuning: &MinigameTuning, mut rng: ChaCha8Rng) -> Self {
        match request.kind {
            MinigameKind::GestureDuel | MinigameKind::FinalGestureDuel => ActiveMinigame::Duel(
                DuelEngine::new(request.kind, request.difficulty, tuning, rng),
            ),
            MinigameKind::RepairPuzzle => ActiveMinigame::Repair(RepairEngine::new(
                request.difficulty,
                request.time_limit,
                tuning,
                &mut rng,
            )),
            MinigameKind::StealthInfiltration => {
                ActiveMinigame::Infiltration(InfiltrationEngine::new(
                    request.difficulty,
                    request.time_limit,
                    tuning,
                    &mut rng,
                ))
            }
        }
    }

    pub fn as_duel(&self) -> Option<&DuelEngine> {
        match self {
            ActiveMinigame::Duel(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn as_repair(&self) -> Option<&RepairEngine> {
        match self {
            ActiveMinigame::Repair(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn as_infiltration(&self) -> Option<&InfiltrationEngine> {
        match self {
            ActiveMinigame::Infiltration(engine) => Some(engine),
            _ => None,
        }
    }
}

impl Minigame for ActiveMinigame {
    type Input = MinigameInput;

    fn kind(&self) -> MinigameKind {
        match self {
            ActiveMinigame::Duel(engine) => engine.kind(),
            ActiveMinigame::Repair(engine) => engine.kind(),
            ActiveMinigame::Infiltration(engine) => engine.kind(),
        }
    }

    fn apply_input(&mut self, input: MinigameInput) {
        match (self, input) {
            (ActiveMinigame::Duel(engine), MinigameInput::Duel(input)) => engine.apply_input(input),
            (ActiveMinigame::Repair(engine), MinigameInput::Repair(input)) => {
                engine.apply_input(input)
            }
            (ActiveMinigame::Infiltration(engine), MinigameInput::Infiltration(input)) => {
                engine.apply_input(input)
            }
            (game, input) => {
                warn!(kind = %game.kind(), ?input, "input for another minigame ignored");
            }
        }
    }

    fn on_frame(&mut self, dt: f64) {
        match self {
            ActiveMinigame::Duel(engine) => engine.on_frame(dt),
            ActiveMinigame::Repair(engine) => engine.on_frame(dt),
            ActiveMinigame::Infiltration(engine) => engine.on_frame(dt),
        }
    }

    fn on_countdown(&mut self) {
        match self {
            ActiveMinigame::Duel(engine) => engine.on_countdown(),
            ActiveMinigame::Repair(engine) => engine.on_countdown(),
            ActiveMinigame::Infiltration(engine) => engine.on_countdown(),
        }
    }

    fn outcome(&self) -> Option<MinigameResult> {
        match self {
            ActiveMinigame::Duel(engine) => engine.outcome(),
            ActiveMinigame::Repair(engine) => engine.outcome(),
            ActiveMinigame::Infiltration(engine) => engine.outcome(),
        }
    }
}

/// Called exactly once with the session's terminal result.
pub type CompletionCallback = Box<dyn FnOnce(MinigameResult)>;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// Reported its result; inert.
    Finished(MinigameResult),
    /// Closed before finishing; nothing was reported.
    Closed,
}

/// Everything a session needs besides the request.
pub struct SessionOptions {
    pub seed: u64,
    pub tuning: MinigameTuning,
    pub clock: Box<dyn Clock>,
}

impl SessionOptions {
    /// Default tuning on the wall clock.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tuning: MinigameTuning::default(),
            clock: Box::new(SystemClock::new()),
        }
    }

    pub fn with_tuning(mut self, tuning: MinigameTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
}

/// A running minigame session owned by the story layer.
pub struct SessionHandle {
    id: EntityId,
    request: MinigameRequest,
    game: ActiveMinigame,
    scheduler: TickScheduler,
    clock: Box<dyn Clock>,
    inputs: InputQueue<MinigameInput>,
    on_complete: Option<CompletionCallback>,
    status: SessionStatus,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("request", &self.request)
            .field("status", &self.status)
            .field("pending_inputs", &self.inputs.len())
            .finish_non_exhaustive()
    }
}

/// Validate raw parameters from a scene choice and start a session.
///
/// Invalid difficulty, time limit, engine type or tuning is rejected before
/// anything is created.
pub fn start_session(
    difficulty: i64,
    time_limit: i64,
    engine_type: &str,
    options: SessionOptions,
    on_complete: impl FnOnce(MinigameResult) + 'static,
) -> Result<SessionHandle, RulesError> {
    let kind = engine_type.parse()?;
    let request = MinigameRequest::new(difficulty, time_limit, kind)?;
    SessionHandle::start(request, options, on_complete)
}

impl SessionHandle {
    /// Start a session for a validated request.
    pub fn start(
        request: MinigameRequest,
        options: SessionOptions,
        on_complete: impl FnOnce(MinigameResult) + 'static,
    ) -> Result<Self, RulesError> {
        options.tuning.validate()?;
        options.tuning.admit(&request)?;
        let scheduler = TickScheduler::new(options.tuning.scheduler)?;
        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        let id = EntityId::from_rng(&mut rng);
        let game = ActiveMinigame::launch(&request, &options.tuning, rng);

        info!(
            session_id = %id,
            kind = %request.kind,
            difficulty = request.difficulty.level(),
            time_limit = request.time_limit.seconds(),
            seed = options.seed,
            "minigame session started"
        );

        let mut session = Self {
            id,
            request,
            game,
            scheduler,
            clock: options.clock,
            inputs: InputQueue::new(),
            on_complete: Some(Box::new(on_complete)),
            status: SessionStatus::Running,
        };
        session.check_outcome();
        Ok(session)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn request(&self) -> &MinigameRequest {
        &self.request
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The reported result, if the session finished.
    pub fn result(&self) -> Option<MinigameResult> {
        match self.status {
            SessionStatus::Finished(result) => Some(result),
            _ => None,
        }
    }

    /// Whether the session no longer reacts to input or time.
    pub fn is_inert(&self) -> bool {
        self.status != SessionStatus::Running
    }

    /// Read-only view of the engine, for presentation.
    pub fn game(&self) -> &ActiveMinigame {
        &self.game
    }

    /// Queue an input for the next tick.
    pub fn push_input(&mut self, input: impl Into<MinigameInput>) {
        let input = input.into();
        if self.is_inert() {
            debug!(session_id = %self.id, ?input, "input for inert session dropped");
            return;
        }
        self.inputs.push(input);
    }

    /// Run every tick that is due by the clock's current time.
    pub fn pump(&mut self) -> SessionStatus {
        let now = self.clock.elapsed();
        while self.status == SessionStatus::Running {
            let Some(tick) = self.scheduler.next_due(now) else {
                break;
            };
            self.run_tick(tick);
        }
        self.status
    }

    /// Advance `clock` in `step` increments until the session stops running
    /// or `max_steps` is reached. `clock` must be the session's clock.
    pub fn run_until_terminal(
        &mut self,
        clock: &VirtualClock,
        step: Duration,
        max_steps: usize,
    ) -> SessionStatus {
        for _ in 0..max_steps {
            if self.is_inert() {
                break;
            }
            clock.advance(step);
            self.pump();
        }
        self.status
    }

    /// Stop the session without reporting.
    ///
    /// Ticks stop and pending input is dropped before anything else can
    /// mutate state. Closing a finished or closed session does nothing.
    pub fn close(&mut self) {
        if self.status != SessionStatus::Running {
            debug!(session_id = %self.id, status = ?self.status, "close on inert session ignored");
            return;
        }

        self.scheduler.stop();
        self.inputs.clear();
        self.on_complete = None;
        self.status = SessionStatus::Closed;
        info!(session_id = %self.id, kind = %self.request.kind, "minigame session closed");
    }

    fn run_tick(&mut self, tick: Tick) {
        for input in self.inputs.drain() {
            self.game.apply_input(input);
        }

        match tick {
            Tick::Frame { dt } => self.game.on_frame(dt),
            Tick::Countdown => self.game.on_countdown(),
        }

        self.check_outcome();
    }

    fn check_outcome(&mut self) {
        let Some(result) = self.game.outcome() else {
            return;
        };

        self.scheduler.stop();
        self.inputs.clear();
        self.status = SessionStatus::Finished(result);
        info!(
            session_id = %self.id,
            kind = %self.request.kind,
            success = result.success,
            "minigame session finished"
        );
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(result);
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.status == SessionStatus::Running {
            self.close();
        }
    }
}

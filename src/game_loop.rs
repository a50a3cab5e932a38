//! Fixed-cadence game loop
//!
//! Each play-through runs on its own thread that owns the `GameSession`:
//! snapshot input, tick, present, then park for the rest of the frame period.
//! `Game` starts, stops and restarts that thread. A restart always stops and
//! joins the previous loop before the new session exists.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;

use crate::input::SharedInput;
use crate::settings::{ConfigError, GameConfig};
use crate::sim::{Entity, GameEvent, GameSession, Player, tick};

/// Shortest sleep between frames, even when the frame overran its period
const MIN_SLEEP: Duration = Duration::from_millis(1);

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("failed to spawn game loop thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("previous game loop panicked and could not be joined")]
    Join,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Receives every frame plus lifecycle notifications.
///
/// Called on the loop thread, synchronously after each update, so the frame
/// it sees is never mutated underneath it.
pub trait Presenter: Send {
    fn present(&mut self, frame: &Frame<'_>);

    fn on_game_over(&mut self, _score: i64) {}

    fn on_new_game_started(&mut self) {}
}

/// Read-only view of the session handed to the presenter
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub session: &'a GameSession,
    pub fps: f32,
}

impl<'a> Frame<'a> {
    pub fn player(&self) -> &'a Player {
        &self.session.player
    }

    pub fn obstacles(&self) -> &'a VecDeque<Entity> {
        &self.session.obstacles
    }

    pub fn coins(&self) -> &'a VecDeque<Entity> {
        &self.session.coins
    }

    pub fn score(&self) -> i64 {
        self.session.score
    }

    pub fn hit(&self) -> bool {
        self.session.player.hit
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Events from this frame's tick
    pub fn events(&self) -> &'a [GameEvent] {
        &self.session.events
    }
}

/// Frames per second over windows of at least one second
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count one frame finished at `now`; returns the current estimate
    pub fn frame(&mut self, now: Instant) -> f32 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Yields the presenter back, or `None` if it never reached the thread
type LoopHandle = JoinHandle<Option<Box<dyn Presenter>>>;

struct RunningLoop {
    stop: Arc<AtomicBool>,
    handle: LoopHandle,
}

/// Restart controller: owns the presenter between play-throughs and the
/// handle of the active loop thread
pub struct Game {
    config: GameConfig,
    input: SharedInput,
    presenter: Option<Box<dyn Presenter>>,
    running: Option<RunningLoop>,
    games_started: u64,
}

impl Game {
    /// Validate `config` and get ready to play. No loop runs until
    /// `start_new_game`.
    pub fn new(config: GameConfig, presenter: impl Presenter + 'static) -> Result<Self, LoopError> {
        config.validate()?;
        Ok(Self {
            config,
            input: SharedInput::new(),
            presenter: Some(Box::new(presenter)),
            running: None,
            games_started: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Handle for the input source; write to it from any thread
    pub fn input(&self) -> SharedInput {
        self.input.clone()
    }

    pub fn games_started(&self) -> u64 {
        self.games_started
    }

    /// Stop and join any active loop, then launch a fresh session.
    ///
    /// Returns the seed of the new session.
    pub fn start_new_game(&mut self) -> Result<u64, LoopError> {
        self.stop()?;
        // Only lost if a previous loop panicked
        let mut presenter = self.presenter.take().ok_or(LoopError::Join)?;

        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let session = GameSession::new(self.config.clone(), seed);

        // The presenter is handed over only once the thread exists, so a
        // failed spawn leaves it with us
        let (handoff, receiver) = mpsc::sync_channel::<Box<dyn Presenter>>(1);
        let stop = Arc::new(AtomicBool::new(false));
        let loop_stop = Arc::clone(&stop);
        let input = self.input.clone();
        let spawned = thread::Builder::new()
            .name(format!("game-loop-{}", self.games_started + 1))
            .spawn(move || {
                let presenter = receiver.recv().ok()?;
                Some(run_loop(session, input, presenter, loop_stop))
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.presenter = Some(presenter);
                return Err(LoopError::Spawn(err));
            }
        };

        presenter.on_new_game_started();
        if let Err(mpsc::SendError(presenter)) = handoff.send(presenter) {
            self.presenter = Some(presenter);
            return self.join(handle).and(Err(LoopError::Join));
        }

        self.games_started += 1;
        self.running = Some(RunningLoop { stop, handle });
        log::info!("New game #{} started (seed {seed})", self.games_started);
        Ok(seed)
    }

    /// Signal the active loop to stop and wait for it to exit.
    ///
    /// The flag is checked at the top of each iteration; the current frame
    /// always completes. No-op when nothing is running.
    pub fn stop(&mut self) -> Result<(), LoopError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        running.stop.store(true, Ordering::Release);
        running.handle.thread().unpark();
        self.join(running.handle)
    }

    /// Block until the active loop ends on its own (game over)
    pub fn wait(&mut self) -> Result<(), LoopError> {
        match self.running.take() {
            Some(running) => self.join(running.handle),
            None => Ok(()),
        }
    }

    fn join(&mut self, handle: LoopHandle) -> Result<(), LoopError> {
        match handle.join() {
            Ok(Some(presenter)) => {
                self.presenter = Some(presenter);
                Ok(())
            }
            // Thread exited before the presenter arrived
            Ok(None) => Err(LoopError::Join),
            Err(_) => {
                log::error!("Game loop thread panicked");
                Err(LoopError::Join)
            }
        }
    }

    /// A loop thread exists and has not finished
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log::warn!("Game loop did not shut down cleanly: {err}");
        }
    }
}

fn run_loop(
    mut session: GameSession,
    input: SharedInput,
    mut presenter: Box<dyn Presenter>,
    stop: Arc<AtomicBool>,
) -> Box<dyn Presenter> {
    let period = session.config.frame_period();
    let mut fps = FpsCounter::new(Instant::now());

    while !stop.load(Ordering::Acquire) {
        let frame_start = Instant::now();

        let snapshot = input.snapshot();
        tick(&mut session, &snapshot);
        let current_fps = fps.frame(frame_start);
        presenter.present(&Frame {
            session: &session,
            fps: current_fps,
        });

        if !session.is_running() {
            presenter.on_game_over(session.score);
            break;
        }

        pace(frame_start, period, &stop);
    }

    log::debug!(
        "Game loop exiting after {} frames (score {})",
        session.frame,
        session.score
    );
    presenter
}

/// Park for what is left of the frame period, at least `MIN_SLEEP`
fn pace(frame_start: Instant, period: Duration, stop: &AtomicBool) {
    let sleep = period.saturating_sub(frame_start.elapsed()).max(MIN_SLEEP);
    let deadline = Instant::now() + sleep;
    thread::park_timeout(sleep);

    let now = Instant::now();
    if now < deadline && !stop.load(Ordering::Acquire) {
        log::debug!("Frame sleep interrupted {:?} early", deadline - now);
    }
}

//! Drift Dodge entry point
//!
//! Headless native runner: plays a few sessions with scripted input and logs
//! what the presenter sees. Usage: `drift-dodge [config.json] [games]`

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use drift_dodge::sim::GameEvent;
use drift_dodge::{Frame, Game, GameConfig, InputSnapshot, LoopError, Presenter, SharedInput};

const DEFAULT_GAMES: u32 = 3;
/// Give up on a session that outlives this
const MAX_GAME_TIME: Duration = Duration::from_secs(60);

/// Logs a status line about once a second and reports game over
struct LogPresenter {
    game_over: Sender<i64>,
    frames: u64,
}

impl Presenter for LogPresenter {
    fn present(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        for event in frame.events() {
            match event {
                GameEvent::ObstacleHit => log::debug!("Hit! score {}", frame.score()),
                GameEvent::CoinCollected => log::debug!("Coin! score {}", frame.score()),
                _ => {}
            }
        }
        if self.frames % 60 == 0 {
            log::info!(
                "score {:>6} | obstacles {:>3} | coins {:>3} | {:.1} fps",
                frame.score(),
                frame.obstacles().len(),
                frame.coins().len(),
                frame.fps()
            );
        }
    }

    fn on_game_over(&mut self, score: i64) {
        // Receiver gone means main is already shutting down
        let _ = self.game_over.send(score);
    }

    fn on_new_game_started(&mut self) {
        self.frames = 0;
    }
}

/// Sweep left and right, boosting now and then
fn spawn_input_script(input: SharedInput, done: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut step: u64 = 0;
        while !done.load(Ordering::Relaxed) {
            let phase = step % 40;
            input.set(InputSnapshot {
                left: phase < 20,
                right: phase >= 20,
                up: step % 7 == 0,
                boost: step % 13 < 3,
                ..InputSnapshot::default()
            });
            step += 1;
            thread::sleep(Duration::from_millis(50));
        }
    })
}

fn play(game: &mut Game, game_over: &Receiver<i64>) -> Result<(), LoopError> {
    let seed = game.start_new_game()?;
    match game_over.recv_timeout(MAX_GAME_TIME) {
        Ok(score) => {
            log::info!("Game (seed {seed}) ended with score {score}");
            game.wait()
        }
        Err(RecvTimeoutError::Timeout) => {
            log::info!("Game (seed {seed}) still running after {MAX_GAME_TIME:?}, stopping");
            game.stop()
        }
        // Presenter dropped without a game over: the loop died, surface why
        Err(RecvTimeoutError::Disconnected) => game.wait(),
    }
}

fn run() -> Result<(), LoopError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(&path)?,
        None => GameConfig::default(),
    };
    let games = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_GAMES);

    let (tx, rx) = mpsc::channel();
    let mut game = Game::new(
        config,
        LogPresenter {
            game_over: tx,
            frames: 0,
        },
    )?;

    let done = Arc::new(AtomicBool::new(false));
    let script = spawn_input_script(game.input(), Arc::clone(&done));

    let result = (0..games).try_for_each(|_| play(&mut game, &rx));

    done.store(true, Ordering::Relaxed);
    if script.join().is_err() {
        log::warn!("Input script thread panicked");
    }
    result
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Drift Dodge (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

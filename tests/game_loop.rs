//! Threaded loop behaviour: restarts, game over, stop/join

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use drift_dodge::sim::{GameEvent, GameOverReason};
use drift_dodge::{DifficultyTable, Frame, Game, GameConfig, LoopError, Presenter};
use glam::Vec2;

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
enum Record {
    Started,
    Frame { frame: u64, score: i64, center: Vec2 },
    GameOver { score: i64, reason: Option<GameOverReason> },
}

struct Recorder {
    tx: Sender<Record>,
    last_reason: Option<GameOverReason>,
}

impl Presenter for Recorder {
    fn present(&mut self, frame: &Frame<'_>) {
        for event in frame.events() {
            if let GameEvent::GameOver { reason, .. } = event {
                self.last_reason = Some(*reason);
            }
        }
        let _ = self.tx.send(Record::Frame {
            frame: frame.session.frame,
            score: frame.score(),
            center: frame.player().body.hitbox.center(),
        });
    }

    fn on_game_over(&mut self, score: i64) {
        let _ = self.tx.send(Record::GameOver {
            score,
            reason: self.last_reason.take(),
        });
    }

    fn on_new_game_started(&mut self) {
        let _ = self.tx.send(Record::Started);
    }
}

fn game(config: GameConfig) -> (Game, Receiver<Record>) {
    let (tx, rx) = mpsc::channel();
    let game = Game::new(
        config,
        Recorder {
            tx,
            last_reason: None,
        },
    )
    .unwrap();
    (game, rx)
}

fn fast_config() -> GameConfig {
    GameConfig {
        target_fps: 500,
        seed: Some(31337),
        ..GameConfig::default()
    }
}

/// Two slots, both forced solid except one, with the centred player
/// straddling the seam: the first row always hits it at score zero
fn doomed_config() -> GameConfig {
    GameConfig {
        target_fps: 1000,
        slot_margin: 200.0,
        seed: Some(5),
        difficulty: DifficultyTable {
            min_obstacle_probability: 1.0,
            max_obstacle_probability: 1.0,
            ..DifficultyTable::default()
        },
        ..GameConfig::default()
    }
}

fn next_frame(rx: &Receiver<Record>) -> (u64, i64, Vec2) {
    loop {
        match rx.recv_timeout(TIMEOUT).unwrap() {
            Record::Frame {
                frame,
                score,
                center,
            } => return (frame, score, center),
            _ => continue,
        }
    }
}

#[test]
fn test_new_game_starts_fresh() {
    let (mut game, rx) = game(fast_config());
    game.start_new_game().unwrap();

    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Record::Started);
    let (frame, score, center) = next_frame(&rx);
    assert_eq!(frame, 1);
    assert_eq!(score, 0);
    assert_eq!(center, Vec2::new(400.0, 300.0));

    game.stop().unwrap();
}

#[test]
fn test_restart_resets_session() {
    let (mut game, rx) = game(fast_config());
    game.start_new_game().unwrap();
    // Let the first session run a little
    while next_frame(&rx).0 < 20 {}

    game.start_new_game().unwrap();
    assert_eq!(game.games_started(), 2);

    // Drain frames from the first loop; it was joined before the restart
    loop {
        if rx.recv_timeout(TIMEOUT).unwrap() == Record::Started {
            break;
        }
    }
    let (frame, score, center) = next_frame(&rx);
    assert_eq!(frame, 1);
    assert_eq!(score, 0);
    assert_eq!(center, Vec2::new(400.0, 300.0));

    game.stop().unwrap();
}

#[test]
fn test_game_over_notifies_presenter() {
    let (mut game, rx) = game(doomed_config());
    game.start_new_game().unwrap();

    let record = loop {
        match rx.recv_timeout(TIMEOUT).unwrap() {
            over @ Record::GameOver { .. } => break over,
            _ => continue,
        }
    };
    assert_eq!(
        record,
        Record::GameOver {
            score: -10,
            reason: Some(GameOverReason::ScoreBelowZero),
        }
    );

    // Loop exits on its own
    game.wait().unwrap();
    assert!(!game.is_running());

    // And can be restarted afterwards
    game.start_new_game().unwrap();
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Record::Started);
    game.stop().unwrap();
}

#[test]
fn test_stop_joins_loop() {
    let (mut game, rx) = game(fast_config());
    game.start_new_game().unwrap();
    next_frame(&rx);
    assert!(game.is_running());

    game.stop().unwrap();
    assert!(!game.is_running());

    // Nothing is produced once stop returns
    while rx.try_recv().is_ok() {}
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn test_drop_stops_loop() {
    let (mut game, rx) = game(fast_config());
    game.start_new_game().unwrap();
    next_frame(&rx);
    drop(game);

    // Presenter (and its sender) went away with the joined loop
    while rx.try_recv().is_ok() {}
    assert!(matches!(
        rx.recv_timeout(Duration::from_millis(100)),
        Err(mpsc::RecvTimeoutError::Disconnected)
    ));
}

#[test]
fn test_invalid_probability_rejected() {
    let config = GameConfig {
        difficulty: DifficultyTable {
            max_obstacle_probability: 1.5,
            ..DifficultyTable::default()
        },
        ..GameConfig::default()
    };
    let (tx, _rx) = mpsc::channel();
    let result = Game::new(
        config,
        Recorder {
            tx,
            last_reason: None,
        },
    );
    assert!(matches!(result, Err(LoopError::Config(_))));
}

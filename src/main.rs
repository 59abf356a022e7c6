/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use simplelog::{LevelFilter, WriteLogger};

use config::GameConfig;
use domain::entity::{Dir, Input, PlayerId};
use sim::event::GameEvent;
use sim::maze::REQUIRED_KEYS;
use sim::step;
use sim::world::{MatchState, Phase};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const BANNER_TIME: Duration = Duration::from_millis(2500);
const LOG_FILE: &str = "craftduel.log";

fn main() {
    setup_logging();
    let config = GameConfig::load();

    let mut world = match MatchState::new(&config) {
        Ok(world) => world,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Broken level data: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        log::error!("game error: {e}");
        eprintln!("Game error: {e}");
    }

    let scores = world.scores();
    println!();
    println!("Thanks for playing Craft Duel!");
    println!("Score: {} - {}", scores.p1, scores.p2);
}

/// `--debug` writes a log file next to where the game was started.
fn setup_logging() {
    if !std::env::args().any(|arg| arg == "--debug") {
        return;
    }
    let file = match File::create(LOG_FILE) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot create {LOG_FILE}: {e}");
            return;
        }
    };
    let config = simplelog::ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .build();
    if let Err(e) = WriteLogger::init(LevelFilter::Debug, config, file) {
        eprintln!("Logger init failed: {e}");
    }
}

fn game_loop(
    world: &mut MatchState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut banner = Banner::default();
    let mut clock = PhaseClock::new(world.phase());
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(u64::from(config.dig.stun_tick_ms));

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }

        clock.observe(world.phase());
        let phase = clock.phase;
        for &code in kb.presses() {
            // Keys queued behind a phase change belong to the old screen.
            if world.phase() != phase {
                break;
            }
            match key_action(phase, code, clock.settled()) {
                Some(Action::Quit) => return Ok(()),
                Some(Action::Start) => {
                    world.start();
                    banner.clear();
                }
                Some(Action::Menu) => {
                    world.reset();
                    banner.clear();
                }
                Some(Action::Play(input)) => {
                    let events = step::dispatch(world, input);
                    banner.update(&events);
                }
                None => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            step::tick(world);
            last_tick = Instant::now();
        }

        renderer.render(&world.snapshot(), banner.text())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_P1_UP: &[KeyCode] = &[KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_P1_DOWN: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_P1_LEFT: &[KeyCode] = &[KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_P1_RIGHT: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_P1_DIG: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('e'), KeyCode::Char('E')];
const KEYS_P2_DIG: &[KeyCode] = &[KeyCode::Enter];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Action {
    Start,
    Menu,
    Quit,
    Play(Input),
}

/// What a key press means in the current phase. Confirm keys double as
/// dig keys, so the final screen ignores them until the phase has `settled`.
fn key_action(phase: Phase, code: KeyCode, settled: bool) -> Option<Action> {
    if KEYS_QUIT.contains(&code) {
        return Some(Action::Quit);
    }
    match phase {
        Phase::Menu => {
            if KEYS_CONFIRM.contains(&code) {
                Some(Action::Start)
            } else if code == KeyCode::Esc {
                Some(Action::Quit)
            } else {
                None
            }
        }
        Phase::Final => {
            if code == KeyCode::Esc || (settled && KEYS_CONFIRM.contains(&code)) {
                Some(Action::Menu)
            } else {
                None
            }
        }
        Phase::Maze | Phase::Portal | Phase::Dig => {
            if code == KeyCode::Esc {
                return Some(Action::Menu);
            }
            play_input(code).map(Action::Play)
        }
    }
}

fn play_input(code: KeyCode) -> Option<Input> {
    use PlayerId::*;

    let p1_dir = if KEYS_P1_UP.contains(&code) {
        Some(Dir::Up)
    } else if KEYS_P1_DOWN.contains(&code) {
        Some(Dir::Down)
    } else if KEYS_P1_LEFT.contains(&code) {
        Some(Dir::Left)
    } else if KEYS_P1_RIGHT.contains(&code) {
        Some(Dir::Right)
    } else {
        None
    };
    if let Some(dir) = p1_dir {
        return Some(Input::Move(P1, dir));
    }

    let p2_dir = match code {
        KeyCode::Up => Some(Dir::Up),
        KeyCode::Down => Some(Dir::Down),
        KeyCode::Left => Some(Dir::Left),
        KeyCode::Right => Some(Dir::Right),
        _ => None,
    };
    if let Some(dir) = p2_dir {
        return Some(Input::Move(P2, dir));
    }

    if KEYS_P1_DIG.contains(&code) {
        Some(Input::Dig(P1))
    } else if KEYS_P2_DIG.contains(&code) {
        Some(Input::Dig(P2))
    } else {
        None
    }
}

// ── Phase clock ──

/// Tracks how long the current phase has been on screen.
struct PhaseClock {
    phase: Phase,
    since: Instant,
}

impl PhaseClock {
    fn new(phase: Phase) -> Self {
        PhaseClock { phase, since: Instant::now() }
    }

    fn observe(&mut self, phase: Phase) {
        if phase != self.phase {
            *self = PhaseClock::new(phase);
        }
    }

    /// Held keys from the previous screen have had time to be released.
    fn settled(&self) -> bool {
        self.since.elapsed() >= BANNER_TIME
    }
}

// ── Banner ──

/// One-line message shown under the boards for a short while.
#[derive(Default)]
struct Banner {
    text: String,
    shown_at: Option<Instant>,
}

impl Banner {
    fn set(&mut self, text: String) {
        self.text = text;
        self.shown_at = Some(Instant::now());
    }

    fn clear(&mut self) {
        self.text.clear();
        self.shown_at = None;
    }

    fn text(&mut self) -> &str {
        if self.shown_at.is_some_and(|t| t.elapsed() >= BANNER_TIME) {
            self.clear();
        }
        &self.text
    }

    /// The latest event with something to say wins the line.
    fn update(&mut self, events: &[GameEvent]) {
        for event in events {
            if let Some(text) = banner_text(event) {
                self.set(text);
            }
        }
    }
}

fn banner_text(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::KeyCollected { player, key } => {
            Some(format!("{} picked up the {:?} key", player.label(), key))
        }
        GameEvent::ExitLocked { player, keys } => {
            Some(format!("{}: exit locked ({keys}/{REQUIRED_KEYS} keys)", player.label()))
        }
        GameEvent::TntTriggered { player, .. } => Some(format!("{} hit TNT!", player.label())),
        GameEvent::LevelWon { level, player } => {
            Some(format!("{} wins {}!", player.label(), level.title()))
        }
        GameEvent::Teleported { .. }
        | GameEvent::GemFound { .. }
        | GameEvent::MatchFinished { .. } => None,
    }
}

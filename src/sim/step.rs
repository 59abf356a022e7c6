/// Input dispatch and the periodic tick.
///
/// Every input goes to the active level only. Menu and final screens
/// ignore gameplay input. After the level has handled an input, a
/// reported winner is handed to the match, which drops the level and
/// activates the next one within the same call.
///
///   Move  -> Maze / Portal: walk          Dig: move cursor
///   Dig   -> Dig: dig at cursor           Maze / Portal: ignored
///   DigAt -> Dig: dig that cell           Maze / Portal: ignored

use crate::domain::entity::Input;
use super::event::GameEvent;
use super::world::{ActiveLevel, MatchState};

// ══════════════════════════════════════════════════════════════
// Main entry points
// ══════════════════════════════════════════════════════════════

pub fn dispatch(world: &mut MatchState, input: Input) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    let level = match world.active_level_mut() {
        Some(level) => level,
        None => return events,
    };

    match (level, input) {
        (ActiveLevel::Maze(l), Input::Move(player, dir)) => l.handle_move(player, dir, &mut events),
        (ActiveLevel::Portal(l), Input::Move(player, dir)) => l.handle_move(player, dir, &mut events),
        (ActiveLevel::Dig(l), Input::Move(player, dir)) => l.handle_move(player, dir),
        (ActiveLevel::Dig(l), Input::Dig(player)) => l.handle_dig(player, &mut events),
        (ActiveLevel::Dig(l), Input::DigAt(player, index)) => l.dig(player, index, &mut events),
        _ => {}
    }

    resolve_win(world, &mut events);

    for event in &events {
        log::debug!("{event:?}");
    }
    events
}

/// One stun-countdown step. Only the dig level has a clock; in every other
/// phase this does nothing.
pub fn tick(world: &mut MatchState) {
    if let Some(ActiveLevel::Dig(level)) = world.active_level_mut() {
        level.tick();
    }
}

fn resolve_win(world: &mut MatchState, events: &mut Vec<GameEvent>) {
    let winner = world.active_level_mut().and_then(|level| level.winner());
    if let Some(player) = winner {
        world.complete_level(player, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

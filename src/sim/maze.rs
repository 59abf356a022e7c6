/// Level 1: the labyrinth.
///
/// Each player walks their own copy of the maze collecting the three
/// keys. The exit only counts once all three are held; stepping on it
/// early is a normal move.

use std::collections::BTreeSet;

use crate::domain::entity::{Dir, PerPlayer, PlayerId, Pos};
use crate::domain::rules;
use crate::domain::tile::{KeyColor, Tile};
use super::event::GameEvent;
use super::level::LevelMap;

pub const REQUIRED_KEYS: usize = KeyColor::ALL.len();

#[derive(Clone, Debug)]
pub struct Runner {
    pub pos: Pos,
    pub keys: BTreeSet<KeyColor>,
}

impl Runner {
    fn new(pos: Pos) -> Self {
        Runner { pos, keys: BTreeSet::new() }
    }

    pub fn has_all_keys(&self) -> bool {
        self.keys.len() == REQUIRED_KEYS
    }
}

#[derive(Clone, Debug)]
pub struct MazeLevel {
    map: LevelMap,
    runners: PerPlayer<Runner>,
    winner: Option<PlayerId>,
}

impl MazeLevel {
    pub fn new(map: LevelMap) -> Self {
        let runners = map.spawns.map(|&pos| Runner::new(pos));
        MazeLevel { map, runners, winner: None }
    }

    pub fn map(&self) -> &LevelMap {
        &self.map
    }

    pub fn runner(&self, player: PlayerId) -> &Runner {
        &self.runners[player]
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn handle_move(&mut self, player: PlayerId, dir: Dir, events: &mut Vec<GameEvent>) {
        if self.winner.is_some() { return; }

        let runner = &mut self.runners[player];
        let step = match rules::attempt_move(&self.map.view(), runner.pos, dir) {
            Some(s) => s,
            None => return,
        };
        runner.pos = step.pos;

        match step.tile {
            Tile::Key(key) => {
                if runner.keys.insert(key) {
                    events.push(GameEvent::KeyCollected { player, key });
                }
            }
            Tile::Exit if runner.has_all_keys() => {
                self.winner = Some(player);
            }
            Tile::Exit => {
                events.push(GameEvent::ExitLocked { player, keys: runner.keys.len() });
            }
            _ => {}
        }
    }
}

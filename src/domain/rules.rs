/// Movement rules shared by the grid levels.
///
/// Pure functions over an immutable map. They decide "what is legal"
/// and report what was stepped on; the levels interpret the tile.
///
/// ### Move
/// ┌──────────────────────┬───────────────┐
/// │ Condition            │ Result        │
/// ├──────────────────────┼───────────────┤
/// │ Dest out of bounds   │ None          │
/// │ Dest tile is a wall  │ None          │
/// │ Otherwise            │ Some(Step)    │
/// └──────────────────────┴───────────────┘

use super::entity::{Dir, Pos};
use super::tile::Tile;

/// Immutable view of a tile grid for rule queries.
pub struct MapView<'a> {
    pub tiles: &'a [Vec<Tile>],
    pub width: usize,
    pub height: usize,
}

impl<'a> MapView<'a> {
    pub fn tile_at(&self, pos: Pos) -> Tile {
        if pos.x >= self.width || pos.y >= self.height {
            return Tile::Wall; // out of bounds = wall
        }
        self.tiles[pos.y][pos.x]
    }
}

/// A legal move: where the player lands and what is there.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Step {
    pub pos: Pos,
    pub tile: Tile,
}

pub fn attempt_move(map: &MapView, from: Pos, dir: Dir) -> Option<Step> {
    let to = from.step(dir, map.width, map.height)?;
    let tile = map.tile_at(to);
    if !tile.is_passable() {
        return None;
    }
    Some(Step { pos: to, tile })
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

/// Entities: players, positions and directions.
/// Everything per-player lives in a `PerPlayer<T>` so the two sides
/// never share mutable state.

use std::ops::{Index, IndexMut};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PlayerId {
    P1,
    P2,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::P1, PlayerId::P2];

    pub fn label(self) -> &'static str {
        match self {
            PlayerId::P1 => "Player 1",
            PlayerId::P2 => "Player 2",
        }
    }
}

/// Movement direction. Only the four orthogonal unit steps exist.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    #[allow(dead_code)]
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up    => (0, -1),
            Dir::Down  => (0, 1),
            Dir::Left  => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Discrete input event, already tagged with the acting player.
/// The device it came from (keyboard, pointer) does not matter here.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Input {
    Move(PlayerId, Dir),
    /// Dig at the player's cursor.
    Dig(PlayerId),
    /// Dig a specific cell, e.g. from a pointer tap.
    #[allow(dead_code)]
    DigAt(PlayerId, usize),
}

/// Grid coordinate. (0, 0) is the top-left cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Neighbour in `dir`, if it stays inside a `width` x `height` grid.
    pub fn step(self, dir: Dir, width: usize, height: usize) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
            return None;
        }
        Some(Pos::new(nx as usize, ny as usize))
    }
}

/// One value per player, indexable by `PlayerId`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PerPlayer<T> {
    pub p1: T,
    pub p2: T,
}

impl<T> PerPlayer<T> {
    pub fn new(p1: T, p2: T) -> Self {
        PerPlayer { p1, p2 }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerPlayer<U> {
        PerPlayer { p1: f(&self.p1), p2: f(&self.p2) }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        [(PlayerId::P1, &mut self.p1), (PlayerId::P2, &mut self.p2)].into_iter()
    }
}

impl<T> Index<PlayerId> for PerPlayer<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        match player {
            PlayerId::P1 => &self.p1,
            PlayerId::P2 => &self.p2,
        }
    }
}

impl<T> IndexMut<PlayerId> for PerPlayer<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        match player {
            PlayerId::P1 => &mut self.p1,
            PlayerId::P2 => &mut self.p2,
        }
    }
}

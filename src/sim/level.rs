/// Built-in level maps and the map parser.
///
/// Maps are compiled-in text, one string per row. A malformed map is a
/// build defect: parsing reports a `MapError` and the game refuses to start.
///
/// ## Tile legend:
///   '#' = Wall                   '.' = Floor
///   '1' = Player 1 spawn         '2' = Player 2 spawn
///   'S' = Shared spawn pad       'X' = Maze exit
///   'r' / 'b' / 'y' = Red / Blue / Yellow key
///   'p' / 'P' = Blue portal A / B
///   'o' / 'O' = Orange portal A / B
///   'G' = Portal goal

use thiserror::Error;

use crate::domain::entity::{PerPlayer, PlayerId, Pos};
use crate::domain::rules::MapView;
use crate::domain::tile::{KeyColor, Tile};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("{map}: map has no rows")]
    Empty { map: &'static str },
    #[error("{map}: row {row} is {found} cells wide, expected {expected}")]
    RaggedRow { map: &'static str, row: usize, expected: usize, found: usize },
    #[error("{map}: map is {found:?}, expected {expected:?}")]
    WrongSize { map: &'static str, expected: (usize, usize), found: (usize, usize) },
    #[error("{map}: unknown tile {ch:?} at {pos:?}")]
    UnknownTile { map: &'static str, ch: char, pos: Pos },
    #[error("{map}: no spawn for {player:?}")]
    MissingSpawn { map: &'static str, player: PlayerId },
    #[error("{map}: required {what} is missing")]
    Missing { map: &'static str, what: String },
    #[error("{map}: {what} appears at {first:?} and {second:?}")]
    Duplicate { map: &'static str, what: String, first: Pos, second: Pos },
}

/// Static level map. Never mutated after parsing.
#[derive(Clone, Debug)]
pub struct LevelMap {
    pub name: &'static str,
    pub width: usize,
    pub height: usize,
    tiles: Vec<Vec<Tile>>,
    pub spawns: PerPlayer<Pos>,
}

impl LevelMap {
    /// Parse rows into a map of exactly `expected` (width, height).
    pub fn parse(
        name: &'static str,
        rows: &[&str],
        expected: (usize, usize),
    ) -> Result<LevelMap, MapError> {
        let height = rows.len();
        if height == 0 {
            return Err(MapError::Empty { map: name });
        }
        let width = rows[0].chars().count();

        let mut tiles = Vec::with_capacity(height);
        let mut spawns: PerPlayer<Option<Pos>> = PerPlayer::default();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRow { map: name, row: y, expected: width, found });
            }
            let mut line = Vec::with_capacity(width);
            for (x, ch) in row.chars().enumerate() {
                let pos = Pos::new(x, y);
                let tile = Tile::from_char(ch)
                    .ok_or(MapError::UnknownTile { map: name, ch, pos })?;
                let owners: &[PlayerId] = match ch {
                    '1' => &[PlayerId::P1],
                    '2' => &[PlayerId::P2],
                    'S' => &PlayerId::ALL,
                    _ => &[],
                };
                for &player in owners {
                    if let Some(first) = spawns[player] {
                        return Err(MapError::Duplicate {
                            map: name,
                            what: format!("{player:?} spawn"),
                            first,
                            second: pos,
                        });
                    }
                    spawns[player] = Some(pos);
                }
                line.push(tile);
            }
            tiles.push(line);
        }

        if (width, height) != expected {
            return Err(MapError::WrongSize { map: name, expected, found: (width, height) });
        }

        let spawn = |player: PlayerId| {
            spawns[player].ok_or(MapError::MissingSpawn { map: name, player })
        };
        let spawns = PerPlayer::new(spawn(PlayerId::P1)?, spawn(PlayerId::P2)?);

        Ok(LevelMap { name, width, height, tiles, spawns })
    }

    pub fn view(&self) -> MapView<'_> {
        MapView { tiles: &self.tiles, width: self.width, height: self.height }
    }

    pub fn tile_at(&self, pos: Pos) -> Tile {
        self.view().tile_at(pos)
    }

    /// All coordinates holding `tile`, row by row.
    pub fn positions_of(&self, tile: Tile) -> Vec<Pos> {
        let mut found = vec![];
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, &t) in row.iter().enumerate() {
                if t == tile {
                    found.push(Pos::new(x, y));
                }
            }
        }
        found
    }

    /// The single coordinate holding `tile`.
    pub fn unique(&self, tile: Tile, what: &str) -> Result<Pos, MapError> {
        match self.positions_of(tile).as_slice() {
            [] => Err(MapError::Missing { map: self.name, what: what.to_string() }),
            [pos] => Ok(*pos),
            [first, second, ..] => Err(MapError::Duplicate {
                map: self.name,
                what: what.to_string(),
                first: *first,
                second: *second,
            }),
        }
    }

    /// Fail if `tile` does not appear at least once.
    pub fn require(&self, tile: Tile, what: &str) -> Result<(), MapError> {
        if self.positions_of(tile).is_empty() {
            return Err(MapError::Missing { map: self.name, what: what.to_string() });
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in levels
// ══════════════════════════════════════════════════════════════

pub const MAZE_SIZE: (usize, usize) = (11, 11);
pub const PORTAL_SIZE: (usize, usize) = (9, 9);

const MAZE_ROWS: [&str; 11] = [
    "###########",
    "#1..#.r...#",
    "#.#.#.###.#",
    "#.#.....#.#",
    "#.#####.#.#",
    "#b.......y#",
    "###.#####.#",
    "#...#.....#",
    "#.###.#.#.#",
    "#2....#..X#",
    "###########",
];

// Route: blue portal A sends you up to B, orange A drops you by the goal.
const PORTAL_ROWS: [&str; 9] = [
    "#########",
    "#S..#..P#",
    "###.#.###",
    "#p.....o#",
    "#######.#",
    "#O....#.#",
    "#####.#.#",
    "#G......#",
    "#########",
];

/// The labyrinth: every key colour and one exit.
pub fn maze_map() -> Result<LevelMap, MapError> {
    let map = LevelMap::parse("Labyrinth", &MAZE_ROWS, MAZE_SIZE)?;
    map.unique(Tile::Exit, "exit")?;
    for key in KeyColor::ALL {
        map.require(Tile::Key(key), &format!("{key:?} key"))?;
    }
    Ok(map)
}

/// The portal puzzle. Portal ends are validated when the links are built.
pub fn portal_map() -> Result<LevelMap, MapError> {
    let map = LevelMap::parse("Portal", &PORTAL_ROWS, PORTAL_SIZE)?;
    map.unique(Tile::Goal, "goal")?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_maps_parse() {
        let maze = maze_map().unwrap();
        assert_eq!((maze.width, maze.height), MAZE_SIZE);
        assert_eq!(maze.spawns.p1, Pos::new(1, 1));
        assert_eq!(maze.spawns.p2, Pos::new(1, 9));
        assert_eq!(maze.unique(Tile::Exit, "exit"), Ok(Pos::new(9, 9)));

        let portal = portal_map().unwrap();
        assert_eq!((portal.width, portal.height), PORTAL_SIZE);
        assert_eq!(portal.spawns.p1, Pos::new(1, 1));
        assert_eq!(portal.spawns.p2, Pos::new(1, 1));
        assert_eq!(portal.tile_at(Pos::new(1, 1)), Tile::Start);
    }

    #[test]
    fn spawns_are_never_walls() {
        for map in [maze_map().unwrap(), portal_map().unwrap()] {
            for pos in [map.spawns.p1, map.spawns.p2] {
                assert!(map.tile_at(pos).is_passable());
            }
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = LevelMap::parse("t", &["#1#", "#2", "###"], (3, 3)).unwrap_err();
        assert_eq!(err, MapError::RaggedRow { map: "t", row: 1, expected: 3, found: 2 });
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let err = LevelMap::parse("t", &["12."], (3, 3)).unwrap_err();
        assert_eq!(err, MapError::WrongSize { map: "t", expected: (3, 3), found: (3, 1) });
    }

    #[test]
    fn unknown_tiles_are_rejected() {
        let err = LevelMap::parse("t", &["1?2"], (3, 1)).unwrap_err();
        assert_eq!(err, MapError::UnknownTile { map: "t", ch: '?', pos: Pos::new(1, 0) });
    }

    #[test]
    fn missing_and_duplicate_spawns_are_rejected() {
        let err = LevelMap::parse("t", &["1.."], (3, 1)).unwrap_err();
        assert_eq!(err, MapError::MissingSpawn { map: "t", player: PlayerId::P2 });

        let err = LevelMap::parse("t", &["1S2"], (3, 1)).unwrap_err();
        assert!(matches!(err, MapError::Duplicate { .. }));
    }

    #[test]
    fn unique_reports_missing_and_duplicates() {
        let map = LevelMap::parse("t", &["1GG2"], (4, 1)).unwrap();
        assert!(matches!(map.unique(Tile::Goal, "goal"), Err(MapError::Duplicate { .. })));
        assert!(matches!(map.unique(Tile::Exit, "exit"), Err(MapError::Missing { .. })));
    }

    #[test]
    fn errors_render_readable_messages() {
        let err = MapError::MissingSpawn { map: "Portal", player: PlayerId::P1 };
        assert_eq!(err.to_string(), "Portal: no spawn for P1");
    }
}

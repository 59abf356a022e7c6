/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum KeyColor {
    Red,
    Blue,
    Yellow,
}

impl KeyColor {
    pub const ALL: [KeyColor; 3] = [KeyColor::Red, KeyColor::Blue, KeyColor::Yellow];
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PortalColor {
    Blue,
    Orange,
}

impl PortalColor {
    pub const ALL: [PortalColor; 2] = [PortalColor::Blue, PortalColor::Orange];
}

/// Which end of a portal pair. A leads to B and B leads to A.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PortalEnd {
    A,
    B,
}

impl PortalEnd {
    pub fn other(self) -> PortalEnd {
        match self {
            PortalEnd::A => PortalEnd::B,
            PortalEnd::B => PortalEnd::A,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tile {
    Floor,
    Wall,
    Start,                                       // Floor, drawn as the spawn pad
    Key(KeyColor),                               // Maze pickup
    Exit,                                        // Maze exit, locked until all keys are held
    Portal { color: PortalColor, end: PortalEnd },
    Goal,                                        // Portal level finish
}

impl Tile {
    /// Map text legend. Spawn markers (`1`, `2`) are parsed separately.
    pub fn from_char(ch: char) -> Option<Tile> {
        let tile = match ch {
            '.' | '1' | '2' => Tile::Floor,
            '#' => Tile::Wall,
            'S' => Tile::Start,
            'r' => Tile::Key(KeyColor::Red),
            'b' => Tile::Key(KeyColor::Blue),
            'y' => Tile::Key(KeyColor::Yellow),
            'X' => Tile::Exit,
            'G' => Tile::Goal,
            'p' => Tile::Portal { color: PortalColor::Blue, end: PortalEnd::A },
            'P' => Tile::Portal { color: PortalColor::Blue, end: PortalEnd::B },
            'o' => Tile::Portal { color: PortalColor::Orange, end: PortalEnd::A },
            'O' => Tile::Portal { color: PortalColor::Orange, end: PortalEnd::B },
            _ => return None,
        };
        Some(tile)
    }

    /// Can a player occupy this cell?
    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Wall)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Floor
    }
}

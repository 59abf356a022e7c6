/// Level 2: the portal puzzle.
///
/// Stepping onto a portal lands you on its partner in the same step.
/// The partner cell is not re-evaluated, so there is no ping-pong.
/// Reaching the goal wins; the move onto the goal is still applied.

use std::collections::HashMap;

use crate::domain::entity::{Dir, PerPlayer, PlayerId, Pos};
use crate::domain::rules;
use crate::domain::tile::{PortalColor, PortalEnd, Tile};
use super::event::GameEvent;
use super::level::{LevelMap, MapError};

/// Symmetric portal relation, built once from the map.
#[derive(Clone, Debug)]
pub struct PortalLinks {
    links: HashMap<Pos, Pos>,
}

impl PortalLinks {
    /// Every portal end must appear exactly once.
    pub fn from_map(map: &LevelMap) -> Result<Self, MapError> {
        let mut links = HashMap::new();
        for color in PortalColor::ALL {
            let end_pos = |end: PortalEnd| {
                map.unique(Tile::Portal { color, end }, &format!("{color:?} portal {end:?}"))
            };
            let a = end_pos(PortalEnd::A)?;
            let b = end_pos(PortalEnd::A.other())?;
            links.insert(a, b);
            links.insert(b, a);
        }
        Ok(PortalLinks { links })
    }

    pub fn destination(&self, from: Pos) -> Option<Pos> {
        self.links.get(&from).copied()
    }
}

#[derive(Clone, Debug)]
pub struct PortalLevel {
    map: LevelMap,
    links: PortalLinks,
    positions: PerPlayer<Pos>,
    winner: Option<PlayerId>,
}

impl PortalLevel {
    pub fn new(map: LevelMap) -> Result<Self, MapError> {
        let links = PortalLinks::from_map(&map)?;
        let positions = map.spawns;
        Ok(PortalLevel { map, links, positions, winner: None })
    }

    pub fn map(&self) -> &LevelMap {
        &self.map
    }

    pub fn position(&self, player: PlayerId) -> Pos {
        self.positions[player]
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn handle_move(&mut self, player: PlayerId, dir: Dir, events: &mut Vec<GameEvent>) {
        if self.winner.is_some() { return; }

        let from = self.positions[player];
        let step = match rules::attempt_move(&self.map.view(), from, dir) {
            Some(s) => s,
            None => return,
        };

        match step.tile {
            Tile::Goal => {
                self.positions[player] = step.pos;
                self.winner = Some(player);
            }
            Tile::Portal { .. } => {
                let to = self.links.destination(step.pos).unwrap_or(step.pos);
                self.positions[player] = to;
                events.push(GameEvent::Teleported { player, from: step.pos, to });
            }
            _ => self.positions[player] = step.pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::portal_map;
    use Dir::*;

    fn level() -> PortalLevel {
        PortalLevel::new(portal_map().unwrap()).unwrap()
    }

    fn walk(level: &mut PortalLevel, player: PlayerId, moves: &[(Dir, usize)]) -> Vec<GameEvent> {
        let mut events = vec![];
        for &(dir, n) in moves {
            for _ in 0..n {
                level.handle_move(player, dir, &mut events);
            }
        }
        events
    }

    #[test]
    fn both_players_start_on_the_pad() {
        let level = level();
        assert_eq!(level.position(PlayerId::P1), Pos::new(1, 1));
        assert_eq!(level.position(PlayerId::P2), Pos::new(1, 1));
    }

    #[test]
    fn links_are_symmetric_for_both_colors() {
        let map = portal_map().unwrap();
        let links = PortalLinks::from_map(&map).unwrap();
        for color in PortalColor::ALL {
            let a = map.positions_of(Tile::Portal { color, end: PortalEnd::A })[0];
            let b = map.positions_of(Tile::Portal { color, end: PortalEnd::B })[0];
            assert_eq!(links.destination(a), Some(b));
            assert_eq!(links.destination(b), Some(a));
        }
        assert_eq!(links.destination(Pos::new(1, 1)), None);
    }

    #[test]
    fn blue_a_sends_to_blue_b_and_back() {
        let mut level = level();
        // (1,1) -> (3,3), then left onto blue A at (1,3)
        let events = walk(&mut level, PlayerId::P1, &[(Right, 2), (Down, 2), (Left, 2)]);
        assert_eq!(level.position(PlayerId::P1), Pos::new(7, 1));
        assert_eq!(
            events,
            vec![GameEvent::Teleported { player: PlayerId::P1, from: Pos::new(1, 3), to: Pos::new(7, 1) }]
        );

        // leave blue B and step back on: lands on blue A
        walk(&mut level, PlayerId::P1, &[(Left, 1), (Right, 1)]);
        assert_eq!(level.position(PlayerId::P1), Pos::new(1, 3));
    }

    #[test]
    fn orange_a_sends_to_orange_b() {
        let mut level = level();
        walk(&mut level, PlayerId::P2, &[(Right, 2), (Down, 2), (Right, 4)]);
        assert_eq!(level.position(PlayerId::P2), Pos::new(1, 5));
        assert_eq!(level.position(PlayerId::P1), Pos::new(1, 1));
    }

    #[test]
    fn goal_wins_and_keeps_the_move() {
        let mut level = level();
        walk(
            &mut level,
            PlayerId::P2,
            &[(Right, 2), (Down, 2), (Right, 4), (Right, 4), (Down, 2), (Left, 4)],
        );
        assert_eq!(level.position(PlayerId::P2), Pos::new(1, 7));
        assert_eq!(level.winner(), Some(PlayerId::P2));

        // frozen after the win
        walk(&mut level, PlayerId::P1, &[(Right, 1)]);
        assert_eq!(level.position(PlayerId::P1), Pos::new(1, 1));
    }

    #[test]
    fn missing_portal_end_is_a_map_error() {
        let map = LevelMap::parse("t", &["Sp.P.o.G"], (8, 1)).unwrap();
        assert!(matches!(PortalLinks::from_map(&map), Err(MapError::Missing { .. })));
    }
}

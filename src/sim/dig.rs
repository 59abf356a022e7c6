/// Level 3: the TNT field.
///
/// Two independent boards, one per player. Digging a gem scores, digging
/// TNT stuns the digger. A stunned player can neither dig nor move the
/// cursor until the stun runs out. First to `gems_to_win` gems wins.
///
/// The stun countdown is driven by `tick()`, which the match only calls
/// while this level is active.

use rand::Rng;

use crate::config::DigConfig;
use crate::domain::board::{Board, DigCell};
use crate::domain::entity::{Dir, PerPlayer, PlayerId};
use super::event::GameEvent;

#[derive(Clone, Debug)]
pub struct Digger {
    pub board: Board,
    pub cursor: usize,
    pub gems: u32,
    pub stun_ms: u32,
}

impl Digger {
    fn new(board: Board) -> Self {
        Digger { board, cursor: 0, gems: 0, stun_ms: 0 }
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_ms > 0
    }
}

#[derive(Clone, Debug)]
pub struct DigLevel {
    rules: DigConfig,
    diggers: PerPlayer<Digger>,
    winner: Option<PlayerId>,
}

impl DigLevel {
    /// Fresh level with an independently generated board per player.
    pub fn new<R: Rng + ?Sized>(rules: DigConfig, rng: &mut R) -> Self {
        let p1 = Board::generate(&rules, rng);
        let p2 = Board::generate(&rules, rng);
        DigLevel::with_boards(rules, PerPlayer::new(p1, p2))
    }

    pub fn with_boards(rules: DigConfig, boards: PerPlayer<Board>) -> Self {
        let PerPlayer { p1, p2 } = boards;
        DigLevel {
            rules,
            diggers: PerPlayer::new(Digger::new(p1), Digger::new(p2)),
            winner: None,
        }
    }

    pub fn rules(&self) -> &DigConfig {
        &self.rules
    }

    pub fn digger(&self, player: PlayerId) -> &Digger {
        &self.diggers[player]
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn handle_move(&mut self, player: PlayerId, dir: Dir) {
        if self.winner.is_some() { return; }
        let d = &mut self.diggers[player];
        if d.is_stunned() { return; }
        d.cursor = d.board.move_cursor(d.cursor, dir);
    }

    /// Dig at the player's cursor.
    pub fn handle_dig(&mut self, player: PlayerId, events: &mut Vec<GameEvent>) {
        let cursor = self.diggers[player].cursor;
        self.dig(player, cursor, events);
    }

    /// Dig `index` on the player's own board. Silently ignored while
    /// stunned, on a revealed or out-of-range cell, or after a win.
    pub fn dig(&mut self, player: PlayerId, index: usize, events: &mut Vec<GameEvent>) {
        if self.winner.is_some() { return; }

        let d = &mut self.diggers[player];
        if d.is_stunned() { return; }
        let cell = match d.board.reveal(index) {
            Some(c) => c,
            None => return,
        };

        match cell {
            DigCell::Gem => {
                d.gems += 1;
                events.push(GameEvent::GemFound { player, index, gems: d.gems });
                if d.gems >= self.rules.gems_to_win {
                    self.winner = Some(player);
                }
            }
            DigCell::Tnt => {
                d.stun_ms = self.rules.stun_ms;
                events.push(GameEvent::TntTriggered { player, index });
            }
            DigCell::Empty => {}
        }
    }

    /// One countdown step for both players, floored at zero.
    pub fn tick(&mut self) {
        let step = self.rules.stun_tick_ms;
        for (_, d) in self.diggers.iter_mut() {
            d.stun_ms = d.stun_ms.saturating_sub(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// 5x5 boards from a diagram: 'g' gem, 't' tnt, anything else empty.
    fn board_from(rows: &[&str]) -> Board {
        let cells = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|c| match c {
                'g' => DigCell::Gem,
                't' => DigCell::Tnt,
                _ => DigCell::Empty,
            })
            .collect();
        Board::from_cells(rows[0].len(), rows.len(), cells)
    }

    fn level() -> DigLevel {
        let p1 = board_from(&["ggtt.", "gg...", "tt...", "t....", "t...."]);
        let p2 = board_from(&[".....", ".....", ".....", ".....", "....."]);
        DigLevel::with_boards(DigConfig::default(), PerPlayer::new(p1, p2))
    }

    #[test]
    fn new_level_generates_two_boards() {
        let mut rng = SmallRng::seed_from_u64(3);
        let level = DigLevel::new(DigConfig::default(), &mut rng);
        for player in PlayerId::ALL {
            let d = level.digger(player);
            assert_eq!(d.board.count(DigCell::Gem), 5);
            assert_eq!(d.board.count(DigCell::Tnt), 7);
            assert_eq!((d.cursor, d.gems, d.stun_ms), (0, 0, 0));
        }
    }

    #[test]
    fn gem_scores_once() {
        let mut level = level();
        let mut events = vec![];
        level.dig(PlayerId::P1, 0, &mut events);
        level.dig(PlayerId::P1, 0, &mut events);
        assert_eq!(level.digger(PlayerId::P1).gems, 1);
        assert_eq!(events, vec![GameEvent::GemFound { player: PlayerId::P1, index: 0, gems: 1 }]);
    }

    #[test]
    fn boards_are_independent() {
        let mut level = level();
        let mut events = vec![];
        level.dig(PlayerId::P1, 0, &mut events);
        assert!(level.digger(PlayerId::P1).board.is_revealed(0));
        assert!(!level.digger(PlayerId::P2).board.is_revealed(0));

        level.dig(PlayerId::P2, 0, &mut events);
        assert!(level.digger(PlayerId::P2).board.is_revealed(0));
        assert_eq!(level.digger(PlayerId::P2).gems, 0);
    }

    #[test]
    fn tnt_stuns_for_exactly_two_seconds() {
        let mut level = level();
        let mut events = vec![];
        level.dig(PlayerId::P1, 2, &mut events);
        assert_eq!(level.digger(PlayerId::P1).stun_ms, 2000);
        assert_eq!(events, vec![GameEvent::TntTriggered { player: PlayerId::P1, index: 2 }]);
        assert_eq!(level.digger(PlayerId::P2).stun_ms, 0);
    }

    #[test]
    fn stunned_player_cannot_dig_or_move() {
        let mut level = level();
        let mut events = vec![];
        level.dig(PlayerId::P1, 2, &mut events);
        events.clear();

        level.dig(PlayerId::P1, 0, &mut events);
        level.handle_move(PlayerId::P1, Dir::Right);
        let d = level.digger(PlayerId::P1);
        assert!(events.is_empty());
        assert_eq!(d.gems, 0);
        assert!(!d.board.is_revealed(0));
        assert_eq!(d.cursor, 0);

        // the other player is unaffected
        level.handle_move(PlayerId::P2, Dir::Right);
        assert_eq!(level.digger(PlayerId::P2).cursor, 1);
    }

    #[test]
    fn stun_counts_down_to_zero() {
        let mut level = level();
        let mut events = vec![];
        level.dig(PlayerId::P1, 2, &mut events);

        let mut last = level.digger(PlayerId::P1).stun_ms;
        for _ in 0..20 {
            level.tick();
            let now = level.digger(PlayerId::P1).stun_ms;
            assert_eq!(now, last - 100);
            last = now;
        }
        assert_eq!(last, 0);
        level.tick();
        assert_eq!(level.digger(PlayerId::P1).stun_ms, 0);
        assert_eq!(level.digger(PlayerId::P2).stun_ms, 0);

        level.dig(PlayerId::P1, 0, &mut events);
        assert_eq!(level.digger(PlayerId::P1).gems, 1);
    }

    #[test]
    fn third_gem_wins_and_freezes_the_level() {
        let mut level = level();
        let mut events = vec![];
        level.dig(PlayerId::P1, 0, &mut events);
        level.dig(PlayerId::P1, 1, &mut events);
        assert_eq!(level.winner(), None);
        level.dig(PlayerId::P1, 5, &mut events);
        assert_eq!(level.winner(), Some(PlayerId::P1));
        assert_eq!(level.digger(PlayerId::P1).gems, 3);

        level.dig(PlayerId::P1, 6, &mut events);
        assert_eq!(level.digger(PlayerId::P1).gems, 3);
        assert!(!level.digger(PlayerId::P1).board.is_revealed(6));
    }

    #[test]
    fn cursor_dig_uses_cursor_cell() {
        let mut level = level();
        let mut events = vec![];
        level.handle_move(PlayerId::P1, Dir::Down);
        level.handle_move(PlayerId::P1, Dir::Right);
        assert_eq!(level.digger(PlayerId::P1).cursor, 6);
        level.handle_dig(PlayerId::P1, &mut events);
        assert_eq!(events, vec![GameEvent::GemFound { player: PlayerId::P1, index: 6, gems: 1 }]);
    }

    #[test]
    fn out_of_range_dig_is_ignored() {
        let mut level = level();
        let mut events = vec![];
        level.dig(PlayerId::P2, 25, &mut events);
        assert!(events.is_empty());
        assert_eq!(level.digger(PlayerId::P2).board.revealed_count(), 0);
    }
}

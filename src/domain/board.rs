/// Dig board: a small grid of hidden cells owned by one player.
///
/// Each player gets their own `Board`; reveal state is per board,
/// so nothing one player does is visible on the other side.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::DigConfig;
use super::entity::{Dir, Pos};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DigCell {
    #[default]
    Empty,
    Gem,
    Tnt,
}

#[derive(Clone, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<DigCell>,
    revealed: Vec<bool>,
}

impl Board {
    /// Random board with exactly `gems` gems and `tnt` TNT cells.
    ///
    /// Shuffle-and-slice over all cell indices: the first `gems` indices
    /// become gems, the next `tnt` become TNT. Always terminates and never
    /// overlaps. Counts are clamped to the board size.
    pub fn generate<R: Rng + ?Sized>(rules: &DigConfig, rng: &mut R) -> Self {
        let total = rules.width * rules.height;
        let gems = rules.gems.min(total);
        let tnt = rules.tnt.min(total - gems);
        if gems + tnt < rules.gems + rules.tnt {
            log::warn!(
                "Dig board too small: requested {} gems + {} tnt, only {} cells",
                rules.gems, rules.tnt, total
            );
        }

        let mut order: Vec<usize> = (0..total).collect();
        order.shuffle(rng);

        let mut cells = vec![DigCell::Empty; total];
        for &i in &order[..gems] {
            cells[i] = DigCell::Gem;
        }
        for &i in &order[gems..gems + tnt] {
            cells[i] = DigCell::Tnt;
        }

        Board::from_cells(rules.width, rules.height, cells)
    }

    /// Board with a fixed layout, all cells hidden.
    pub fn from_cells(width: usize, height: usize, cells: Vec<DigCell>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        let revealed = vec![false; cells.len()];
        Board { width, height, cells, revealed }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, index: usize) -> Option<DigCell> {
        self.cells.get(index).copied()
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    #[allow(dead_code)]
    pub fn count(&self, kind: DigCell) -> usize {
        self.cells.iter().filter(|&&c| c == kind).count()
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|&&r| r).count()
    }

    /// Reveal a hidden cell. Returns what was under it, or `None` when the
    /// index is out of range or the cell was already revealed.
    pub fn reveal(&mut self, index: usize) -> Option<DigCell> {
        let slot = self.revealed.get_mut(index)?;
        if *slot {
            return None;
        }
        *slot = true;
        Some(self.cells[index])
    }

    pub fn index_of(&self, pos: Pos) -> usize {
        pos.y * self.width + pos.x
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos::new(index % self.width, index / self.width)
    }

    /// Cursor movement: one cell orthogonally, no wraparound.
    pub fn move_cursor(&self, cursor: usize, dir: Dir) -> usize {
        self.pos_of(cursor)
            .step(dir, self.width, self.height)
            .map(|p| self.index_of(p))
            .unwrap_or(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn board_from(rows: &[&str]) -> Board {
        let height = rows.len();
        let width = rows[0].len();
        let cells = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|c| match c {
                'g' => DigCell::Gem,
                't' => DigCell::Tnt,
                _ => DigCell::Empty,
            })
            .collect();
        Board::from_cells(width, height, cells)
    }

    #[test]
    fn generated_boards_have_exact_counts() {
        let rules = DigConfig::default();
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let board = Board::generate(&rules, &mut rng);
            assert_eq!(board.len(), 25);
            assert_eq!(board.count(DigCell::Gem), 5);
            assert_eq!(board.count(DigCell::Tnt), 7);
            assert_eq!(board.count(DigCell::Empty), 13);
            assert_eq!(board.revealed_count(), 0);
        }
    }

    #[test]
    fn same_seed_same_board() {
        let rules = DigConfig::default();
        let a = Board::generate(&rules, &mut SmallRng::seed_from_u64(7));
        let b = Board::generate(&rules, &mut SmallRng::seed_from_u64(7));
        assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn oversized_counts_are_clamped() {
        let rules = DigConfig { width: 2, height: 2, gems: 3, tnt: 3, ..DigConfig::default() };
        let board = Board::generate(&rules, &mut SmallRng::seed_from_u64(1));
        assert_eq!(board.count(DigCell::Gem), 3);
        assert_eq!(board.count(DigCell::Tnt), 1);
    }

    #[test]
    fn reveal_happens_once() {
        let mut b = board_from(&["g.", "t."]);
        assert_eq!(b.reveal(0), Some(DigCell::Gem));
        assert_eq!(b.reveal(0), None);
        assert!(b.is_revealed(0));
        assert_eq!(b.reveal(2), Some(DigCell::Tnt));
        assert_eq!(b.reveal(99), None);
        assert_eq!(b.revealed_count(), 2);
    }

    #[test]
    fn cursor_does_not_wrap() {
        let b = board_from(&["...", "...", "..."]);
        assert_eq!(b.move_cursor(0, Dir::Left), 0);
        assert_eq!(b.move_cursor(0, Dir::Up), 0);
        assert_eq!(b.move_cursor(2, Dir::Right), 2);
        assert_eq!(b.move_cursor(3, Dir::Left), 3);
        assert_eq!(b.move_cursor(8, Dir::Down), 8);
        assert_eq!(b.move_cursor(4, Dir::Up), 1);
        assert_eq!(b.move_cursor(4, Dir::Right), 5);
    }
}

/// MatchState: the orchestrator of a two-player match.
///
/// ## Phases
///
///   Menu -> Maze -> Portal -> Dig -> Final -> (reset) -> Menu
///
/// Exactly one level is alive while playing. It is owned by `Stage::Playing`
/// and dropped the moment it reports a winner, so a finished level keeps
/// no state around and its stun countdown can no longer be ticked.
///
/// ## Templates
///
/// Level maps are parsed and validated once in `new()`. Activating the maze
/// or the portal level clones a pristine template; the dig level generates
/// two fresh boards from the match RNG.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::{DigConfig, GameConfig};
use crate::domain::entity::{PerPlayer, PlayerId};
use super::dig::DigLevel;
use super::event::GameEvent;
use super::level::{self, MapError};
use super::maze::MazeLevel;
use super::portal::PortalLevel;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Maze,
    Portal,
    Dig,
    Final,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelKind {
    Maze,
    Portal,
    Dig,
}

impl LevelKind {
    pub fn title(self) -> &'static str {
        match self {
            LevelKind::Maze => "1. LABYRINTH",
            LevelKind::Portal => "2. PORTAL",
            LevelKind::Dig => "3. TNT FIELD",
        }
    }

    /// Fixed level order.
    pub fn next(self) -> Option<LevelKind> {
        match self {
            LevelKind::Maze => Some(LevelKind::Portal),
            LevelKind::Portal => Some(LevelKind::Dig),
            LevelKind::Dig => None,
        }
    }

    fn phase(self) -> Phase {
        match self {
            LevelKind::Maze => Phase::Maze,
            LevelKind::Portal => Phase::Portal,
            LevelKind::Dig => Phase::Dig,
        }
    }
}

#[derive(Clone, Debug)]
pub enum ActiveLevel {
    Maze(MazeLevel),
    Portal(PortalLevel),
    Dig(DigLevel),
}

impl ActiveLevel {
    pub fn kind(&self) -> LevelKind {
        match self {
            ActiveLevel::Maze(_) => LevelKind::Maze,
            ActiveLevel::Portal(_) => LevelKind::Portal,
            ActiveLevel::Dig(_) => LevelKind::Dig,
        }
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            ActiveLevel::Maze(l) => l.winner(),
            ActiveLevel::Portal(l) => l.winner(),
            ActiveLevel::Dig(l) => l.winner(),
        }
    }
}

#[derive(Clone, Debug)]
enum Stage {
    Menu,
    Playing(ActiveLevel),
    Final { winner: Option<PlayerId> },
}

/// Read-only view for the presentation layer.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub scores: PerPlayer<u32>,
    /// Overall winner; only meaningful in `Phase::Final`. `None` = tie.
    pub winner: Option<PlayerId>,
    pub level: Option<&'a ActiveLevel>,
}

pub struct MatchState {
    maze: MazeLevel,
    portal: PortalLevel,
    dig_rules: DigConfig,
    rng: SmallRng,
    stage: Stage,
    scores: PerPlayer<u32>,
}

/// Strictly greater score wins; equal scores have no winner.
pub fn overall_winner(scores: &PerPlayer<u32>) -> Option<PlayerId> {
    use std::cmp::Ordering;
    match scores.p1.cmp(&scores.p2) {
        Ordering::Greater => Some(PlayerId::P1),
        Ordering::Less => Some(PlayerId::P2),
        Ordering::Equal => None,
    }
}

// ── Construction ──

impl MatchState {
    /// Validates every built-in map. A `MapError` here is a build defect.
    pub fn new(config: &GameConfig) -> Result<Self, MapError> {
        let maze = MazeLevel::new(level::maze_map()?);
        let portal = PortalLevel::new(level::portal_map()?)?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(MatchState {
            maze,
            portal,
            dig_rules: config.dig.clone(),
            rng,
            stage: Stage::Menu,
            scores: PerPlayer::default(),
        })
    }
}

// ── Queries ──

impl MatchState {
    pub fn phase(&self) -> Phase {
        match &self.stage {
            Stage::Menu => Phase::Menu,
            Stage::Playing(level) => level.kind().phase(),
            Stage::Final { .. } => Phase::Final,
        }
    }

    pub fn scores(&self) -> PerPlayer<u32> {
        self.scores
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let (level, winner) = match &self.stage {
            Stage::Playing(level) => (Some(level), None),
            Stage::Final { winner } => (None, *winner),
            Stage::Menu => (None, None),
        };
        Snapshot { phase: self.phase(), scores: self.scores, winner, level }
    }

    pub(crate) fn active_level_mut(&mut self) -> Option<&mut ActiveLevel> {
        match &mut self.stage {
            Stage::Playing(level) => Some(level),
            _ => None,
        }
    }
}

// ── Transitions ──

impl MatchState {
    /// Zero the scores and enter the first level. Only from the menu or
    /// the final screen; ignored mid-match.
    pub fn start(&mut self) {
        if matches!(self.stage, Stage::Playing(_)) {
            return;
        }
        self.scores = PerPlayer::default();
        self.stage = Stage::Playing(self.activate(LevelKind::Maze));
        log::info!("match started");
    }

    /// Back to the menu with both scores zeroed. Drops any running level.
    pub fn reset(&mut self) {
        self.scores = PerPlayer::default();
        self.stage = Stage::Menu;
        log::info!("match reset");
    }

    /// The active level reported `winner`: score it and move on.
    pub(crate) fn complete_level(&mut self, winner: PlayerId, events: &mut Vec<GameEvent>) {
        let kind = match &self.stage {
            Stage::Playing(level) => level.kind(),
            _ => return,
        };

        self.scores[winner] += 1;
        events.push(GameEvent::LevelWon { level: kind, player: winner });
        log::info!(
            "{} won by {:?}, score {}-{}",
            kind.title(), winner, self.scores.p1, self.scores.p2
        );

        self.stage = match kind.next() {
            Some(next) => Stage::Playing(self.activate(next)),
            None => {
                let overall = overall_winner(&self.scores);
                events.push(GameEvent::MatchFinished { winner: overall });
                log::info!("match finished, winner {:?}", overall);
                Stage::Final { winner: overall }
            }
        };
    }

    fn activate(&mut self, kind: LevelKind) -> ActiveLevel {
        match kind {
            LevelKind::Maze => ActiveLevel::Maze(self.maze.clone()),
            LevelKind::Portal => ActiveLevel::Portal(self.portal.clone()),
            LevelKind::Dig => ActiveLevel::Dig(DigLevel::new(self.dig_rules.clone(), &mut self.rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PlayerId::*;

    fn seeded() -> MatchState {
        let config = GameConfig { seed: Some(11), ..GameConfig::default() };
        MatchState::new(&config).unwrap()
    }

    fn play_out(m: &mut MatchState, winners: &[PlayerId]) -> Vec<GameEvent> {
        let mut events = vec![];
        for &w in winners {
            m.complete_level(w, &mut events);
        }
        events
    }

    #[test]
    fn starts_in_menu_with_nothing_active() {
        let m = seeded();
        let snap = m.snapshot();
        assert_eq!(snap.phase, Phase::Menu);
        assert!(snap.level.is_none());
        assert_eq!(snap.scores, PerPlayer::new(0, 0));
    }

    #[test]
    fn levels_advance_in_fixed_order() {
        let mut m = seeded();
        m.start();
        assert_eq!(m.phase(), Phase::Maze);
        play_out(&mut m, &[P1]);
        assert_eq!(m.phase(), Phase::Portal);
        play_out(&mut m, &[P2]);
        assert_eq!(m.phase(), Phase::Dig);
        assert!(matches!(m.snapshot().level, Some(ActiveLevel::Dig(_))));
        play_out(&mut m, &[P2]);
        assert_eq!(m.phase(), Phase::Final);
        assert!(m.snapshot().level.is_none());
    }

    #[test]
    fn two_wins_beat_one() {
        let mut m = seeded();
        m.start();
        let events = play_out(&mut m, &[P1, P1, P2]);
        assert_eq!(m.scores(), PerPlayer::new(2, 1));
        assert_eq!(m.snapshot().winner, Some(P1));
        assert_eq!(events.last(), Some(&GameEvent::MatchFinished { winner: Some(P1) }));
        assert_eq!(
            events[0],
            GameEvent::LevelWon { level: LevelKind::Maze, player: P1 }
        );
    }

    #[test]
    fn equal_scores_have_no_winner() {
        assert_eq!(overall_winner(&PerPlayer::new(1, 1)), None);
        assert_eq!(overall_winner(&PerPlayer::new(0, 0)), None);
        assert_eq!(overall_winner(&PerPlayer::new(1, 2)), Some(P2));
        assert_eq!(overall_winner(&PerPlayer::new(3, 0)), Some(P1));
    }

    #[test]
    fn reset_returns_to_menu_and_zeroes() {
        let mut m = seeded();
        m.start();
        play_out(&mut m, &[P2, P2, P2]);
        assert_eq!(m.scores(), PerPlayer::new(0, 3));
        m.reset();
        assert_eq!(m.phase(), Phase::Menu);
        assert_eq!(m.scores(), PerPlayer::new(0, 0));
        assert_eq!(m.snapshot().winner, None);
    }

    #[test]
    fn start_is_ignored_mid_match() {
        let mut m = seeded();
        m.start();
        play_out(&mut m, &[P1]);
        m.start();
        assert_eq!(m.phase(), Phase::Portal);
        assert_eq!(m.scores(), PerPlayer::new(1, 0));
    }

    #[test]
    fn level_win_outside_play_is_ignored() {
        let mut m = seeded();
        let events = play_out(&mut m, &[P1]);
        assert!(events.is_empty());
        assert_eq!(m.scores(), PerPlayer::new(0, 0));
    }

    #[test]
    fn replayed_maze_starts_fresh() {
        let mut m = seeded();
        m.start();
        if let Some(ActiveLevel::Maze(level)) = m.active_level_mut() {
            let mut events = vec![];
            level.handle_move(P1, crate::domain::entity::Dir::Down, &mut events);
        }
        m.reset();
        m.start();
        match m.snapshot().level {
            Some(ActiveLevel::Maze(level)) => {
                assert_eq!(level.runner(P1).pos, level.map().spawns.p1);
            }
            other => panic!("expected maze, got {other:?}"),
        }
    }
}

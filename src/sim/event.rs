/// Events emitted while handling input or a tick.
/// The presentation layer consumes these for messages; the log gets all of them.

use crate::domain::entity::{PlayerId, Pos};
use crate::domain::tile::KeyColor;
use super::world::LevelKind;

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    KeyCollected { player: PlayerId, key: KeyColor },
    /// Stepped onto the exit without every key.
    ExitLocked { player: PlayerId, keys: usize },
    Teleported { player: PlayerId, from: Pos, to: Pos },
    GemFound { player: PlayerId, index: usize, gems: u32 },
    TntTriggered { player: PlayerId, index: usize },
    LevelWon { level: LevelKind, player: PlayerId },
    MatchFinished { winner: Option<PlayerId> },
}

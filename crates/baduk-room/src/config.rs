//! Room configuration and state machine.

use baduk_countdown::CountdownConfig;
use baduk_session::SessionConfig;

/// Maximum number of clients holding the Player role in one room.
pub const MAX_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a manager creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Settings for the game session each room owns.
    pub session: SessionConfig,

    /// Color negotiation countdown.
    pub countdown: CountdownConfig,

    /// Countdown value broadcast when a negotiation or game is interrupted
    /// because a player left. Clients show it until the room refills.
    pub reset_countdown: u32,

    /// Capacity of each room actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            countdown: CountdownConfig::default(),
            reset_countdown: 10,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
///            2nd player joins            countdown expires
///  Waiting ───────────────→ SelectingColors ───────────→ Playing
///     ↑                          │                          │
///     └──────── player leaves ───┴──────────────────────────┘
/// ```
///
/// There is no terminal state. A room is torn down by its manager when the
/// last client leaves, whatever state it is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    /// Fewer than two players.
    Waiting,
    /// Two players, countdown running, color preferences accepted.
    SelectingColors,
    /// Two players with opposite colors; moves accepted.
    Playing,
}

impl RoomState {
    /// Returns `true` if moving from `self` to `target` is a legal step.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::SelectingColors)
                | (Self::SelectingColors, Self::Playing)
                | (Self::SelectingColors, Self::Waiting)
                | (Self::Playing, Self::Waiting)
        )
    }

    /// Returns `true` if players may submit color preferences.
    pub fn accepts_color_choices(self) -> bool {
        matches!(self, Self::SelectingColors)
    }

    /// Returns `true` if stone placements are admitted.
    pub fn accepts_moves(self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::SelectingColors => write!(f, "selecting_colors"),
            Self::Playing => write!(f, "playing"),
        }
    }
}

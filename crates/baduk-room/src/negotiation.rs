//! Color negotiation: the countdown task and final color resolution.
//!
//! The countdown runs on its own task so the room actor keeps serving
//! commands while it waits. The task never touches room state; it only
//! sends [`NegotiationEvent`]s tagged with the negotiation's epoch, and the
//! actor drops any event whose epoch is no longer current.

use baduk_countdown::{Countdown, CountdownConfig};
use baduk_protocol::Stone;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Timer event sent from a countdown task to its room actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NegotiationEvent {
    /// `remaining` seconds are left in the window.
    Tick { epoch: u64, remaining: u32 },
    /// The window closed.
    Expired { epoch: u64 },
}

/// Spawns the countdown for negotiation `epoch`.
///
/// The task ends on its own after sending `Expired`, or early if the room
/// actor is gone. Aborting the returned handle cancels it.
pub(crate) fn spawn_countdown(
    epoch: u64,
    config: CountdownConfig,
    events: mpsc::UnboundedSender<NegotiationEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut countdown = Countdown::new(config);
        while let Some(remaining) = countdown.next_tick().await {
            if events
                .send(NegotiationEvent::Tick { epoch, remaining })
                .is_err()
            {
                return;
            }
        }
        let _ = events.send(NegotiationEvent::Expired { epoch });
    })
}

/// Decides the final colors of the first and second player from their
/// stated preferences.
///
/// - Different preferences are both honored.
/// - A single preference is honored and the other player gets the opposite.
/// - No preference, or the same preference twice, is settled by a coin flip
///   for the second player; the first player gets the opposite.
///
/// The result is always one black and one white.
pub fn resolve_colors<G: Rng>(
    first: Option<Stone>,
    second: Option<Stone>,
    rng: &mut G,
) -> (Stone, Stone) {
    match (first, second) {
        (Some(a), Some(b)) if a != b => (a, b),
        (Some(a), None) => (a, a.opposite()),
        (None, Some(b)) => (b.opposite(), b),
        _ => {
            let second = if rng.random_bool(0.5) {
                Stone::Black
            } else {
                Stone::White
            };
            (second.opposite(), second)
        }
    }
}

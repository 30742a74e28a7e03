//! Messages understood by a game actor.

use tokio::sync::oneshot;

use crate::game::entities::{
    CancelOutcome, Chips, GameSnapshot, MoveAction, MoveOutcome, PlayerId,
};
use crate::game::errors::GameResult;

/// One request to a game, paired with the channel its answer goes back
/// on. Requests are applied strictly in the order the actor receives
/// them.
#[derive(Debug)]
pub enum GameMessage {
    Initialize {
        response: oneshot::Sender<GameResult<GameSnapshot>>,
    },

    SubmitMove {
        player_id: PlayerId,
        action: MoveAction,
        amount: Option<Chips>,
        response: oneshot::Sender<GameResult<MoveOutcome>>,
    },

    Cancel {
        response: oneshot::Sender<GameResult<CancelOutcome>>,
    },

    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<GameResult<MoveOutcome>>,
    },

    GetSnapshot {
        response: oneshot::Sender<GameSnapshot>,
    },
}

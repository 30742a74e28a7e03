//! Per-game actor: the single-writer serialization point.
//!
//! Each active game is owned by exactly one actor task. Every state
//! transition and ledger call for that game goes through the actor's
//! inbox, so moves are applied in admission order and cancellation can
//! never interleave with move application.

use tokio::sync::{mpsc, oneshot};

use super::messages::GameMessage;
use crate::game::GameEngine;
use crate::game::entities::{
    CancelOutcome, Chips, Game, GameId, GameSnapshot, MoveAction, MoveOutcome, PlayerId,
};
use crate::game::errors::{GameError, GameResult};

const INBOX_CAPACITY: usize = 64;

/// Cloneable handle for sending requests to a game actor.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameMessage>,
    game_id: GameId,
}

impl GameHandle {
    #[must_use]
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    async fn send(&self, message: GameMessage) -> GameResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::GameClosed(self.game_id))
    }

    pub async fn initialize(&self) -> GameResult<GameSnapshot> {
        let (response, rx) = oneshot::channel();
        self.send(GameMessage::Initialize { response }).await?;
        rx.await.map_err(|_| GameError::GameClosed(self.game_id))?
    }

    pub async fn submit_move(
        &self,
        player_id: PlayerId,
        action: MoveAction,
        amount: Option<Chips>,
    ) -> GameResult<MoveOutcome> {
        let (response, rx) = oneshot::channel();
        self.send(GameMessage::SubmitMove {
            player_id,
            action,
            amount,
            response,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameClosed(self.game_id))?
    }

    pub async fn cancel(&self) -> GameResult<CancelOutcome> {
        let (response, rx) = oneshot::channel();
        self.send(GameMessage::Cancel { response }).await?;
        rx.await.map_err(|_| GameError::GameClosed(self.game_id))?
    }

    pub async fn leave(&self, player_id: PlayerId) -> GameResult<MoveOutcome> {
        let (response, rx) = oneshot::channel();
        self.send(GameMessage::Leave {
            player_id,
            response,
        })
        .await?;
        rx.await.map_err(|_| GameError::GameClosed(self.game_id))?
    }

    pub async fn snapshot(&self) -> GameResult<GameSnapshot> {
        let (response, rx) = oneshot::channel();
        self.send(GameMessage::GetSnapshot { response }).await?;
        rx.await.map_err(|_| GameError::GameClosed(self.game_id))
    }
}

/// Actor owning one game for its whole lifetime.
pub struct GameActor {
    game: Game,
    engine: GameEngine,
    inbox: mpsc::Receiver<GameMessage>,
}

impl GameActor {
    #[must_use]
    pub fn new(game: Game, engine: GameEngine) -> (Self, GameHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = GameHandle {
            sender,
            game_id: game.id,
        };
        (
            Self {
                game,
                engine,
                inbox,
            },
            handle,
        )
    }

    /// Drain the inbox until the game reaches a terminal state. Senders
    /// whose requests arrive afterwards see the channel closed and get
    /// `GameClosed`.
    pub async fn run(mut self) {
        log::info!("game {}: actor started", self.game.id);

        while let Some(message) = self.inbox.recv().await {
            match message {
                GameMessage::Initialize { response } => {
                    let result = self.engine.initialize_game(&mut self.game).await;
                    let _ = response.send(result);
                }

                GameMessage::SubmitMove {
                    player_id,
                    action,
                    amount,
                    response,
                } => {
                    let result = self
                        .engine
                        .submit_move(&mut self.game, player_id, action, amount)
                        .await;
                    let _ = response.send(result);
                }

                GameMessage::Cancel { response } => {
                    let result = self.engine.cancel_game(&mut self.game).await;
                    let _ = response.send(result);
                }

                GameMessage::Leave {
                    player_id,
                    response,
                } => {
                    let result = self.engine.leave_game(&mut self.game, player_id).await;
                    let _ = response.send(result);
                }

                GameMessage::GetSnapshot { response } => {
                    let _ = response.send(self.game.snapshot());
                }
            }

            if self.game.status.is_terminal() {
                break;
            }
        }

        log::info!("game {}: actor stopped ({})", self.game.id, self.game.status);
    }
}

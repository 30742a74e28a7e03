//! Registry of active game actors.
//!
//! Explicit per-engine-instance state: the registry lives and dies with
//! the process that owns it, and nothing here is a process-wide global.
//! Scaling out means putting an external keyed store behind this same
//! interface.

use std::collections::HashMap;
use tokio::sync::RwLock;

use super::actor::{GameActor, GameHandle};
use crate::game::GameEngine;
use crate::game::config::GameConfig;
use crate::game::entities::{Game, GameId, PlayerId, RoomId};
use crate::game::errors::{GameError, GameResult};

pub struct TableManager {
    engine: GameEngine,
    games: RwLock<HashMap<GameId, GameHandle>>,
}

impl TableManager {
    #[must_use]
    pub fn new(engine: GameEngine) -> Self {
        Self {
            engine,
            games: RwLock::new(HashMap::new()),
        }
    }

    /// Create a game, seat the given players, and spawn its actor. The
    /// game starts in `waiting`; call `initialize` on the handle to
    /// begin the hand.
    pub async fn create_game(
        &self,
        room_id: RoomId,
        config: GameConfig,
        players: &[PlayerId],
    ) -> GameResult<GameHandle> {
        config.validate()?;
        let mut game = Game::new(room_id, config);
        for player_id in players {
            if !game.add_player(*player_id) {
                return Err(GameError::InvalidMove(format!(
                    "cannot seat player {player_id}"
                )));
            }
        }

        let game_id = game.id;
        let (actor, handle) = GameActor::new(game, self.engine.clone());
        self.games.write().await.insert(game_id, handle.clone());
        tokio::spawn(actor.run());
        log::info!("room {room_id}: spawned game {game_id}");
        Ok(handle)
    }

    pub async fn handle(&self, game_id: GameId) -> GameResult<GameHandle> {
        let games = self.games.read().await;
        games
            .get(&game_id)
            .cloned()
            .ok_or(GameError::GameNotFound(game_id))
    }

    /// Drop a terminal game from the registry. The actor exits on its
    /// own once its game is terminal; this only forgets the handle.
    pub async fn remove(&self, game_id: GameId) -> bool {
        self.games.write().await.remove(&game_id).is_some()
    }

    pub async fn active_count(&self) -> usize {
        self.games.read().await.len()
    }
}

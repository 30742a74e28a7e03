//! Per-player action pacing.
//!
//! Tracks, per (game, player), the earliest instant that player may act
//! again. Purely in-memory and checked lazily against the clock before
//! every action; there is no background sweeper. Owned by the engine
//! instance, not by a process-wide global.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::game::entities::{GameId, MoveAction, PlayerId};

/// Cooldown durations. Quick actions (fold/check) carry a shorter
/// cooldown than monetary ones (bet/raise/call); the post-game cooldown
/// is the long one applied to every participant when a hand ends.
#[derive(Clone, Debug)]
pub struct CooldownConfig {
    pub bet_secs: u64,
    pub check_secs: u64,
    /// Fallback for anything without a specific duration.
    pub default_secs: u64,
    pub post_game_secs: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            bet_secs: std::env::var("CARDROOM_BET_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            check_secs: std::env::var("CARDROOM_CHECK_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            default_secs: std::env::var("CARDROOM_DEFAULT_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            post_game_secs: std::env::var("CARDROOM_GAME_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }
}

impl CooldownConfig {
    /// Cooldown applied after one specific action.
    #[must_use]
    pub fn action_duration(&self, action: MoveAction) -> Duration {
        let secs = match action {
            MoveAction::Bet | MoveAction::Raise | MoveAction::Call => self.bet_secs,
            MoveAction::Check | MoveAction::Fold => self.check_secs,
        };
        Duration::seconds(secs as i64)
    }

    #[must_use]
    pub fn default_duration(&self) -> Duration {
        Duration::seconds(self.default_secs as i64)
    }

    #[must_use]
    pub fn post_game_duration(&self) -> Duration {
        Duration::seconds(self.post_game_secs as i64)
    }
}

/// In-memory cooldown store keyed by (game, player).
#[derive(Debug)]
pub struct CooldownTracker {
    config: CooldownConfig,
    cooldowns: RwLock<HashMap<(GameId, PlayerId), DateTime<Utc>>>,
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CooldownTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CooldownConfig::default())
    }

    #[must_use]
    pub fn with_config(config: CooldownConfig) -> Self {
        Self {
            config,
            cooldowns: RwLock::new(HashMap::new()),
        }
    }

    /// Start (or restart) a cooldown. Last write wins; durations never
    /// stack.
    pub async fn start(&self, game_id: GameId, player_id: PlayerId, duration: Duration) {
        let mut cooldowns = self.cooldowns.write().await;
        cooldowns.insert((game_id, player_id), Utc::now() + duration);
    }

    /// Start the cooldown that follows one applied action.
    pub async fn start_action(&self, game_id: GameId, player_id: PlayerId, action: MoveAction) {
        self.start(game_id, player_id, self.config.action_duration(action))
            .await;
    }

    /// Start the longer cooldown that follows the end of a hand.
    pub async fn start_post_game(&self, game_id: GameId, player_id: PlayerId) {
        self.start(game_id, player_id, self.config.post_game_duration())
            .await;
    }

    pub async fn is_active(&self, game_id: GameId, player_id: PlayerId) -> bool {
        let cooldowns = self.cooldowns.read().await;
        cooldowns
            .get(&(game_id, player_id))
            .is_some_and(|expiry| Utc::now() < *expiry)
    }

    /// Remaining cooldown, or `None` when the player is free to act.
    pub async fn remaining(&self, game_id: GameId, player_id: PlayerId) -> Option<Duration> {
        let cooldowns = self.cooldowns.read().await;
        let expiry = cooldowns.get(&(game_id, player_id))?;
        let remaining = *expiry - Utc::now();
        (remaining > Duration::zero()).then_some(remaining)
    }

    /// Longest remaining cooldown for a player across all games. Gates
    /// entry into a new hand while the post-game cooldown from the last
    /// one is still running.
    pub async fn remaining_for_player(&self, player_id: PlayerId) -> Option<Duration> {
        let cooldowns = self.cooldowns.read().await;
        let now = Utc::now();
        cooldowns
            .iter()
            .filter(|((_, p), _)| *p == player_id)
            .map(|(_, expiry)| *expiry - now)
            .filter(|remaining| *remaining > Duration::zero())
            .max()
    }

    pub async fn clear(&self, game_id: GameId, player_id: PlayerId) {
        let mut cooldowns = self.cooldowns.write().await;
        cooldowns.remove(&(game_id, player_id));
    }

    /// Clear every cooldown belonging to a game.
    pub async fn clear_game(&self, game_id: GameId) {
        let mut cooldowns = self.cooldowns.write().await;
        cooldowns.retain(|(g, _), _| *g != game_id);
    }

    /// A hand ended: every participant gets the post-game cooldown.
    pub async fn handle_game_end(&self, game_id: GameId, participants: &[PlayerId]) {
        let expiry = Utc::now() + self.config.post_game_duration();
        let mut cooldowns = self.cooldowns.write().await;
        for player_id in participants {
            cooldowns.insert((game_id, *player_id), expiry);
        }
    }

    /// A player left. Leaving mid-hand is treated like losing and incurs
    /// the post-game cooldown; leaving before the hand starts clears any
    /// pending cooldown instead.
    pub async fn handle_player_leave(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        hand_in_progress: bool,
    ) {
        if hand_in_progress {
            self.start_post_game(game_id, player_id).await;
        } else {
            self.clear(game_id, player_id).await;
        }
    }
}

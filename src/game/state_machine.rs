//! Betting state machine: game lifecycle, turn order, move validation,
//! pot accumulation, round advancement, and showdown resolution.
//!
//! All monetary effects go through the ledger; pacing goes through the
//! cooldown tracker. Callers must serialize access per game (see the
//! `table` module): these methods take `&mut Game` and assume they are
//! the only writer.

use chrono::Utc;
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::constants::HOLE_CARDS;
use super::entities::{
    BettingRound, CancelOutcome, Card, Chips, Deck, Game, GameSnapshot, GameStatus, LastAction,
    MoveAction, MoveOutcome, PlayerId, PlayerStatus, RefundReceipt, WinnerPayout,
};
use super::errors::{GameError, GameResult};
use super::eval;
use crate::cooldown::CooldownTracker;
use crate::ledger::LedgerManager;

/// The orchestrator. Owns no game data itself; it drives `Game` records
/// through their lifecycle against the shared ledger and cooldown store.
#[derive(Clone)]
pub struct GameEngine {
    ledger: Arc<LedgerManager>,
    cooldowns: Arc<CooldownTracker>,
}

impl GameEngine {
    #[must_use]
    pub fn new(ledger: Arc<LedgerManager>, cooldowns: Arc<CooldownTracker>) -> Self {
        Self { ledger, cooldowns }
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<LedgerManager> {
        &self.ledger
    }

    #[must_use]
    pub fn cooldowns(&self) -> &Arc<CooldownTracker> {
        &self.cooldowns
    }

    /// Take a game from `Waiting` through `Starting` into `InProgress`:
    /// reset per-hand state, deal hole cards, post blinds, and hand the
    /// turn to the player after the big blind.
    ///
    /// A blind that cannot be posted refuses the start: any posted blind
    /// is refunded and the game returns to `Waiting`.
    pub async fn initialize_game(&self, game: &mut Game) -> GameResult<GameSnapshot> {
        if game.status != GameStatus::Waiting {
            return Err(GameError::IllegalTransition {
                from: game.status,
                to: GameStatus::Starting,
            });
        }
        game.config.validate()?;
        if game.players.len() < 2 {
            return Err(GameError::InvalidMove("need at least 2 players".to_string()));
        }
        for player_id in &game.players {
            if let Some(remaining) = self.cooldowns.remaining_for_player(*player_id).await {
                return Err(GameError::CooldownActive {
                    player_id: *player_id,
                    remaining_secs: remaining.num_seconds().max(1),
                });
            }
        }

        game.status = GameStatus::Starting;
        info!(
            "game {}: starting with {} players",
            game.id,
            game.players.len()
        );

        game.pot = 0;
        game.paid_out = 0;
        game.round = BettingRound::PreFlop;
        game.community.clear();
        game.deck = Deck::shuffled();
        game.hole_cards.clear();
        game.acted_this_round.clear();
        game.last_action = None;
        for player_id in &game.players {
            game.player_status.insert(*player_id, PlayerStatus::Active);
            game.round_bets.insert(*player_id, 0);
            game.hand_bets.insert(*player_id, 0);
        }

        for _ in 0..HOLE_CARDS {
            for player_id in game.players.clone() {
                let card = self.deal_card(game)?;
                game.hole_cards.entry(player_id).or_default().push(card);
            }
        }

        let small_blind_player = game.players[0];
        let big_blind_player = game.players[1];
        let small_blind = game.config.small_blind();
        let big_blind = game.config.big_blind();

        if small_blind > 0 {
            match self
                .ledger
                .blind(small_blind_player, game.id, small_blind, "Small")
                .await
            {
                Ok(balance) => self.post_to_pot(game, small_blind_player, small_blind, balance),
                Err(err) => {
                    self.abort_start(game);
                    return Err(err.into());
                }
            }
        }

        match self
            .ledger
            .blind(big_blind_player, game.id, big_blind, "Big")
            .await
        {
            Ok(balance) => self.post_to_pot(game, big_blind_player, big_blind, balance),
            Err(err) => {
                if small_blind > 0 {
                    self.ledger
                        .refund(
                            small_blind_player,
                            game.id,
                            small_blind,
                            "Hand failed to start",
                        )
                        .await?;
                }
                self.abort_start(game);
                return Err(err.into());
            }
        }

        game.current_player = Some(game.players[2 % game.players.len()]);
        game.status = GameStatus::InProgress;
        game.started_at = Some(Utc::now());
        self.check_pot(game)?;
        info!(
            "game {}: in progress, blinds {}/{} posted, first to act {:?}",
            game.id, small_blind, big_blind, game.current_player
        );
        Ok(game.snapshot())
    }

    /// Validate and apply one player action, then advance turn and round
    /// state. Any rule violation returns `InvalidMove` and leaves the
    /// game untouched.
    pub async fn submit_move(
        &self,
        game: &mut Game,
        player_id: PlayerId,
        action: MoveAction,
        amount: Option<Chips>,
    ) -> GameResult<MoveOutcome> {
        if game.status != GameStatus::InProgress {
            return Err(GameError::InvalidMove(format!("game is {}", game.status)));
        }
        if !game.is_participant(player_id) {
            return Err(GameError::PlayerNotSeated(player_id));
        }
        if game.player_status.get(&player_id) != Some(&PlayerStatus::Active) {
            return Err(GameError::InvalidMove(
                "player is not active in this hand".to_string(),
            ));
        }
        if game.current_player != Some(player_id) {
            return Err(GameError::InvalidMove("not your turn".to_string()));
        }
        if let Some(remaining) = self.cooldowns.remaining(game.id, player_id).await {
            return Err(GameError::CooldownActive {
                player_id,
                remaining_secs: remaining.num_seconds().max(1),
            });
        }

        let round_max = game.round_max();
        let posted = game.round_bet(player_id);

        // Work out the debit this action requires and the player's new
        // round total. Amounts for call/check/fold are ignored.
        let (debit, new_round_total) = match action {
            MoveAction::Bet => {
                if round_max > 0 {
                    return Err(GameError::InvalidMove(
                        "a bet is already outstanding, raise or call instead".to_string(),
                    ));
                }
                let amount = amount.ok_or_else(|| {
                    GameError::InvalidMove("bet requires an amount".to_string())
                })?;
                if amount < game.config.min_bet {
                    return Err(GameError::InvalidMove(format!(
                        "minimum bet is {}",
                        game.config.min_bet
                    )));
                }
                if amount > game.config.max_bet {
                    return Err(GameError::InvalidMove(format!(
                        "maximum bet is {}",
                        game.config.max_bet
                    )));
                }
                (amount, amount)
            }
            MoveAction::Raise => {
                if round_max == 0 {
                    return Err(GameError::InvalidMove(
                        "no bet to raise, bet instead".to_string(),
                    ));
                }
                let amount = amount.ok_or_else(|| {
                    GameError::InvalidMove("raise requires an amount".to_string())
                })?;
                if amount <= round_max {
                    return Err(GameError::InvalidMove(format!(
                        "raise must exceed the current bet of {round_max}"
                    )));
                }
                if amount > game.config.max_bet {
                    return Err(GameError::InvalidMove(format!(
                        "maximum bet is {}",
                        game.config.max_bet
                    )));
                }
                (amount - posted, amount)
            }
            MoveAction::Call => {
                if round_max == 0 {
                    return Err(GameError::InvalidMove(
                        "no bet to call, check instead".to_string(),
                    ));
                }
                let owed = round_max - posted;
                if owed == 0 {
                    return Err(GameError::InvalidMove(
                        "nothing to call, check instead".to_string(),
                    ));
                }
                (owed, round_max)
            }
            MoveAction::Check => {
                if posted < round_max {
                    return Err(GameError::InvalidMove(
                        "cannot check, call or fold instead".to_string(),
                    ));
                }
                (0, posted)
            }
            MoveAction::Fold => (0, posted),
        };

        if debit > 0 {
            // The ledger enforces the balance floor; a rejection here
            // leaves the game untouched.
            let balance = self.ledger.bet(player_id, game.id, debit).await?;
            self.post_to_pot(game, player_id, debit, balance);
            debug_assert_eq!(game.round_bet(player_id), new_round_total);
        }
        if action == MoveAction::Fold {
            game.player_status.insert(player_id, PlayerStatus::Folded);
        }
        game.acted_this_round.insert(player_id);
        game.last_action = Some(LastAction {
            player_id,
            action,
            amount: debit,
            at: Utc::now(),
        });
        self.cooldowns.start_action(game.id, player_id, action).await;
        self.check_pot(game)?;
        debug!(
            "game {}: player {player_id} {action} ({debit} chips), pot {}",
            game.id, game.pot
        );

        let winners = self.advance_after_action(game, player_id, true).await?;
        Ok(MoveOutcome {
            snapshot: game.snapshot(),
            winners,
        })
    }

    /// Cancel a game that has not begun play. Refunds every nonzero
    /// posted bet, zeroes the pot, and clears the game's cooldowns.
    /// Rejected once the game is `InProgress`.
    pub async fn cancel_game(&self, game: &mut Game) -> GameResult<CancelOutcome> {
        if !matches!(game.status, GameStatus::Waiting | GameStatus::Starting) {
            return Err(GameError::IllegalTransition {
                from: game.status,
                to: GameStatus::Cancelled,
            });
        }

        let bets: Vec<(PlayerId, Chips)> = game
            .players
            .iter()
            .map(|p| (*p, game.hand_bets.get(p).copied().unwrap_or(0)))
            .collect();
        let refunds = self
            .ledger
            .refund_all(game.id, &bets, "Game cancelled")
            .await?;

        for (player_id, _) in &refunds {
            game.hand_bets.insert(*player_id, 0);
            game.round_bets.insert(*player_id, 0);
        }
        game.pot = 0;
        game.status = GameStatus::Cancelled;
        game.current_player = None;
        game.ended_at = Some(Utc::now());
        self.cooldowns.clear_game(game.id).await;
        self.check_pot(game)?;
        info!("game {}: cancelled, {} refunds issued", game.id, refunds.len());

        Ok(CancelOutcome {
            status: game.status,
            refunds: refunds
                .into_iter()
                .map(|(player_id, amount)| RefundReceipt { player_id, amount })
                .collect(),
        })
    }

    /// A player leaves. Before the hand starts they are simply unseated
    /// and any pending cooldown is cleared; mid-hand it is treated
    /// exactly like folding and losing, post-game cooldown included.
    pub async fn leave_game(
        &self,
        game: &mut Game,
        player_id: PlayerId,
    ) -> GameResult<MoveOutcome> {
        if !game.is_participant(player_id) {
            return Err(GameError::PlayerNotSeated(player_id));
        }
        match game.status {
            GameStatus::Waiting | GameStatus::Starting => {
                game.remove_player(player_id);
                self.cooldowns
                    .handle_player_leave(game.id, player_id, false)
                    .await;
                Ok(MoveOutcome {
                    snapshot: game.snapshot(),
                    winners: None,
                })
            }
            GameStatus::InProgress => {
                let was_current = game.current_player == Some(player_id);
                game.player_status.insert(player_id, PlayerStatus::Folded);
                game.acted_this_round.insert(player_id);
                game.last_action = Some(LastAction {
                    player_id,
                    action: MoveAction::Fold,
                    amount: 0,
                    at: Utc::now(),
                });
                self.cooldowns
                    .handle_player_leave(game.id, player_id, true)
                    .await;
                info!("game {}: player {player_id} left mid-hand", game.id);

                let winners = self.advance_after_action(game, player_id, was_current).await?;
                Ok(MoveOutcome {
                    snapshot: game.snapshot(),
                    winners,
                })
            }
            status => Err(GameError::InvalidMove(format!("game is {status}"))),
        }
    }

    /// Credit posted chips into the pot and mark the player all-in when
    /// the debit emptied their balance. Round, hand, and pot totals are
    /// always updated together.
    fn post_to_pot(&self, game: &mut Game, player_id: PlayerId, amount: Chips, balance: Chips) {
        *game.round_bets.entry(player_id).or_insert(0) += amount;
        *game.hand_bets.entry(player_id).or_insert(0) += amount;
        game.pot += amount;
        if balance == 0 {
            game.player_status.insert(player_id, PlayerStatus::AllIn);
            info!("game {}: player {player_id} is all-in", game.id);
        }
    }

    /// Roll a failed start back to `Waiting` with clean betting state.
    fn abort_start(&self, game: &mut Game) {
        for player_id in game.players.clone() {
            game.round_bets.insert(player_id, 0);
            game.hand_bets.insert(player_id, 0);
            game.player_status.insert(player_id, PlayerStatus::Active);
        }
        game.pot = 0;
        game.hole_cards.clear();
        game.current_player = None;
        game.status = GameStatus::Waiting;
        info!("game {}: start aborted, back to waiting", game.id);
    }

    /// Post-action bookkeeping shared by moves and mid-hand leaves:
    /// uncontested wins, round completion, otherwise pass the turn.
    async fn advance_after_action(
        &self,
        game: &mut Game,
        actor: PlayerId,
        was_current: bool,
    ) -> GameResult<Option<Vec<WinnerPayout>>> {
        if game.players_in_hand().len() == 1 {
            return Ok(Some(self.resolve(game).await?));
        }
        if self.is_round_complete(game) {
            return self.advance_round(game).await;
        }
        if was_current {
            self.advance_turn(game, actor);
        }
        Ok(None)
    }

    /// A round is complete when every player who can still bet has acted
    /// and matched the round's maximum contribution.
    fn is_round_complete(&self, game: &Game) -> bool {
        let bettable = game.bettable_players();
        if bettable.is_empty() {
            return true;
        }
        let round_max = game.round_max();
        bettable
            .iter()
            .all(|p| game.acted_this_round.contains(p) && game.round_bet(*p) == round_max)
    }

    /// Advance to the next betting round: deal the round's community
    /// cards, reset per-round bets, and hand the turn to the first
    /// player who can act. When nobody can (everyone all-in), the board
    /// runs out to showdown.
    async fn advance_round(&self, game: &mut Game) -> GameResult<Option<Vec<WinnerPayout>>> {
        loop {
            game.round = game.round.next();
            if game.round == BettingRound::Showdown {
                return Ok(Some(self.resolve(game).await?));
            }

            for _ in 0..game.round.cards_to_deal() {
                let card = self.deal_card(game)?;
                game.community.push(card);
            }
            for bet in game.round_bets.values_mut() {
                *bet = 0;
            }
            game.acted_this_round.clear();
            info!(
                "game {}: {}, board has {} cards",
                game.id,
                game.round,
                game.community.len()
            );

            let bettable = game.bettable_players();
            if bettable.len() > 1 {
                game.current_player = Some(bettable[0]);
                return Ok(None);
            }
            // Nobody left to bet against; keep dealing.
            game.current_player = None;
        }
    }

    /// Move the turn to the next active player in table order after
    /// `from`, wrapping around.
    fn advance_turn(&self, game: &mut Game, from: PlayerId) {
        let Some(idx) = game.players.iter().position(|p| *p == from) else {
            game.current_player = None;
            return;
        };
        let n = game.players.len();
        for offset in 1..=n {
            let candidate = game.players[(idx + offset) % n];
            if game.player_status.get(&candidate) == Some(&PlayerStatus::Active) {
                game.current_player = Some(candidate);
                return;
            }
        }
        game.current_player = None;
    }

    /// Resolve the hand: evaluate (unless uncontested), pay the winners,
    /// complete the game, and start post-game cooldowns for everyone who
    /// was dealt in.
    async fn resolve(&self, game: &mut Game) -> GameResult<Vec<WinnerPayout>> {
        let in_hand = game.players_in_hand();

        let winners: Vec<(PlayerId, Option<String>)> = if in_hand.len() == 1 {
            vec![(in_hand[0], None)]
        } else {
            let mut hands = BTreeMap::new();
            for player_id in &in_hand {
                hands.insert(
                    *player_id,
                    game.hole_cards.get(player_id).cloned().unwrap_or_default(),
                );
            }
            let winner_ids = eval::evaluate_many(&hands, &game.community);
            // Remainder chips go to the earliest seats, so order winners
            // by table position.
            game.players
                .iter()
                .copied()
                .filter(|p| winner_ids.contains(p))
                .map(|player_id| {
                    let mut cards = hands.get(&player_id).cloned().unwrap_or_default();
                    cards.extend_from_slice(&game.community);
                    (player_id, Some(eval::evaluate(&cards).to_string()))
                })
                .collect()
        };

        let pot = game.pot;
        let ledger_winners: Vec<(PlayerId, String)> = winners
            .iter()
            .map(|(player_id, hand)| {
                (
                    *player_id,
                    hand.clone()
                        .unwrap_or_else(|| "all opponents folded".to_string()),
                )
            })
            .collect();

        let payouts = match self.ledger.distribute_pot(game.id, pot, &ledger_winners).await {
            Ok(payouts) => payouts,
            Err(err) => {
                // A payout failing midway leaves money unaccounted for.
                return Err(self.fault(game, format!("pot distribution failed: {err}")));
            }
        };

        game.paid_out += payouts.iter().map(|(_, amount)| amount).sum::<Chips>();
        game.pot = 0;
        game.status = GameStatus::Completed;
        game.current_player = None;
        game.ended_at = Some(Utc::now());
        self.check_pot(game)?;
        self.cooldowns.handle_game_end(game.id, &game.players).await;
        info!(
            "game {}: completed, pot {pot} paid to {:?}",
            game.id,
            payouts.iter().map(|(p, _)| *p).collect::<Vec<_>>()
        );

        Ok(payouts
            .into_iter()
            .map(|(player_id, amount)| WinnerPayout {
                player_id,
                amount,
                hand: winners
                    .iter()
                    .find(|(w, _)| *w == player_id)
                    .and_then(|(_, hand)| hand.clone()),
            })
            .collect())
    }

    fn deal_card(&self, game: &mut Game) -> GameResult<Card> {
        match game.deck.deal() {
            Some(card) => Ok(card),
            None => Err(self.fault(game, "deck exhausted mid-hand".to_string())),
        }
    }

    /// Verify that the pot equals everything contributed minus everything
    /// paid out. A mismatch means money was created or destroyed; the
    /// game is faulted rather than allowed to continue.
    fn check_pot(&self, game: &mut Game) -> GameResult<()> {
        let contributed = game.contributed();
        if game.pot != contributed - game.paid_out {
            let detail = format!(
                "pot {} != contributed {} - paid out {}",
                game.pot, contributed, game.paid_out
            );
            return Err(self.fault(game, detail));
        }
        Ok(())
    }

    fn fault(&self, game: &mut Game, detail: String) -> GameError {
        game.status = GameStatus::Faulted;
        game.current_player = None;
        let err = GameError::InvariantViolation {
            game_id: game.id,
            detail,
        };
        error!("{err}");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::{CooldownConfig, CooldownTracker};
    use crate::game::config::GameConfig;
    use crate::ledger::{LedgerConfig, LedgerManager};
    use uuid::Uuid;

    fn engine() -> GameEngine {
        // Zero action cooldowns so tests can submit moves back to back.
        let cooldowns = CooldownTracker::with_config(CooldownConfig {
            bet_secs: 0,
            check_secs: 0,
            default_secs: 0,
            post_game_secs: 300,
        });
        GameEngine::new(
            Arc::new(LedgerManager::with_config(LedgerConfig {
                max_balance: 1_000_000,
            })),
            Arc::new(cooldowns),
        )
    }

    async fn game_with_players(engine: &GameEngine, balances: &[Chips]) -> Game {
        let config = GameConfig {
            min_bet: 10,
            max_bet: 100,
            max_players: 9,
        };
        let mut game = Game::new(Uuid::new_v4(), config);
        for (i, balance) in balances.iter().enumerate() {
            let player_id = i as PlayerId + 1;
            engine
                .ledger()
                .open_account(player_id, *balance)
                .await
                .unwrap();
            assert!(game.add_player(player_id));
        }
        game
    }

    #[tokio::test]
    async fn initialize_posts_blinds_and_sets_first_to_act() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;

        let snapshot = engine.initialize_game(&mut game).await.unwrap();
        assert_eq!(snapshot.status, GameStatus::InProgress);
        assert_eq!(snapshot.round, BettingRound::PreFlop);
        assert_eq!(snapshot.pot, 15);
        assert_eq!(snapshot.bets.get(&1), Some(&5));
        assert_eq!(snapshot.bets.get(&2), Some(&10));
        // First to act sits after the big blind.
        assert_eq!(snapshot.current_player, Some(3));

        assert_eq!(engine.ledger().balance(1).await.unwrap(), 495);
        assert_eq!(engine.ledger().balance(2).await.unwrap(), 490);
        for player_id in 1..=3 {
            assert_eq!(game.hole_cards[&player_id].len(), 2);
        }
    }

    #[tokio::test]
    async fn initialize_rejects_single_player() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500]).await;
        let err = engine.initialize_game(&mut game).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidMove(_)));
        assert_eq!(game.status, GameStatus::Waiting);
    }

    #[tokio::test]
    async fn initialize_refuses_to_start_on_unpostable_blind() {
        let engine = engine();
        // Big blind cannot afford 10.
        let mut game = game_with_players(&engine, &[500, 3, 500]).await;

        let err = engine.initialize_game(&mut game).await.unwrap_err();
        assert!(matches!(
            err,
            GameError::Ledger(crate::ledger::LedgerError::InsufficientBalance { .. })
        ));
        // Fully rolled back: no money moved, game is startable again.
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.pot, 0);
        assert_eq!(engine.ledger().balance(1).await.unwrap(), 500);
        assert_eq!(engine.ledger().balance(2).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn out_of_turn_move_is_rejected_without_mutation() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let err = engine
            .submit_move(&mut game, 1, MoveAction::Call, None)
            .await
            .unwrap_err();
        assert_eq!(err, GameError::InvalidMove("not your turn".to_string()));
        assert_eq!(game.pot, 15);
        assert_eq!(game.current_player, Some(3));
        assert_eq!(engine.ledger().balance(1).await.unwrap(), 495);
    }

    #[tokio::test]
    async fn bet_rejected_while_blind_is_outstanding() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let err = engine
            .submit_move(&mut game, 3, MoveAction::Bet, Some(50))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidMove(_)));
    }

    #[tokio::test]
    async fn check_rejected_when_chips_are_owed() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let err = engine
            .submit_move(&mut game, 3, MoveAction::Check, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidMove("cannot check, call or fold instead".to_string())
        );
    }

    #[tokio::test]
    async fn raise_must_exceed_round_max() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let err = engine
            .submit_move(&mut game, 3, MoveAction::Raise, Some(10))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidMove(_)));

        let outcome = engine
            .submit_move(&mut game, 3, MoveAction::Raise, Some(30))
            .await
            .unwrap();
        assert_eq!(outcome.snapshot.pot, 45);
        assert_eq!(outcome.snapshot.bets.get(&3), Some(&30));
    }

    #[tokio::test]
    async fn insufficient_balance_leaves_state_unchanged() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 40]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let err = engine
            .submit_move(&mut game, 3, MoveAction::Raise, Some(50))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::Ledger(crate::ledger::LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(game.pot, 15);
        assert_eq!(engine.ledger().balance(3).await.unwrap(), 40);
        assert_eq!(game.current_player, Some(3), "turn must not advance");
    }

    #[tokio::test]
    async fn heads_up_call_then_check_completes_round_and_deals_flop() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();
        // Heads-up: player 1 posted small blind and acts first.
        assert_eq!(game.current_player, Some(1));

        let outcome = engine
            .submit_move(&mut game, 1, MoveAction::Call, None)
            .await
            .unwrap();
        assert_eq!(outcome.snapshot.round, BettingRound::PreFlop);
        assert!(game.community.is_empty());

        let outcome = engine
            .submit_move(&mut game, 2, MoveAction::Check, None)
            .await
            .unwrap();
        assert_eq!(outcome.snapshot.round, BettingRound::Flop);
        assert_eq!(game.community.len(), 3);
        assert_eq!(game.round_bet(1), 0);
        assert_eq!(game.round_bet(2), 0);
        assert_eq!(game.pot, 20);
    }

    #[tokio::test]
    async fn fold_to_last_player_ends_hand_without_showdown() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let outcome = engine
            .submit_move(&mut game, 1, MoveAction::Fold, None)
            .await
            .unwrap();
        let winners = outcome.winners.unwrap();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].player_id, 2);
        assert_eq!(winners[0].amount, 15);
        assert_eq!(winners[0].hand, None);
        assert_eq!(game.status, GameStatus::Completed);
        // 500 - 10 (big blind) + 15 (pot)
        assert_eq!(engine.ledger().balance(2).await.unwrap(), 505);
        assert_eq!(engine.ledger().balance(1).await.unwrap(), 495);
    }

    #[tokio::test]
    async fn cancel_in_progress_is_an_illegal_transition() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let err = engine.cancel_game(&mut game).await.unwrap_err();
        assert_eq!(
            err,
            GameError::IllegalTransition {
                from: GameStatus::InProgress,
                to: GameStatus::Cancelled,
            }
        );
        assert_eq!(game.status, GameStatus::InProgress);
    }

    #[tokio::test]
    async fn action_cooldown_blocks_immediate_second_action() {
        // Real cooldown durations for this test.
        let cooldowns = CooldownTracker::with_config(CooldownConfig {
            bet_secs: 30,
            check_secs: 15,
            default_secs: 300,
            post_game_secs: 300,
        });
        let engine = GameEngine::new(Arc::new(LedgerManager::new()), Arc::new(cooldowns));
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        engine
            .submit_move(&mut game, 3, MoveAction::Call, None)
            .await
            .unwrap();
        // Round is not complete, so it is nobody else's problem yet; let
        // the same player try to act again out of turn order by forcing
        // the turn back.
        game.current_player = Some(3);
        let err = engine
            .submit_move(&mut game, 3, MoveAction::Fold, None)
            .await
            .unwrap_err();
        match err {
            GameError::CooldownActive {
                player_id,
                remaining_secs,
            } => {
                assert_eq!(player_id, 3);
                assert!(remaining_secs > 0);
            }
            other => panic!("expected cooldown error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_game_cooldown_blocks_next_hand() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();
        engine
            .submit_move(&mut game, 1, MoveAction::Fold, None)
            .await
            .unwrap();
        assert_eq!(game.status, GameStatus::Completed);

        // A rematch needs a new game; both players are still cooling down.
        let config = game.config.clone();
        let mut rematch = Game::new(game.room_id, config);
        rematch.add_player(1);
        rematch.add_player(2);
        let err = engine.initialize_game(&mut rematch).await.unwrap_err();
        assert!(matches!(err, GameError::CooldownActive { .. }));
    }

    #[tokio::test]
    async fn leave_before_start_unseats_without_penalty() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;

        engine.leave_game(&mut game, 2).await.unwrap();
        assert_eq!(game.players, vec![1, 3]);
        assert!(!engine.cooldowns().is_active(game.id, 2).await);
    }

    #[tokio::test]
    async fn leave_mid_hand_folds_and_penalizes() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        let outcome = engine.leave_game(&mut game, 3).await.unwrap();
        assert!(outcome.winners.is_none());
        assert_eq!(game.player_status.get(&3), Some(&PlayerStatus::Folded));
        assert!(engine.cooldowns().is_active(game.id, 3).await);
        // Turn moved on from the leaver.
        assert_eq!(game.current_player, Some(1));
    }

    #[tokio::test]
    async fn pot_mismatch_faults_the_game() {
        let engine = engine();
        let mut game = game_with_players(&engine, &[500, 500, 500]).await;
        engine.initialize_game(&mut game).await.unwrap();

        // Corrupt the pot behind the engine's back.
        game.pot += 1;
        let err = engine
            .submit_move(&mut game, 3, MoveAction::Call, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvariantViolation { .. }));
        assert_eq!(game.status, GameStatus::Faulted);

        // A faulted game accepts nothing further.
        let err = engine
            .submit_move(&mut game, 1, MoveAction::Fold, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidMove(_)));
    }
}

/// Integration tests for game flow scenarios.
///
/// These drive full hands through the engine and the per-game actor:
/// blinds, betting rounds, folds, showdowns, and cancellation.
use std::sync::Arc;

use cardroom::{
    BettingRound, CooldownConfig, CooldownTracker, GameConfig, GameEngine, GameError, GameStatus,
    LedgerManager, MoveAction, PlayerStatus, TableManager,
    entities::{Card, Game},
    Suit,
};
use uuid::Uuid;

/// Engine with zero-length action cooldowns so tests can play moves back
/// to back, but a real post-game cooldown.
fn test_engine() -> GameEngine {
    let cooldowns = CooldownTracker::with_config(CooldownConfig {
        bet_secs: 0,
        check_secs: 0,
        default_secs: 0,
        post_game_secs: 300,
    });
    GameEngine::new(Arc::new(LedgerManager::new()), Arc::new(cooldowns))
}

fn config() -> GameConfig {
    GameConfig {
        min_bet: 10,
        max_bet: 100,
        max_players: 9,
    }
}

async fn seated_game(engine: &GameEngine, balances: &[i64]) -> Game {
    let mut game = Game::new(Uuid::new_v4(), config());
    for (i, balance) in balances.iter().enumerate() {
        let player_id = i as i64 + 1;
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
async fn heads_up_call_check_deals_flop_and_resets_bets() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[500, 500]).await;
    engine.initialize_game(&mut game).await.unwrap();

    // Blinds 5/10 are on the table.
    assert_eq!(game.pot, 15);
    assert_eq!(game.round_bet(1), 5);
    assert_eq!(game.round_bet(2), 10);

    // Player A calls the 10, player B checks.
    engine
        .submit_move(&mut game, 1, MoveAction::Call, None)
        .await
        .unwrap();
    let outcome = engine
        .submit_move(&mut game, 2, MoveAction::Check, None)
        .await
        .unwrap();

    // Round completed exactly once: three flop cards, bets reset to zero.
    assert_eq!(outcome.snapshot.round, BettingRound::Flop);
    assert_eq!(outcome.snapshot.community.len(), 3);
    assert_eq!(outcome.snapshot.bets.get(&1), Some(&0));
    assert_eq!(outcome.snapshot.bets.get(&2), Some(&0));
    assert_eq!(outcome.snapshot.pot, 20);
}

#[tokio::test]
async fn community_cards_are_dealt_exactly_once_per_round() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[500, 500]).await;
    engine.initialize_game(&mut game).await.unwrap();

    let mut expected_board = 0;
    for expected_round in [BettingRound::Flop, BettingRound::Turn, BettingRound::River] {
        // Play call-or-check until the round turns over.
        while game.round != expected_round {
            let actor = game.current_player.unwrap();
            let action = if game.round_bet(actor) < game.round_max() {
                MoveAction::Call
            } else {
                MoveAction::Check
            };
            engine
                .submit_move(&mut game, actor, action, None)
                .await
                .unwrap();
        }
        expected_board += expected_round.cards_to_deal();
        assert_eq!(game.community.len(), expected_board);
        for player_id in &game.players {
            assert_eq!(game.round_bet(*player_id), 0);
        }
    }
    assert_eq!(game.community.len(), 5);
}

#[tokio::test]
async fn full_hand_reaches_showdown_and_pays_winners() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[500, 500, 500]).await;
    engine.initialize_game(&mut game).await.unwrap();

    // Check/call everything down to the river.
    let mut winners = None;
    while winners.is_none() {
        let actor = game.current_player.expect("someone must hold the turn");
        let action = if game.round_bet(actor) < game.round_max() {
            MoveAction::Call
        } else {
            MoveAction::Check
        };
        let outcome = engine
            .submit_move(&mut game, actor, action, None)
            .await
            .unwrap();
        winners = outcome.winners;
    }

    let winners = winners.unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert!(!winners.is_empty());
    // Every winner was dealt in, holds a described hand, and the payouts
    // drain the pot exactly.
    let pot_before = 30; // three players, 10 each
    assert_eq!(winners.iter().map(|w| w.amount).sum::<i64>(), pot_before);
    for winner in &winners {
        assert!(game.players.contains(&winner.player_id));
        assert!(winner.hand.is_some());
        assert_ne!(
            game.player_status[&winner.player_id],
            PlayerStatus::Folded
        );
    }
    assert_eq!(game.pot, 0);

    // Total money in the system is unchanged.
    let mut total = 0;
    for player_id in 1..=3 {
        total += engine.ledger().balance(player_id).await.unwrap();
    }
    assert_eq!(total, 1_500);
}

#[tokio::test]
async fn known_showdown_ranks_kings_over_queens() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[450, 450, 450]).await;

    // Hand-build a river-stage game with known cards: player 1 holds a
    // pair of kings, player 3 a pair of queens, player 2 has folded.
    for player_id in 1..=3 {
        engine.ledger().bet(player_id, game.id, 50).await.unwrap();
        game.hand_bets.insert(player_id, 50);
    }
    game.pot = 150;
    game.status = GameStatus::InProgress;
    game.round = BettingRound::River;
    game.player_status.insert(2, PlayerStatus::Folded);
    game.community = vec![
        Card(13, Suit::Club),
        Card(12, Suit::Diamond),
        Card(7, Suit::Heart),
        Card(4, Suit::Spade),
        Card(2, Suit::Club),
    ];
    game.hole_cards
        .insert(1, vec![Card(13, Suit::Heart), Card(3, Suit::Diamond)]);
    game.hole_cards
        .insert(3, vec![Card(12, Suit::Spade), Card(3, Suit::Club)]);
    game.current_player = Some(1);

    engine
        .submit_move(&mut game, 1, MoveAction::Check, None)
        .await
        .unwrap();
    let outcome = engine
        .submit_move(&mut game, 3, MoveAction::Check, None)
        .await
        .unwrap();

    let winners = outcome.winners.unwrap();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].player_id, 1);
    assert_eq!(winners[0].amount, 150);
    assert_eq!(winners[0].hand.as_deref(), Some("Pair"));
    // 450 - 50 posted + 150 pot
    assert_eq!(engine.ledger().balance(1).await.unwrap(), 550);
    assert_eq!(engine.ledger().balance(3).await.unwrap(), 400);
}

#[tokio::test]
async fn bet_beyond_balance_is_rejected_cleanly() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[500, 500, 40]).await;
    engine.initialize_game(&mut game).await.unwrap();

    // Player 3 tries to raise to 50 holding only 40.
    let err = engine
        .submit_move(&mut game, 3, MoveAction::Raise, Some(50))
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::Ledger(_)));
    assert_eq!(engine.ledger().balance(3).await.unwrap(), 40);
    assert_eq!(game.pot, 15);
    assert_eq!(game.round_bet(3), 0);
}

#[tokio::test]
async fn cancel_waiting_game_refunds_posted_blinds_and_clears_cooldowns() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[500, 500]).await;

    // Blinds 5/10 were posted, then the start stalled before play began.
    engine.ledger().blind(1, game.id, 5, "Small").await.unwrap();
    engine.ledger().blind(2, game.id, 10, "Big").await.unwrap();
    game.hand_bets.insert(1, 5);
    game.hand_bets.insert(2, 10);
    game.pot = 15;
    engine
        .cooldowns()
        .start(game.id, 1, chrono::Duration::seconds(60))
        .await;

    let outcome = engine.cancel_game(&mut game).await.unwrap();
    assert_eq!(outcome.status, GameStatus::Cancelled);
    assert_eq!(outcome.refunds.len(), 2);
    assert_eq!(game.pot, 0);
    assert_eq!(engine.ledger().balance(1).await.unwrap(), 500);
    assert_eq!(engine.ledger().balance(2).await.unwrap(), 500);
    assert!(!engine.cooldowns().is_active(game.id, 1).await);
}

#[tokio::test]
async fn folding_down_to_one_player_skips_evaluation() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[500, 500, 500]).await;
    engine.initialize_game(&mut game).await.unwrap();

    engine
        .submit_move(&mut game, 3, MoveAction::Fold, None)
        .await
        .unwrap();
    let outcome = engine
        .submit_move(&mut game, 1, MoveAction::Fold, None)
        .await
        .unwrap();

    let winners = outcome.winners.unwrap();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].player_id, 2);
    assert_eq!(winners[0].hand, None, "no evaluation for uncontested win");
    assert_eq!(winners[0].amount, 15);
    assert_eq!(game.status, GameStatus::Completed);
}

#[tokio::test]
async fn actor_serializes_and_survives_a_whole_hand() {
    let engine = test_engine();
    let ledger = engine.ledger().clone();
    ledger.open_account(1, 500).await.unwrap();
    ledger.open_account(2, 500).await.unwrap();

    let tables = TableManager::new(engine);
    let handle = tables
        .create_game(Uuid::new_v4(), config(), &[1, 2])
        .await
        .unwrap();
    assert_eq!(tables.active_count().await, 1);

    let snapshot = handle.initialize().await.unwrap();
    assert_eq!(snapshot.status, GameStatus::InProgress);
    assert_eq!(snapshot.current_player, Some(1));

    // Out-of-turn submission through the actor is rejected like any
    // other invalid move.
    let err = handle
        .submit_move(2, MoveAction::Check, None)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidMove(_)));

    let outcome = handle.submit_move(1, MoveAction::Fold, None).await.unwrap();
    assert_eq!(outcome.snapshot.status, GameStatus::Completed);

    // The actor exits after its game goes terminal; the handle reports
    // the game as closed.
    let err = handle.snapshot().await.unwrap_err();
    assert!(matches!(err, GameError::GameClosed(_)));
    assert!(tables.remove(handle.game_id()).await);
    assert_eq!(tables.active_count().await, 0);
}

#[tokio::test]
async fn actor_cancel_refunds_and_rejects_after_start() {
    let engine = test_engine();
    let ledger = engine.ledger().clone();
    ledger.open_account(1, 500).await.unwrap();
    ledger.open_account(2, 500).await.unwrap();

    let tables = TableManager::new(engine);
    let handle = tables
        .create_game(Uuid::new_v4(), config(), &[1, 2])
        .await
        .unwrap();

    handle.initialize().await.unwrap();
    let err = handle.cancel().await.unwrap_err();
    assert!(matches!(err, GameError::IllegalTransition { .. }));
}

#[tokio::test]
async fn snapshot_serializes_for_broadcast() {
    let engine = test_engine();
    let mut game = seated_game(&engine, &[500, 500]).await;
    let snapshot = engine.initialize_game(&mut game).await.unwrap();

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["round"], "pre_flop");
    assert_eq!(json["pot"], 15);
    // Hole cards never leave the engine through a snapshot.
    assert!(json.get("hole_cards").is_none());
}

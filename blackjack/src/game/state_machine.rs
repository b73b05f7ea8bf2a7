//! Room lifecycle state machine.
//!
//! A [`Room`] owns its deck, dealer, and seated players, and advances
//! through the phases `Waiting → Betting → Playing → DealerTurn →
//! RoundEnd → (Betting | GameEnd)`. Operations validate the caller and
//! the phase, mutate the room, and return the ordered [`Effect`]s the
//! transport layer must deliver; a rejected operation returns an error
//! and leaves the room untouched.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::constants;
use super::entities::{
    Credits, Dealer, Deck, EmptyDeckError, Outcome, Player, PlayerId, PlayerView,
};
use crate::net::messages::{FinalStanding, PlayerAction, RoundSummary, ServerEvent};
use crate::room::config::RoomSettings;

/// Errors a room operation can be rejected with. All variants except
/// `EmptyDeck` are ordinary validation failures reported back to the
/// caller only.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("game already in progress")]
    GameAlreadyInProgress,
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid bet: {0}")]
    InvalidBet(String),
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error(transparent)]
    EmptyDeck(#[from] EmptyDeckError),
    #[error("unknown player")]
    UnknownPlayer,
}

/// Room phase. The closed set of places a room can be between inbound
/// events; `DealerTurn` and `RoundEnd` are passed through within a
/// single event when the last player finishes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Waiting,
    Betting,
    Playing,
    DealerTurn,
    RoundEnd,
    GameEnd,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Betting => "betting",
            Self::Playing => "playing",
            Self::DealerTurn => "dealer-turn",
            Self::RoundEnd => "round-end",
            Self::GameEnd => "game-end",
        };
        write!(f, "{repr}")
    }
}

/// One thing the transport layer must do after an operation, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Deliver to every current room member.
    Broadcast(ServerEvent),
    /// Schedule an auto-stand for `player` after `secs`, tagged with
    /// the turn sequence number. A firing whose tag is stale is ignored,
    /// which makes cancellation race-free.
    ArmTurnTimer { player: PlayerId, seq: u64, secs: u64 },
}

/// One table: seats, dealer, deck, and the phase machinery.
#[derive(Debug)]
pub struct Room {
    pub code: String,
    pub players: Vec<Player>,
    pub dealer: Dealer,
    pub(crate) deck: Deck,
    pub phase: Phase,
    pub current_player_index: usize,
    pub current_round: u32,
    /// Bumped whenever the awaited turn changes; pending turn timers
    /// carry the value they were armed with and no-op once it moves on.
    pub turn_seq: u64,
    /// Overlay set while a mid-game disconnect is being resolved.
    pub paused: bool,
    pub settings: RoomSettings,
}

impl Room {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        settings: RoomSettings,
        host_id: PlayerId,
        host_name: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let host = Player::new(host_id, host_name, true);
        info!("room {code}: created by {}", host.name);
        Self {
            code,
            players: vec![host],
            dealer: Dealer::default(),
            deck: Deck::default(),
            phase: Phase::Waiting,
            current_player_index: 0,
            current_round: 1,
            turn_seq: 0,
            paused: false,
            settings,
        }
    }

    #[must_use]
    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    #[must_use]
    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    #[must_use]
    pub fn contains_player(&self, id: PlayerId) -> bool {
        self.player_index(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Seat a player. Auto-advances to betting when the last seat fills.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
    ) -> Result<Vec<Effect>, GameError> {
        if self.players.len() >= self.settings.seats {
            return Err(GameError::RoomFull);
        }
        if self.phase != Phase::Waiting {
            return Err(GameError::GameAlreadyInProgress);
        }

        let player = Player::new(id, name, false);
        info!("room {}: {} took seat {}", self.code, player.name, self.players.len());
        self.players.push(player);

        let mut effects = vec![Effect::Broadcast(ServerEvent::PlayerJoined {
            players: self.player_views(),
        })];
        if self.players.len() == self.settings.seats {
            effects.extend(self.enter_betting());
        }
        Ok(effects)
    }

    /// Host-only early start with at least two seated players.
    pub fn start(&mut self, caller: PlayerId) -> Result<Vec<Effect>, GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::GameAlreadyInProgress);
        }
        let idx = self.player_index(caller).ok_or(GameError::UnknownPlayer)?;
        if !self.players[idx].is_host {
            return Err(GameError::InvalidAction(
                "only the host can start the game".to_string(),
            ));
        }
        if self.players.len() < constants::MIN_SEATS {
            return Err(GameError::InvalidAction(
                "need at least 2 players to start".to_string(),
            ));
        }
        Ok(self.enter_betting())
    }

    /// Commit a bet. The round begins once every seat has bet.
    pub fn place_bet(
        &mut self,
        caller: PlayerId,
        amount: Credits,
    ) -> Result<Vec<Effect>, GameError> {
        if self.phase != Phase::Betting {
            return Err(GameError::InvalidAction(
                "bets are not being taken right now".to_string(),
            ));
        }
        let idx = self.player_index(caller).ok_or(GameError::UnknownPlayer)?;
        if self.players[idx].bet != 0 {
            return Err(GameError::InvalidAction(
                "bet already placed this round".to_string(),
            ));
        }
        if amount == 0 {
            return Err(GameError::InvalidBet("bet must be positive".to_string()));
        }
        if amount % constants::BET_STEP != 0 {
            return Err(GameError::InvalidBet(format!(
                "bet must be a multiple of {}",
                constants::BET_STEP
            )));
        }
        if amount > self.players[idx].credits {
            return Err(GameError::InvalidBet("bet exceeds your credits".to_string()));
        }

        self.players[idx].bet = amount;
        debug!("room {}: {} bets {amount}", self.code, self.players[idx].name);

        let mut effects = vec![Effect::Broadcast(ServerEvent::BetPlaced {
            player_id: caller,
            player_name: self.players[idx].name.clone(),
            bet: amount,
        })];
        if self.players.iter().all(|p| p.bet > 0) {
            effects.extend(self.begin_round()?);
        }
        Ok(effects)
    }

    /// Take the caller's turn action. Only the player at
    /// `current_player_index` may act; everyone else is rejected with
    /// no side effects.
    pub fn play(
        &mut self,
        caller: PlayerId,
        action: PlayerAction,
    ) -> Result<Vec<Effect>, GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::InvalidAction(
                "turns are not being taken right now".to_string(),
            ));
        }
        let idx = self.player_index(caller).ok_or(GameError::UnknownPlayer)?;
        if idx != self.current_player_index {
            return Err(GameError::NotYourTurn);
        }

        match action {
            PlayerAction::Hit => {
                let card = self.deck.draw()?;
                self.players[idx].hand.push(card);
                let mut effects = vec![
                    Effect::Broadcast(ServerEvent::GameAction {
                        player_id: caller,
                        action,
                    }),
                    Effect::Broadcast(ServerEvent::CardDrawn {
                        player_id: caller,
                        card,
                    }),
                ];
                if self.players[idx].hand_value() > constants::BLACKJACK {
                    effects.extend(self.end_turn()?);
                } else {
                    // Same player stays current; re-arm a fresh timer
                    // under a new sequence number.
                    self.turn_seq += 1;
                    effects.push(Effect::ArmTurnTimer {
                        player: caller,
                        seq: self.turn_seq,
                        secs: self.settings.turn_timeout_secs,
                    });
                }
                Ok(effects)
            }
            PlayerAction::Stand => {
                let mut effects = vec![Effect::Broadcast(ServerEvent::GameAction {
                    player_id: caller,
                    action,
                })];
                effects.extend(self.end_turn()?);
                Ok(effects)
            }
            PlayerAction::Double => {
                if self.players[idx].hand.len() != 2 {
                    return Err(GameError::InvalidAction(
                        "double requires exactly two cards".to_string(),
                    ));
                }
                if self.players[idx].credits < self.players[idx].bet {
                    return Err(GameError::InvalidAction(
                        "not enough credits to double".to_string(),
                    ));
                }
                let card = self.deck.draw()?;
                let player = &mut self.players[idx];
                player.credits -= player.bet;
                player.bet *= 2;
                player.hand.push(card);
                let mut effects = vec![
                    Effect::Broadcast(ServerEvent::GameAction {
                        player_id: caller,
                        action,
                    }),
                    Effect::Broadcast(ServerEvent::CardDrawn {
                        player_id: caller,
                        card,
                    }),
                ];
                effects.extend(self.end_turn()?);
                Ok(effects)
            }
        }
    }

    /// A turn timer fired. Stale tags (the player already acted, or the
    /// round moved on) are ignored; a current one stands the player.
    pub fn turn_timeout(
        &mut self,
        player: PlayerId,
        seq: u64,
    ) -> Result<Vec<Effect>, GameError> {
        if self.phase != Phase::Playing || seq != self.turn_seq {
            return Ok(Vec::new());
        }
        let Some(current) = self.players.get(self.current_player_index) else {
            return Ok(Vec::new());
        };
        if current.id != player {
            return Ok(Vec::new());
        }

        info!("room {}: {} timed out, standing", self.code, current.name);
        let mut effects = vec![Effect::Broadcast(ServerEvent::GameAction {
            player_id: player,
            action: PlayerAction::Stand,
        })];
        effects.extend(self.end_turn()?);
        Ok(effects)
    }

    /// Unseat a player (disconnect). Always reports the departure; if a
    /// round was underway the room pauses, voids the round (refunding
    /// debited bets), and either reopens betting for the same round
    /// number or ends the game when fewer than two players remain.
    pub fn remove_player(&mut self, id: PlayerId) -> Vec<Effect> {
        let Some(idx) = self.player_index(id) else {
            return Vec::new();
        };

        let player = self.players.remove(idx);
        info!("room {}: {} left", self.code, player.name);
        if player.is_host {
            if let Some(next_host) = self.players.first_mut() {
                next_host.is_host = true;
            }
        }

        let mut effects = vec![Effect::Broadcast(ServerEvent::PlayerLeft {
            player_id: id,
            players: self.player_views(),
        })];

        if self.players.is_empty() || matches!(self.phase, Phase::Waiting | Phase::GameEnd) {
            return effects;
        }

        self.paused = true;
        effects.push(Effect::Broadcast(ServerEvent::GamePaused {
            message: format!("{} disconnected", player.name),
        }));
        effects.extend(self.abort_round());
        effects
    }

    /// Void the round in progress: refund bets that were already
    /// debited, clear hands, and move the room somewhere it can make
    /// progress from. Also the containment path for a mid-round
    /// [`EmptyDeckError`].
    pub(crate) fn abort_round(&mut self) -> Vec<Effect> {
        let refund = matches!(self.phase, Phase::Playing | Phase::DealerTurn);
        self.turn_seq += 1;
        for player in &mut self.players {
            if refund {
                player.credits += player.bet;
            }
            player.bet = 0;
            player.clear_hand();
            player.has_acted = false;
        }
        self.dealer.clear_hand();
        info!("room {}: round {} voided", self.code, self.current_round);

        if self.players.len() >= constants::MIN_SEATS {
            self.enter_betting()
        } else {
            self.finish_game()
        }
    }

    fn enter_betting(&mut self) -> Vec<Effect> {
        self.phase = Phase::Betting;
        self.paused = false;
        for player in &mut self.players {
            player.bet = 0;
            player.has_acted = false;
            player.clear_hand();
        }
        self.dealer.clear_hand();
        info!(
            "room {}: betting open for round {}/{}",
            self.code, self.current_round, self.settings.rounds
        );
        vec![Effect::Broadcast(ServerEvent::BettingPhase {
            players: self.player_views(),
            current_round: self.current_round,
            total_rounds: self.settings.rounds,
        })]
    }

    /// All bets are in: debit them, deal, and open the first turn.
    fn begin_round(&mut self) -> Result<Vec<Effect>, GameError> {
        for player in &mut self.players {
            player.credits -= player.bet;
            player.clear_hand();
            player.has_acted = false;
        }
        self.dealer.clear_hand();
        self.deck.reset();

        // Two passes: one card to each seat in order, then one to the
        // dealer. The dealer's second card is the hole card.
        for _ in 0..2 {
            for idx in 0..self.players.len() {
                let card = self.deck.draw()?;
                self.players[idx].hand.push(card);
            }
            let card = self.deck.draw()?;
            self.dealer.hand.push(card);
        }

        self.phase = Phase::Playing;
        self.current_player_index = 0;
        self.turn_seq += 1;
        info!(
            "room {}: round {}/{} dealt",
            self.code, self.current_round, self.settings.rounds
        );

        Ok(vec![
            Effect::Broadcast(ServerEvent::GameStarted {
                settings: self.settings,
                players: self.player_views(),
                dealer: self.dealer.masked_view(),
                current_player_index: 0,
                current_round: self.current_round,
                total_rounds: self.settings.rounds,
                room_id: self.code.clone(),
            }),
            Effect::ArmTurnTimer {
                player: self.players[0].id,
                seq: self.turn_seq,
                secs: self.settings.turn_timeout_secs,
            },
        ])
    }

    /// Close the current turn and hand play to the next unacted seat,
    /// or to the dealer once every seat has acted.
    fn end_turn(&mut self) -> Result<Vec<Effect>, GameError> {
        self.players[self.current_player_index].has_acted = true;
        self.turn_seq += 1;

        let len = self.players.len();
        let next = (1..=len)
            .map(|offset| (self.current_player_index + offset) % len)
            .find(|&idx| !self.players[idx].has_acted);

        match next {
            Some(idx) => {
                self.current_player_index = idx;
                Ok(vec![
                    Effect::Broadcast(ServerEvent::NextPlayer {
                        current_player_index: idx,
                    }),
                    Effect::ArmTurnTimer {
                        player: self.players[idx].id,
                        seq: self.turn_seq,
                        secs: self.settings.turn_timeout_secs,
                    },
                ])
            }
            None => self.dealer_turn(),
        }
    }

    /// Reveal the hole card, draw to the stand threshold (each draw is
    /// its own broadcast, in draw order), then settle.
    fn dealer_turn(&mut self) -> Result<Vec<Effect>, GameError> {
        self.phase = Phase::DealerTurn;
        let mut effects = vec![Effect::Broadcast(ServerEvent::RevealDealerCard {
            card: self.dealer.hand[1],
        })];

        while self.dealer.hand_value() < constants::DEALER_STAND {
            let card = self.deck.draw()?;
            self.dealer.hand.push(card);
            effects.push(Effect::Broadcast(ServerEvent::DealerCardDrawn { card }));
        }
        debug!(
            "room {}: dealer stands at {}",
            self.code,
            self.dealer.hand_value()
        );

        effects.extend(self.settle_round());
        Ok(effects)
    }

    /// Pay out the round and either reopen betting or end the game.
    fn settle_round(&mut self) -> Vec<Effect> {
        self.phase = Phase::RoundEnd;
        let dealer_value = self.dealer.hand_value();

        let mut summaries = Vec::with_capacity(self.players.len());
        let mut winners = 0;
        for player in &mut self.players {
            let value = player.hand_value();
            let (result, winnings) = settle(value, dealer_value, player.bet);
            player.credits += winnings;
            if result == Outcome::Win {
                player.rounds_won += 1;
                winners += 1;
            }
            summaries.push(RoundSummary {
                id: player.id,
                name: player.name.clone(),
                hand: player.hand.clone(),
                value,
                result,
                bet: player.bet,
                winnings,
                credits: player.credits,
            });
        }
        if winners == 0 && dealer_value <= constants::BLACKJACK {
            self.dealer.rounds_won += 1;
        }
        info!(
            "room {}: round {}/{} settled, dealer {}",
            self.code, self.current_round, self.settings.rounds, dealer_value
        );

        let mut effects = vec![Effect::Broadcast(ServerEvent::RoundEnd {
            dealer: self.dealer.view(),
            players: summaries,
            current_round: self.current_round,
            total_rounds: self.settings.rounds,
        })];

        if self.current_round >= self.settings.rounds {
            effects.extend(self.finish_game());
        } else {
            self.current_round += 1;
            effects.extend(self.enter_betting());
        }
        effects
    }

    fn finish_game(&mut self) -> Vec<Effect> {
        self.phase = Phase::GameEnd;
        self.paused = false;
        info!("room {}: game over", self.code);

        let mut standings: Vec<FinalStanding> = self
            .players
            .iter()
            .map(|p| FinalStanding {
                id: p.id,
                name: p.name.clone(),
                credits: p.credits,
                rounds_won: p.rounds_won,
            })
            .collect();
        standings.sort_by(|a, b| b.credits.cmp(&a.credits));

        vec![Effect::Broadcast(ServerEvent::GameEnd { players: standings })]
    }
}

/// Settlement for one player: outcome and the credits paid back.
/// The bet was debited when the round began, so a loss pays nothing, a
/// push returns the stake, and a win returns double.
#[must_use]
pub fn settle(player_value: u32, dealer_value: u32, bet: Credits) -> (Outcome, Credits) {
    if player_value > constants::BLACKJACK {
        (Outcome::Bust, 0)
    } else if dealer_value > constants::BLACKJACK || player_value > dealer_value {
        (Outcome::Win, 2 * bet)
    } else if player_value < dealer_value {
        (Outcome::Lose, 0)
    } else {
        (Outcome::Push, bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Card, Rank, Suit};
    use uuid::Uuid;

    fn settings(seats: usize, rounds: u32) -> RoomSettings {
        RoomSettings {
            seats,
            rounds,
            turn_timeout_secs: 30,
        }
    }

    /// Room with `n` seated players in the betting phase, ids returned
    /// in seat order.
    fn betting_room(n: usize, rounds: u32) -> (Room, Vec<PlayerId>) {
        let ids: Vec<PlayerId> = (0..n).map(|_| Uuid::new_v4()).collect();
        let mut room = Room::new("TEST01", settings(n, rounds), ids[0], "p0");
        for (i, &id) in ids.iter().enumerate().skip(1) {
            room.join(id, format!("p{i}")).unwrap();
        }
        assert_eq!(room.phase, Phase::Betting);
        (room, ids)
    }

    /// Room with `n` players that have all bet 10; play is underway.
    fn playing_room(n: usize, rounds: u32) -> (Room, Vec<PlayerId>) {
        let (mut room, ids) = betting_room(n, rounds);
        for &id in &ids {
            room.place_bet(id, 10).unwrap();
        }
        assert_eq!(room.phase, Phase::Playing);
        (room, ids)
    }

    fn hand(ranks: &[Rank]) -> Vec<Card> {
        ranks.iter().map(|&r| Card(r, Suit::Club)).collect()
    }

    #[test]
    fn test_join_fills_table_and_opens_betting() {
        let host = Uuid::new_v4();
        let mut room = Room::new("TEST01", settings(2, 3), host, "alice");
        assert_eq!(room.phase, Phase::Waiting);

        let effects = room.join(Uuid::new_v4(), "bob").unwrap();
        assert_eq!(room.phase, Phase::Betting);
        assert!(matches!(
            effects[0],
            Effect::Broadcast(ServerEvent::PlayerJoined { .. })
        ));
        assert!(matches!(
            effects[1],
            Effect::Broadcast(ServerEvent::BettingPhase { .. })
        ));
    }

    #[test]
    fn test_join_full_room_rejected() {
        let (mut room, _) = betting_room(2, 3);
        assert_eq!(room.join(Uuid::new_v4(), "late"), Err(GameError::RoomFull));
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn test_join_started_game_rejected() {
        let host = Uuid::new_v4();
        let mut room = Room::new("TEST01", settings(4, 3), host, "alice");
        room.join(Uuid::new_v4(), "bob").unwrap();
        room.start(host).unwrap();
        assert_eq!(
            room.join(Uuid::new_v4(), "late"),
            Err(GameError::GameAlreadyInProgress)
        );
    }

    #[test]
    fn test_host_start_requires_two_players() {
        let host = Uuid::new_v4();
        let mut room = Room::new("TEST01", settings(4, 3), host, "alice");
        assert!(matches!(
            room.start(host),
            Err(GameError::InvalidAction(_))
        ));

        room.join(Uuid::new_v4(), "bob").unwrap();
        room.start(host).unwrap();
        assert_eq!(room.phase, Phase::Betting);
    }

    #[test]
    fn test_non_host_cannot_start() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let mut room = Room::new("TEST01", settings(4, 3), host, "alice");
        room.join(guest, "bob").unwrap();
        assert!(matches!(
            room.start(guest),
            Err(GameError::InvalidAction(_))
        ));
        assert_eq!(room.phase, Phase::Waiting);
    }

    #[test]
    fn test_bet_must_be_multiple_of_ten() {
        let (mut room, ids) = betting_room(2, 3);
        assert!(matches!(
            room.place_bet(ids[0], 15),
            Err(GameError::InvalidBet(_))
        ));
        assert_eq!(room.players[0].bet, 0);
    }

    #[test]
    fn test_bet_must_be_positive_and_affordable() {
        let (mut room, ids) = betting_room(2, 3);
        assert!(matches!(
            room.place_bet(ids[0], 0),
            Err(GameError::InvalidBet(_))
        ));
        assert!(matches!(
            room.place_bet(ids[0], 110),
            Err(GameError::InvalidBet(_))
        ));
        // Betting the entire stack is allowed.
        room.place_bet(ids[0], 100).unwrap();
        assert_eq!(room.players[0].bet, 100);
    }

    #[test]
    fn test_second_bet_rejected() {
        let (mut room, ids) = betting_room(2, 3);
        room.place_bet(ids[0], 10).unwrap();
        assert!(matches!(
            room.place_bet(ids[0], 20),
            Err(GameError::InvalidAction(_))
        ));
        assert_eq!(room.players[0].bet, 10);
    }

    #[test]
    fn test_all_bets_in_deals_and_debits() {
        let (room, _) = playing_room(3, 3);
        for player in &room.players {
            assert_eq!(player.credits, 90);
            assert_eq!(player.hand.len(), 2);
        }
        assert_eq!(room.dealer.hand.len(), 2);
        assert_eq!(room.current_player_index, 0);
        // 3 players + dealer, two cards each.
        assert_eq!(room.deck.len(), 52 - 8);
    }

    #[test]
    fn test_out_of_turn_action_rejected_without_side_effects() {
        let (mut room, ids) = playing_room(2, 3);
        let hand_before = room.players[1].hand.clone();
        assert_eq!(
            room.play(ids[1], PlayerAction::Hit),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(room.current_player_index, 0);
        assert_eq!(room.players[1].hand, hand_before);
    }

    #[test]
    fn test_stranger_action_rejected() {
        let (mut room, _) = playing_room(2, 3);
        assert_eq!(
            room.play(Uuid::new_v4(), PlayerAction::Stand),
            Err(GameError::UnknownPlayer)
        );
    }

    #[test]
    fn test_each_player_acts_exactly_once_per_round() {
        let (mut room, ids) = playing_room(3, 2);
        let effects = room.play(ids[0], PlayerAction::Stand).unwrap();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::NextPlayer {
                current_player_index: 1
            })
        )));
        room.play(ids[1], PlayerAction::Stand).unwrap();
        assert_eq!(room.current_player_index, 2);

        // Last stand runs the dealer and settles in one go.
        let effects = room.play(ids[2], PlayerAction::Stand).unwrap();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::RevealDealerCard { .. })
        )));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::RoundEnd { .. })
        )));
        assert_eq!(room.phase, Phase::Betting);
        assert_eq!(room.current_round, 2);
    }

    #[test]
    fn test_busting_hit_ends_turn() {
        let (mut room, ids) = playing_room(2, 3);
        // Start from 20; only an ace survives a hit, so a few hits
        // bust regardless of what the shuffled deck serves.
        room.players[0].hand = hand(&[Rank::King, Rank::Queen]);
        let effects = loop {
            let effects = room.play(ids[0], PlayerAction::Hit).unwrap();
            if room.players[0].hand_value() > 21 {
                break effects;
            }
            assert_eq!(room.current_player_index, 0);
        };
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::NextPlayer {
                current_player_index: 1
            })
        )));
        assert!(room.players[0].has_acted);
        assert_eq!(room.current_player_index, 1);
    }

    #[test]
    fn test_nonbusting_hit_rearms_timer_for_same_player() {
        let (mut room, ids) = playing_room(2, 3);
        room.players[0].hand = hand(&[Rank::Two, Rank::Three]);
        let seq_before = room.turn_seq;
        let effects = room.play(ids[0], PlayerAction::Hit).unwrap();
        if room.players[0].hand_value() <= 21 {
            assert_eq!(room.current_player_index, 0);
            assert!(effects.iter().any(|e| matches!(
                e,
                Effect::ArmTurnTimer { player, seq, .. }
                    if *player == ids[0] && *seq == seq_before + 1
            )));
        }
    }

    #[test]
    fn test_double_requires_two_cards_and_credits() {
        let (mut room, ids) = playing_room(2, 3);
        room.players[0].hand = hand(&[Rank::Two, Rank::Three, Rank::Four]);
        assert!(matches!(
            room.play(ids[0], PlayerAction::Double),
            Err(GameError::InvalidAction(_))
        ));

        room.players[0].hand = hand(&[Rank::Five, Rank::Six]);
        room.players[0].credits = 5; // less than the 10 bet
        assert!(matches!(
            room.play(ids[0], PlayerAction::Double),
            Err(GameError::InvalidAction(_))
        ));
        assert_eq!(room.players[0].bet, 10);
    }

    #[test]
    fn test_double_debits_doubles_and_draws_one() {
        let (mut room, ids) = playing_room(2, 3);
        room.players[0].hand = hand(&[Rank::Five, Rank::Six]);
        room.play(ids[0], PlayerAction::Double).unwrap();
        let player = &room.players[0];
        assert_eq!(player.bet, 20);
        assert_eq!(player.credits, 80);
        assert_eq!(player.hand.len(), 3);
        assert!(player.has_acted);
        assert_eq!(room.current_player_index, 1);
    }

    #[test]
    fn test_settle_table() {
        assert_eq!(settle(22, 20, 10), (Outcome::Bust, 0));
        assert_eq!(settle(20, 22, 10), (Outcome::Win, 20));
        assert_eq!(settle(21, 20, 10), (Outcome::Win, 20));
        assert_eq!(settle(18, 20, 10), (Outcome::Lose, 0));
        assert_eq!(settle(20, 20, 10), (Outcome::Push, 10));
    }

    #[test]
    fn test_round_settlement_against_dealer_twenty() {
        let (mut room, ids) = playing_room(4, 2);
        // Values 22 / 20 / 19, plus a double that busted.
        room.players[0].hand = hand(&[Rank::King, Rank::Queen, Rank::Two]);
        room.players[1].hand = hand(&[Rank::King, Rank::Jack]);
        room.players[2].hand = hand(&[Rank::King, Rank::Nine]);
        room.players[3].hand = hand(&[Rank::Ten, Rank::Ten, Rank::Five]);
        room.players[3].bet = 20;
        room.players[3].credits -= 10;
        room.dealer.hand = hand(&[Rank::King, Rank::Ten]);

        let mut effects = Vec::new();
        for &id in &ids {
            effects = room.play(id, PlayerAction::Stand).unwrap();
        }

        let summaries = effects
            .iter()
            .find_map(|e| match e {
                Effect::Broadcast(ServerEvent::RoundEnd { players, .. }) => Some(players),
                _ => None,
            })
            .expect("round should have settled");
        let results: Vec<Outcome> = summaries.iter().map(|s| s.result).collect();
        assert_eq!(
            results,
            vec![Outcome::Bust, Outcome::Push, Outcome::Lose, Outcome::Bust]
        );
        let winnings: Vec<Credits> = summaries.iter().map(|s| s.winnings).collect();
        assert_eq!(winnings, vec![0, 10, 0, 0]);
        // Everyone started at 100 and bet 10 (seat 3 doubled to 20).
        assert_eq!(room.players[0].credits, 90);
        assert_eq!(room.players[1].credits, 100);
        assert_eq!(room.players[2].credits, 90);
        assert_eq!(room.players[3].credits, 80);
        assert_eq!(room.dealer.rounds_won, 1);
    }

    #[test]
    fn test_final_round_ends_game() {
        let (mut room, ids) = playing_room(2, 1);
        room.dealer.hand = hand(&[Rank::King, Rank::Ten]);
        room.play(ids[0], PlayerAction::Stand).unwrap();
        let effects = room.play(ids[1], PlayerAction::Stand).unwrap();
        assert_eq!(room.phase, Phase::GameEnd);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::GameEnd { .. })
        )));
    }

    #[test]
    fn test_stale_turn_timeout_is_noop() {
        let (mut room, ids) = playing_room(2, 3);
        let stale = room.turn_seq - 1;
        assert!(room.turn_timeout(ids[0], stale).unwrap().is_empty());
        assert_eq!(room.current_player_index, 0);
        assert!(!room.players[0].has_acted);
    }

    #[test]
    fn test_current_turn_timeout_stands_player() {
        let (mut room, ids) = playing_room(3, 3);
        let seq = room.turn_seq;
        let effects = room.turn_timeout(ids[0], seq).unwrap();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::GameAction {
                action: PlayerAction::Stand,
                ..
            })
        )));
        assert!(room.players[0].has_acted);
        assert_eq!(room.current_player_index, 1);
    }

    #[test]
    fn test_disconnect_mid_round_refunds_and_reopens_betting() {
        let (mut room, ids) = playing_room(3, 3);
        let effects = room.remove_player(ids[1]);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::PlayerLeft { .. })
        )));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::GamePaused { .. })
        )));
        // Same round number, bets refunded, betting reopened.
        assert_eq!(room.phase, Phase::Betting);
        assert_eq!(room.current_round, 1);
        assert_eq!(room.players.len(), 2);
        for player in &room.players {
            assert_eq!(player.credits, 100);
            assert_eq!(player.bet, 0);
            assert!(player.hand.is_empty());
        }
    }

    #[test]
    fn test_disconnect_below_two_players_ends_game() {
        let (mut room, ids) = playing_room(2, 3);
        let effects = room.remove_player(ids[1]);
        assert_eq!(room.phase, Phase::GameEnd);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Broadcast(ServerEvent::GameEnd { .. })
        )));
        // The survivor got their stake back before the game closed.
        assert_eq!(room.players[0].credits, 100);
    }

    #[test]
    fn test_disconnect_in_waiting_room_is_quiet() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let mut room = Room::new("TEST01", settings(4, 3), host, "alice");
        room.join(guest, "bob").unwrap();
        let effects = room.remove_player(guest);
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            effects[0],
            Effect::Broadcast(ServerEvent::PlayerLeft { .. })
        ));
        assert_eq!(room.phase, Phase::Waiting);
    }

    #[test]
    fn test_host_leaving_promotes_next_seat() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let mut room = Room::new("TEST01", settings(4, 3), host, "alice");
        room.join(guest, "bob").unwrap();
        room.remove_player(host);
        assert!(room.players[0].is_host);
        assert_eq!(room.players[0].id, guest);
    }

    #[test]
    fn test_disconnected_players_timer_cannot_fire() {
        let (mut room, ids) = playing_room(3, 3);
        let seq = room.turn_seq;
        room.remove_player(ids[0]);
        // The void bumped the sequence; the old timer tag is stale.
        assert!(room.turn_timeout(ids[0], seq).unwrap().is_empty());
    }
}

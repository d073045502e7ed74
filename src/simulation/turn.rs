//! Single-turn simulation: opening draw, action phase and treasure phase.

use crate::card::Card;
use crate::rng::{shuffle, RandomSource};
use crate::simulation::decisions::DecisionEngine;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const STARTING_HAND_SIZE: usize = 5;
pub const SILVER_ID: &str = "silver";

/// Why the action phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Draw pile empty when the action phase ended
    WholeDeckDrawn,
    /// Ran out of actions with cards left in the pile
    NoActions,
    /// Actions left but no action card in hand
    NoActionCards,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeDeckDrawn => write!(f, "whole deck drawn"),
            Self::NoActions => write!(f, "no actions remaining"),
            Self::NoActionCards => write!(f, "no action cards in hand"),
        }
    }
}

/// Result of one simulated turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Cards drawn beyond the starting hand
    pub cards_drawn: u32,
    pub coins: u32,
    pub buys: u32,
    pub end_reason: EndReason,
    /// A draw was attempted against an empty pile
    pub deck_exhausted: bool,
}

/// Bonus coins added to the first treasure of a given id played this turn
#[derive(Debug, Clone, Copy)]
pub struct OneShotBonus<'a> {
    pub target: &'a str,
    pub coins: u32,
    consumed: bool,
}

impl<'a> OneShotBonus<'a> {
    pub fn new(target: &'a str, coins: u32) -> Self {
        OneShotBonus {
            target,
            coins,
            consumed: false,
        }
    }

    /// Coins granted for playing `card`; only the first matching play gets them
    pub fn claim(&mut self, card: &Card) -> u32 {
        if self.consumed || self.coins == 0 || card.id != self.target {
            return 0;
        }
        self.consumed = true;
        self.coins
    }
}

/// Mutable state of a turn in progress
#[derive(Debug)]
pub struct TurnState<'a> {
    // Top of the pile is the end of the vector
    pub draw_pile: Vec<&'a Card>,
    pub hand: Vec<&'a Card>,
    pub actions: u32,
    pub buys: u32,
    pub coins: u32,
    pub merchant_triggers: u32,
    pub cards_drawn: u32,
    pub deck_exhausted: bool,
}

impl<'a> TurnState<'a> {
    pub fn new(draw_pile: Vec<&'a Card>) -> Self {
        TurnState {
            hand: Vec::with_capacity(draw_pile.len().min(16)),
            draw_pile,
            actions: 1,
            buys: 1,
            coins: 0,
            merchant_triggers: 0,
            cards_drawn: 0,
            deck_exhausted: false,
        }
    }

    /// Draw one card into hand. An empty pile marks the deck exhausted.
    pub fn draw_card(&mut self) -> bool {
        match self.draw_pile.pop() {
            Some(card) => {
                self.hand.push(card);
                true
            }
            None => {
                self.deck_exhausted = true;
                false
            }
        }
    }

    /// Draw for a card effect; stops at the first failed draw
    fn draw_cards(&mut self, count: u32) -> u32 {
        let mut drawn = 0;
        for _ in 0..count {
            if !self.draw_card() {
                break;
            }
            drawn += 1;
        }
        self.cards_drawn += drawn;
        drawn
    }

    /// Play one action card from hand and resolve its effect
    fn play_action(&mut self, idx: usize, verbose: bool) {
        let card = self.hand.remove(idx);
        self.actions -= 1;

        let drawn = self.draw_cards(card.draw);
        // Custom catalogs may carry arbitrary attribute values
        self.actions = self.actions.saturating_add(card.actions);
        self.buys = self.buys.saturating_add(card.buys);
        self.coins = self.coins.saturating_add(card.coins);
        if card.merchant {
            self.merchant_triggers += 1;
        }

        if verbose {
            println!(
                "[Action] {} draws {}/{}, actions={}, buys={}, coins={}",
                card.name, drawn, card.draw, self.actions, self.buys, self.coins
            );
        }
    }

    /// Play actions until out of actions or action cards
    fn action_phase(&mut self, verbose: bool) -> EndReason {
        while self.actions > 0 {
            let Some(idx) = DecisionEngine::choose_action_to_play(&self.hand) else {
                break;
            };
            self.play_action(idx, verbose);
        }

        if self.draw_pile.is_empty() {
            EndReason::WholeDeckDrawn
        } else if self.actions == 0 {
            EndReason::NoActions
        } else {
            EndReason::NoActionCards
        }
    }

    /// Play every treasure in hand, Silvers first so a merchant bonus lands
    fn treasure_phase(&mut self, verbose: bool) {
        let mut bonus = OneShotBonus::new(SILVER_ID, self.merchant_triggers);
        let (silvers, others): (Vec<&Card>, Vec<&Card>) = self
            .hand
            .iter()
            .copied()
            .filter(|c| c.is_treasure())
            .partition(|c| c.id == SILVER_ID);

        for card in silvers.into_iter().chain(others) {
            let extra = bonus.claim(card);
            self.coins = self.coins.saturating_add(card.value.saturating_add(extra));
            if verbose {
                if extra > 0 {
                    println!("[Treasure] {} +{} (+{} merchant)", card.name, card.value, extra);
                } else {
                    println!("[Treasure] {} +{}", card.name, card.value);
                }
            }
        }
    }
}

/// Simulate one turn from a fresh shuffle of `deck`
pub fn simulate_turn<R: RandomSource + ?Sized>(deck: &[Card], rng: &mut R, verbose: bool) -> TurnOutcome {
    let mut pile: Vec<&Card> = deck.iter().collect();
    shuffle(&mut pile, rng);
    play_turn(pile, verbose)
}

/// Play one turn against an already ordered draw pile (top = last element)
pub fn play_turn(draw_pile: Vec<&Card>, verbose: bool) -> TurnOutcome {
    let mut state = TurnState::new(draw_pile);

    for _ in 0..STARTING_HAND_SIZE {
        state.draw_card();
    }
    if verbose {
        let names: Vec<&str> = state.hand.iter().map(|c| c.name.as_str()).collect();
        println!("[Draw] Starting hand: {}", names.join(", "));
    }

    let end_reason = state.action_phase(verbose);
    state.treasure_phase(verbose);

    if verbose {
        println!(
            "[End] {} | drawn={} coins={} buys={}",
            end_reason, state.cards_drawn, state.coins, state.buys
        );
    }

    TurnOutcome {
        cards_drawn: state.cards_drawn,
        coins: state.coins,
        buys: state.buys,
        end_reason,
        deck_exhausted: state.deck_exhausted,
    }
}

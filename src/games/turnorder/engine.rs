use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tokens::{build_deck, DeckConfiguration, Token};
use crate::utils::fisher_yates;

pub const HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    /// Draw attempted with nothing left in the draw pile
    EmptyDeck,
    /// Undo attempted with no snapshot to restore
    HistoryEmpty,
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::EmptyDeck => write!(f, "the draw pile is empty"),
            DeckError::HistoryEmpty => write!(f, "there is nothing to undo"),
        }
    }
}

impl std::error::Error for DeckError {}

pub fn shuffle(tokens: &[Token], rng: &mut impl Rng) -> Vec<Token> {
    fisher_yates(tokens, rng)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub round: u32,
    /// Top of the pile is the end of the vector
    pub draw_pile: Vec<Token>,
    /// Most recently superseded token first
    pub discard_pile: Vec<Token>,
    pub last_drawn: Option<Token>,
}

impl GameState {
    /// Round 1 with the deck in build order. The first round start or
    /// `new_game` shuffles it.
    pub fn reset(config: &DeckConfiguration) -> Self {
        GameState {
            round: 1,
            draw_pile: build_deck(config),
            discard_pile: vec![],
            last_drawn: None,
        }
    }

    /// Round 1 with a shuffled draw pile
    pub fn new_game(config: &DeckConfiguration, rng: &mut impl Rng) -> Self {
        GameState {
            round: 1,
            draw_pile: shuffle(&build_deck(config), rng),
            discard_pile: vec![],
            last_drawn: None,
        }
    }

    pub fn start_new_round(&self, config: &DeckConfiguration, rng: &mut impl Rng) -> Self {
        GameState {
            round: self.round + 1,
            draw_pile: shuffle(&build_deck(config), rng),
            discard_pile: vec![],
            last_drawn: None,
        }
    }

    /// Takes the top token. The previously face-up token, if any, moves to
    /// the front of the discard pile.
    pub fn draw(&self) -> Result<(GameState, Token), DeckError> {
        let mut next = self.clone();
        let drawn = next.draw_pile.pop().ok_or(DeckError::EmptyDeck)?;
        if let Some(previous) = next.last_drawn.replace(drawn.clone()) {
            next.discard_pile.insert(0, previous);
        }
        Ok((next, drawn))
    }

    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }
}

/// Bounded stack of snapshots taken before each undoable mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    snapshots: VecDeque<GameState>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a snapshot, evicting the oldest once full
    pub fn push(&mut self, snapshot: GameState) {
        if self.snapshots.len() >= HISTORY_CAPACITY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn undo(&mut self) -> Result<GameState, DeckError> {
        self.snapshots.pop_back().ok_or(DeckError::HistoryEmpty)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

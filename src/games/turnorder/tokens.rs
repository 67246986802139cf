use std::collections::BTreeMap;

use enum_iterator::{all, Sequence};
use serde::{Deserialize, Serialize};

pub const MAX_PLAYER_TOKENS: u8 = 6;
pub const MAX_NEMESIS_TOKENS: u8 = 8;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Sequence,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
pub enum Kind {
    #[default]
    P1,
    P2,
    P3,
    P4,
    #[serde(rename = "NEM")]
    Nemesis,
}

impl Kind {
    /// Short code used for token ids and the persisted settings keys
    pub fn code(&self) -> &'static str {
        match self {
            Kind::P1 => "P1",
            Kind::P2 => "P2",
            Kind::P3 => "P3",
            Kind::P4 => "P4",
            Kind::Nemesis => "NEM",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Kind::P1 => "Player 1",
            Kind::P2 => "Player 2",
            Kind::P3 => "Player 3",
            Kind::P4 => "Player 4",
            Kind::Nemesis => "Nemesis",
        }
    }

    pub fn from_code(code: &str) -> Option<Kind> {
        all::<Kind>().find(|kind| kind.code() == code)
    }

    pub fn max_count(&self) -> u8 {
        match self {
            Kind::Nemesis => MAX_NEMESIS_TOKENS,
            _ => MAX_PLAYER_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub kind: Kind,
}

impl Token {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// How many tokens of each kind go into the deck
/// Counts are always within `0..=kind.max_count()`.
/// Deserialized entries go through `set`, so zero counts are dropped and
/// large ones clamped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "BTreeMap<Kind, i64>", into = "BTreeMap<Kind, u8>")]
pub struct DeckConfiguration {
    counts: BTreeMap<Kind, u8>,
}

impl From<BTreeMap<Kind, i64>> for DeckConfiguration {
    fn from(counts: BTreeMap<Kind, i64>) -> Self {
        let mut config = DeckConfiguration::new();
        for (kind, count) in counts {
            config.set(kind, count);
        }
        config
    }
}

impl From<DeckConfiguration> for BTreeMap<Kind, u8> {
    fn from(config: DeckConfiguration) -> Self {
        config.counts
    }
}

impl DeckConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two-player deck the game ships with
    pub fn standard() -> Self {
        let mut config = Self::new();
        config.set(Kind::P1, 2);
        config.set(Kind::P2, 2);
        config.set(Kind::Nemesis, 2);
        config
    }

    pub fn count(&self, kind: Kind) -> u8 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Sets a count, clamping it into the kind's allowed range
    pub fn set(&mut self, kind: Kind, count: i64) {
        let clamped = count.clamp(0, kind.max_count() as i64) as u8;
        if clamped == 0 {
            self.counts.remove(&kind);
        } else {
            self.counts.insert(kind, clamped);
        }
    }

    pub fn adjust(&mut self, kind: Kind, delta: i64) {
        self.set(kind, self.count(kind) as i64 + delta);
    }

    pub fn total(&self) -> usize {
        self.counts.values().map(|c| *c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Builds the unshuffled deck: player kinds ascending, Nemesis last.
/// Ids are the kind code followed by a letter (`P1a`, `P1b`, `NEMa`).
pub fn build_deck(config: &DeckConfiguration) -> Vec<Token> {
    let mut deck = Vec::with_capacity(config.total());
    for kind in all::<Kind>() {
        for index in 0..config.count(kind) {
            deck.push(Token {
                id: format!("{}{}", kind.code(), (b'a' + index) as char),
                kind,
            });
        }
    }
    deck
}

/*
Game: Turn order deck for Aeon's End
Designers: Kevin Riley and Nick Little
BoardGameGeek: https://boardgamegeek.com/boardgame/191189/aeons-end
*/

pub mod engine;
pub mod gate;
pub mod session;
pub mod settings;
pub mod tokens;

// Re-export the main types
pub use engine::{DeckError, GameState, History, HISTORY_CAPACITY};
pub use gate::{Millis, Release, Timings, LONG_PRESS_MS};
pub use session::{Change, ChangeType, Command, Outcome, Screen, Session};
pub use settings::{MemoryStore, SettingsStore};
pub use tokens::{build_deck, DeckConfiguration, Kind, Token};

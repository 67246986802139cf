use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::engine::{DeckError, GameState, History};
use super::gate::{
    AnimatedAction, BusyGate, GateEvent, Gesture, Millis, Phase, PressClassifier, Release,
    Timings,
};
use super::settings::{load_config, save_config, MemoryStore, SettingsStore};
use super::tokens::{DeckConfiguration, Kind, Token};

const SETUP_MESSAGE: &str = "Choose the tokens, then tap Begin.";
const START_MESSAGE: &str = "Tap Draw to start.";
const EMPTY_DECK_MESSAGE: &str = "Deck empty. Tap Shuffle to start next round.";
const NOTHING_TO_UNDO_MESSAGE: &str = "Nothing to undo.";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    #[default]
    Setup,
    Table,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Draw,
    Undo,
    StartNewRound,
    Reset,
    ToggleDiscardView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// Dropped by the busy gate or not available on the current screen
    Ignored,
    Failed(DeckError),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChangeType {
    #[default]
    Conceal,
    Reveal,
    Discard,
    Shuffle,
    Restore,
    Ready,
    Message,
    ShowDiscards,
    HideDiscards,
    Setup,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    #[default]
    Deck,
    Face,
    Discards,
    Message,
    Setup,
}

/// One renderer instruction. Changes inside a group play together, groups
/// play in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(rename(serialize = "type", deserialize = "type"))]
    pub change_type: ChangeType,
    pub dest: Location,
    pub token: Option<Token>,
    pub round: u32,
    pub length: usize,
    pub duration: Millis,
    pub message: Option<String>,
}

pub fn turn_message(token: &Token) -> String {
    format!("{}'s turn.", token.label())
}

pub fn round_message(round: u32) -> String {
    format!("Round {} started. Tap Draw.", round)
}

/// Status line that describes a state on its own, used after undo
fn status_for(state: &GameState) -> String {
    match &state.last_drawn {
        Some(token) => turn_message(token),
        None if state.round > 1 => round_message(state.round),
        None => START_MESSAGE.to_string(),
    }
}

/// One game in progress, from the setup screen through any number of rounds
#[derive(Debug, Clone)]
pub struct Session<S: SettingsStore = MemoryStore> {
    store: S,
    rng: StdRng,
    timings: Timings,
    screen: Screen,
    config: DeckConfiguration,
    state: GameState,
    history: History,
    gate: BusyGate,
    press: PressClassifier,
    pending: Option<GameState>,
    message: String,
    show_discards: bool,
    /// Animation groups produced by the most recent call
    pub changes: Vec<Vec<Change>>,
    pub no_changes: bool,
}

impl<S: SettingsStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    pub fn with_seed(store: S, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: S, rng: StdRng) -> Self {
        let config = load_config(&store);
        let timings = Timings::default();
        Session {
            state: GameState::reset(&config),
            config,
            store,
            rng,
            timings,
            screen: Screen::Setup,
            history: History::new(),
            gate: BusyGate::new(),
            press: PressClassifier::new(timings.long_press),
            pending: None,
            message: SETUP_MESSAGE.to_string(),
            show_discards: false,
            changes: vec![],
            no_changes: false,
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self.press = PressClassifier::new(timings.long_press);
        self
    }

    pub fn with_no_changes(&mut self) {
        self.no_changes = true;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &DeckConfiguration {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn phase(&self) -> Option<(AnimatedAction, Phase)> {
        self.gate.current()
    }

    pub fn is_holding(&self) -> bool {
        self.press.is_holding()
    }

    pub fn hold_fraction(&self, now: Millis) -> f32 {
        self.press.hold_fraction(now)
    }

    pub fn show_discards(&self) -> bool {
        self.show_discards
    }

    pub fn remaining(&self) -> usize {
        self.state.remaining()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty() && !self.gate.is_busy()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn draw(&mut self, now: Millis) -> Outcome {
        self.handle(Command::Draw, now)
    }

    pub fn undo(&mut self, now: Millis) -> Outcome {
        self.handle(Command::Undo, now)
    }

    pub fn start_new_round(&mut self, now: Millis) -> Outcome {
        self.handle(Command::StartNewRound, now)
    }

    pub fn reset(&mut self, now: Millis) -> Outcome {
        self.handle(Command::Reset, now)
    }

    pub fn toggle_discard_view(&mut self, now: Millis) -> Outcome {
        self.handle(Command::ToggleDiscardView, now)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn handle(&mut self, command: Command, now: Millis) -> Outcome {
        self.changes.clear();
        self.dispatch(command, now)
    }

    fn dispatch(&mut self, command: Command, now: Millis) -> Outcome {
        if command == Command::ToggleDiscardView {
            return self.toggle_discards();
        }
        if self.gate.is_busy() || self.screen != Screen::Table {
            debug!(?command, busy = self.gate.is_busy(), "command ignored");
            return Outcome::Ignored;
        }
        match command {
            Command::Draw => self.accept_draw(now),
            Command::Undo => self.accept_undo(),
            Command::StartNewRound => self.accept_new_round(now),
            Command::Reset => self.accept_reset(now),
            Command::ToggleDiscardView => self.toggle_discards(),
        }
    }

    fn accept_draw(&mut self, now: Millis) -> Outcome {
        let (next, token) = match self.state.draw() {
            Ok(drawn) => drawn,
            Err(err) => {
                info!("draw attempted on an empty deck");
                self.set_message(EMPTY_DECK_MESSAGE.to_string());
                return Outcome::Failed(err);
            }
        };
        debug!(token = %token.id, "draw accepted");
        self.history.push(self.state.clone());
        self.pending = Some(next);
        let began = self.gate.begin(AnimatedAction::Draw, now, &self.timings);
        debug_assert!(began, "dispatch only accepts while idle");
        self.push_changes(vec![Change {
            change_type: ChangeType::Conceal,
            dest: Location::Face,
            token: self.state.last_drawn.clone(),
            length: self.state.remaining(),
            duration: self.timings.draw_conceal,
            ..Default::default()
        }]);
        Outcome::Accepted
    }

    fn accept_undo(&mut self) -> Outcome {
        match self.history.undo() {
            Ok(previous) => {
                debug!(round = previous.round, remaining = previous.remaining(), "undo");
                self.state = previous;
                self.push_changes(vec![Change {
                    change_type: ChangeType::Restore,
                    dest: Location::Face,
                    token: self.state.last_drawn.clone(),
                    round: self.state.round,
                    length: self.state.remaining(),
                    ..Default::default()
                }]);
                self.set_message(status_for(&self.state));
                Outcome::Accepted
            }
            Err(err) => {
                self.set_message(NOTHING_TO_UNDO_MESSAGE.to_string());
                Outcome::Failed(err)
            }
        }
    }

    fn accept_new_round(&mut self, now: Millis) -> Outcome {
        self.history.push(self.state.clone());
        self.pending = Some(self.state.start_new_round(&self.config, &mut self.rng));
        let began = self.gate.begin(AnimatedAction::Shuffle, now, &self.timings);
        debug_assert!(began, "dispatch only accepts while idle");
        self.push_changes(vec![Change {
            change_type: ChangeType::Conceal,
            dest: Location::Deck,
            token: self.state.last_drawn.clone(),
            round: self.state.round,
            duration: self.timings.shuffle_conceal,
            ..Default::default()
        }]);
        Outcome::Accepted
    }

    fn accept_reset(&mut self, now: Millis) -> Outcome {
        info!("reset requested");
        let began = self.gate.begin(AnimatedAction::Reset, now, &self.timings);
        debug_assert!(began, "dispatch only accepts while idle");
        self.push_changes(vec![Change {
            change_type: ChangeType::Conceal,
            dest: Location::Setup,
            token: self.state.last_drawn.clone(),
            duration: self.timings.reset_conceal,
            ..Default::default()
        }]);
        Outcome::Accepted
    }

    fn toggle_discards(&mut self) -> Outcome {
        self.show_discards = !self.show_discards;
        self.push_changes(vec![Change {
            change_type: if self.show_discards {
                ChangeType::ShowDiscards
            } else {
                ChangeType::HideDiscards
            },
            dest: Location::Discards,
            length: self.state.discard_pile.len(),
            ..Default::default()
        }]);
        Outcome::Accepted
    }

    /// Scheduler entry point: runs every continuation due by `now` and the
    /// long-press deadline
    pub fn tick(&mut self, now: Millis) {
        self.changes.clear();
        for event in self.gate.advance(now, &self.timings) {
            match event {
                GateEvent::Apply(action) => self.apply(action),
                GateEvent::Settled(action) => self.settle(action),
            }
        }
        if let Some(gesture) = self.press.poll(now) {
            if self.fire(gesture, now) == Outcome::Ignored {
                debug!(?gesture, "held press landed while busy");
            }
        }
    }

    fn apply(&mut self, action: AnimatedAction) {
        match action {
            AnimatedAction::Draw | AnimatedAction::Shuffle => {
                let Some(next) = self.pending.take() else {
                    warn!(?action, "no pending state to apply");
                    return;
                };
                self.state = next;
                if action == AnimatedAction::Draw {
                    self.apply_draw_changes();
                } else {
                    info!(round = self.state.round, "new round");
                    self.push_changes(vec![Change {
                        change_type: ChangeType::Shuffle,
                        dest: Location::Deck,
                        round: self.state.round,
                        length: self.state.remaining(),
                        duration: self.timings.shuffle_reveal,
                        ..Default::default()
                    }]);
                    self.set_message(round_message(self.state.round));
                }
            }
            AnimatedAction::Reset => {
                self.history.clear();
                self.pending = None;
                self.config = load_config(&self.store);
                self.state = GameState::reset(&self.config);
                self.screen = Screen::Setup;
                self.show_discards = false;
                self.push_changes(vec![Change {
                    change_type: ChangeType::Setup,
                    dest: Location::Setup,
                    length: self.config.total(),
                    ..Default::default()
                }]);
                self.set_message(SETUP_MESSAGE.to_string());
            }
        }
    }

    fn apply_draw_changes(&mut self) {
        let mut group = vec![];
        if let Some(discarded) = self.state.discard_pile.first() {
            group.push(Change {
                change_type: ChangeType::Discard,
                dest: Location::Discards,
                token: Some(discarded.clone()),
                length: self.state.discard_pile.len(),
                ..Default::default()
            });
        }
        group.push(Change {
            change_type: ChangeType::Reveal,
            dest: Location::Face,
            token: self.state.last_drawn.clone(),
            length: self.state.remaining(),
            duration: self.timings.draw_reveal,
            ..Default::default()
        });
        self.push_changes(group);
        if let Some(message) = self.state.last_drawn.as_ref().map(turn_message) {
            self.set_message(message);
        }
    }

    fn settle(&mut self, action: AnimatedAction) {
        debug!(?action, "transition settled");
        self.push_changes(vec![Change {
            change_type: ChangeType::Ready,
            dest: Location::Face,
            token: self.state.last_drawn.clone(),
            ..Default::default()
        }]);
    }

    fn fire(&mut self, gesture: Gesture, now: Millis) -> Outcome {
        let command = match gesture {
            Gesture::Tap => Command::Undo,
            Gesture::Hold => Command::Reset,
        };
        debug!(?gesture, ?command, "press classified");
        self.dispatch(command, now)
    }

    /// Press on the combined Undo/Reset control. Ignored while busy.
    pub fn press_start(&mut self, now: Millis) -> bool {
        self.changes.clear();
        if self.screen != Screen::Table {
            return false;
        }
        self.press.press_start(now, self.gate.is_busy())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn press_end(&mut self, now: Millis, release: Release) -> Outcome {
        self.changes.clear();
        match self.press.press_end(now, release) {
            Some(gesture) => self.fire(gesture, now),
            None => Outcome::Ignored,
        }
    }

    pub fn adjust_count(&mut self, kind: Kind, delta: i64) -> Outcome {
        if self.screen != Screen::Setup {
            return Outcome::Ignored;
        }
        self.config.adjust(kind, delta);
        Outcome::Accepted
    }

    pub fn set_count(&mut self, kind: Kind, count: i64) -> Outcome {
        if self.screen != Screen::Setup {
            return Outcome::Ignored;
        }
        self.config.set(kind, count);
        Outcome::Accepted
    }

    /// Leaves the setup screen: saves the configuration and deals round 1
    #[instrument(level = "debug", skip(self))]
    pub fn begin(&mut self, now: Millis) -> Outcome {
        self.changes.clear();
        if self.screen != Screen::Setup || self.gate.is_busy() {
            return Outcome::Ignored;
        }
        save_config(&mut self.store, &self.config);
        self.state = GameState::new_game(&self.config, &mut self.rng);
        self.history.clear();
        self.screen = Screen::Table;
        self.show_discards = false;
        info!(tokens = self.config.total(), "game started");
        self.push_changes(vec![Change {
            change_type: ChangeType::Shuffle,
            dest: Location::Deck,
            round: self.state.round,
            length: self.state.remaining(),
            ..Default::default()
        }]);
        self.set_message(START_MESSAGE.to_string());
        Outcome::Accepted
    }

    fn set_message(&mut self, message: String) {
        self.push_changes(vec![Change {
            change_type: ChangeType::Message,
            dest: Location::Message,
            message: Some(message.clone()),
            ..Default::default()
        }]);
        self.message = message;
    }

    fn push_changes(&mut self, group: Vec<Change>) {
        if self.no_changes {
            return;
        }
        self.changes.push(group);
    }
}

//! End-to-end turn order scenarios driven through the session.
use turndeck_rs::games::turnorder::{
    DeckConfiguration, DeckError, Kind, MemoryStore, Outcome, Release, Screen, Session,
    SettingsStore, Timings, LONG_PRESS_MS,
};

fn begin_standard(seed: u64) -> Session {
    let mut session = Session::with_seed(MemoryStore::new(), seed);
    session.set_count(Kind::P1, 2);
    session.set_count(Kind::P2, 2);
    session.set_count(Kind::Nemesis, 2);
    assert_eq!(session.begin(0), Outcome::Accepted);
    session
}

fn draw_and_settle(session: &mut Session, now: u64) {
    assert_eq!(session.draw(now), Outcome::Accepted);
    session.tick(now + Timings::default().draw_conceal + Timings::default().draw_reveal);
}

#[test]
fn two_draws_then_undo() {
    let mut session = begin_standard(99);
    assert_eq!(session.remaining(), 6);
    assert!(session.state().discard_pile.is_empty());
    assert_eq!(session.state().round, 1);

    draw_and_settle(&mut session, 1_000);
    let after_first = session.state().clone();
    let first = after_first.last_drawn.clone().expect("a token is face up");
    assert_eq!(after_first.draw_pile.len(), 5);
    assert!(after_first.discard_pile.is_empty());

    draw_and_settle(&mut session, 2_000);
    assert_eq!(session.remaining(), 4);
    assert_eq!(session.state().discard_pile, vec![first]);
    assert_ne!(session.state().last_drawn, after_first.last_drawn);

    assert_eq!(session.undo(3_000), Outcome::Accepted);
    assert_eq!(session.state(), &after_first);
}

#[test]
fn hold_fires_one_reset_and_no_undo() {
    let mut session = begin_standard(5);
    draw_and_settle(&mut session, 0);
    let history_before = session.history_len();
    assert_eq!(history_before, 1);

    assert!(session.press_start(1_000));
    for now in (1_000..1_000 + LONG_PRESS_MS).step_by(50) {
        session.tick(now);
        assert!(session.is_holding());
        assert_eq!(session.screen(), Screen::Table);
    }
    session.tick(1_000 + LONG_PRESS_MS);
    assert!(!session.is_holding());
    assert_eq!(session.press_end(1_750, Release::Normal), Outcome::Ignored);

    session.tick(3_000);
    assert_eq!(session.screen(), Screen::Setup);
    assert_eq!(session.history_len(), 0);
}

#[test]
fn quick_release_fires_one_undo_and_no_reset() {
    let mut session = begin_standard(5);
    draw_and_settle(&mut session, 0);
    assert!(session.press_start(1_000));
    session.tick(1_300);
    assert_eq!(session.press_end(1_300, Release::Normal), Outcome::Accepted);
    assert_eq!(session.history_len(), 0);
    assert_eq!(session.remaining(), 6);

    // Nothing left to fire later
    session.tick(5_000);
    assert_eq!(session.screen(), Screen::Table);
}

#[test]
fn cancelled_press_fires_nothing() {
    let mut session = begin_standard(5);
    draw_and_settle(&mut session, 0);
    let state = session.state().clone();
    assert!(session.press_start(1_000));
    assert_eq!(session.press_end(1_200, Release::Cancelled), Outcome::Ignored);
    session.tick(5_000);
    assert_eq!(session.state(), &state);
    assert_eq!(session.screen(), Screen::Table);
}

#[test]
fn draw_while_busy_changes_nothing() {
    let mut session = begin_standard(8);
    assert_eq!(session.draw(0), Outcome::Accepted);
    let state = session.state().clone();
    let history = session.history_len();
    assert_eq!(session.draw(50), Outcome::Ignored);
    assert_eq!(session.state(), &state);
    assert_eq!(session.history_len(), history);
}

#[test]
fn empty_configuration_reports_empty_deck() {
    let mut session = Session::with_seed(MemoryStore::new(), 1);
    assert_eq!(session.begin(0), Outcome::Accepted);
    assert_eq!(session.draw(10), Outcome::Failed(DeckError::EmptyDeck));
    assert_eq!(
        session.message(),
        "Deck empty. Tap Shuffle to start next round."
    );
}

#[test]
fn saved_configuration_is_used_by_next_session() {
    let mut store = MemoryStore::new();
    store.set("deck-config", r#"{"P1":1,"P3":2,"NEM":3}"#.to_string());
    let session = Session::with_seed(store, 3);
    let mut expected = DeckConfiguration::new();
    expected.set(Kind::P1, 1);
    expected.set(Kind::P3, 2);
    expected.set(Kind::Nemesis, 3);
    assert_eq!(session.config(), &expected);
}

#[test]
fn corrupt_saved_configuration_falls_back_to_zero() {
    let mut store = MemoryStore::new();
    store.set("deck-config", "{oops".to_string());
    let session = Session::with_seed(store, 3);
    assert!(session.config().is_empty());
}

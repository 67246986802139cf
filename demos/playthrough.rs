use colored::Colorize;

use turndeck_rs::games::turnorder::{
    Kind, MemoryStore, Outcome, Release, Session, Timings, Token,
};

fn print_token(token: &Token) -> String {
    let string = format!("{:<8}", token.label());
    let colored_string = match token.kind {
        Kind::P1 => string.blue(),
        Kind::P2 => string.green(),
        Kind::P3 => string.yellow(),
        Kind::P4 => string.magenta(),
        Kind::Nemesis => string.red(),
    };
    format!("{}:{}", token.id, colored_string)
}

fn display_session(session: &Session) {
    let state = session.state();
    println!(
        "round {} | remaining {} | face up: {}",
        state.round,
        state.draw_pile.len(),
        state
            .last_drawn
            .as_ref()
            .map(print_token)
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "discards: {}",
        state
            .discard_pile
            .iter()
            .map(print_token)
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!("{}\n---", session.message());
}

fn main() {
    let timings = Timings::default();
    let mut session = Session::new(MemoryStore::new()).with_timings(timings);
    session.set_count(Kind::P1, 2);
    session.set_count(Kind::P2, 2);
    session.set_count(Kind::Nemesis, 2);
    session.begin(0);

    let mut now = 0;
    for _round in 0..2 {
        loop {
            now += 1000;
            match session.draw(now) {
                Outcome::Accepted => {
                    session.tick(now + timings.draw_conceal + timings.draw_reveal);
                    display_session(&session);
                }
                _ => {
                    println!("{}", session.message().dimmed());
                    break;
                }
            }
        }
        now += 1000;
        session.start_new_round(now);
        session.tick(now + timings.shuffle_conceal + timings.shuffle_reveal);
        display_session(&session);
    }

    // Tap the combined control to take back the reshuffle
    now += 1000;
    session.press_start(now);
    session.press_end(now + 200, Release::Normal);
    display_session(&session);

    println!(
        "{}",
        serde_json::to_string(&session.state()).unwrap_or_default()
    );
}

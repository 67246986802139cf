#![feature(test)]
extern crate test;

use rand::{rngs::StdRng, SeedableRng};
use test::{black_box, Bencher};
use turndeck_rs::{
    games::turnorder::{build_deck, DeckConfiguration, Kind, MemoryStore, Outcome, Session},
    utils::fisher_yates,
};

fn full_session(no_changes: bool) {
    let mut session = Session::with_seed(MemoryStore::new(), 42);
    if no_changes {
        session.with_no_changes();
    }
    session.set_count(Kind::P1, 6);
    session.set_count(Kind::P2, 6);
    session.set_count(Kind::Nemesis, 8);
    session.begin(0);
    let mut now = 0;
    for _ in 0..10 {
        loop {
            now += 1000;
            if session.draw(now) != Outcome::Accepted {
                break;
            }
            session.tick(now + 500);
        }
        now += 1000;
        session.start_new_round(now);
        session.tick(now + 500);
    }
}

#[bench]
fn bench_session_playthrough(b: &mut Bencher) {
    b.iter(|| {
        black_box(full_session(false));
    })
}

#[bench]
fn bench_session_playthrough_no_changes(b: &mut Bencher) {
    b.iter(|| {
        black_box(full_session(true));
    })
}

#[bench]
fn bench_shuffle(b: &mut Bencher) {
    let mut config = DeckConfiguration::new();
    config.set(Kind::P1, 6);
    config.set(Kind::Nemesis, 8);
    let deck = build_deck(&config);
    let mut rng = StdRng::seed_from_u64(7);
    b.iter(|| black_box(fisher_yates(&deck, &mut rng)))
}

//! Interaction gate
//!
//! Two small state machines sit in front of the deck engine:
//! - `BusyGate` keeps at most one animated transition in flight and walks it
//!   through its named phases as time is fed in.
//! - `PressClassifier` turns one press on the combined Undo/Reset control into
//!   a tap or a hold.
//!
//! Time is always supplied by the caller in milliseconds.

use serde::{Deserialize, Serialize};

pub type Millis = u64;

pub const LONG_PRESS_MS: Millis = 700;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AnimatedAction {
    Draw,
    Shuffle,
    Reset,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Current face leaves; the pile mutation lands when this ends
    Conceal,
    /// New face arrives; the gate opens when this ends
    Reveal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
    pub draw_conceal: Millis,
    pub draw_reveal: Millis,
    pub shuffle_conceal: Millis,
    pub shuffle_reveal: Millis,
    pub reset_conceal: Millis,
    pub reset_reveal: Millis,
    pub long_press: Millis,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            draw_conceal: 180,
            draw_reveal: 180,
            shuffle_conceal: 180,
            shuffle_reveal: 180,
            reset_conceal: 180,
            reset_reveal: 0,
            long_press: LONG_PRESS_MS,
        }
    }
}

impl Timings {
    pub fn phase_duration(&self, action: AnimatedAction, phase: Phase) -> Millis {
        match (action, phase) {
            (AnimatedAction::Draw, Phase::Conceal) => self.draw_conceal,
            (AnimatedAction::Draw, Phase::Reveal) => self.draw_reveal,
            (AnimatedAction::Shuffle, Phase::Conceal) => self.shuffle_conceal,
            (AnimatedAction::Shuffle, Phase::Reveal) => self.shuffle_reveal,
            (AnimatedAction::Reset, Phase::Conceal) => self.reset_conceal,
            (AnimatedAction::Reset, Phase::Reveal) => self.reset_reveal,
        }
    }

    /// Time from acceptance until the gate opens again
    pub fn total(&self, action: AnimatedAction) -> Millis {
        self.phase_duration(action, Phase::Conceal) + self.phase_duration(action, Phase::Reveal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Conceal finished: apply the pending pile mutation
    Apply(AnimatedAction),
    /// Reveal finished: the gate is idle again
    Settled(AnimatedAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    action: AnimatedAction,
    phase: Phase,
    due_at: Millis,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyGate {
    transition: Option<Transition>,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.transition.is_some()
    }

    pub fn current(&self) -> Option<(AnimatedAction, Phase)> {
        self.transition.map(|t| (t.action, t.phase))
    }

    /// Enters the busy state for `action`. Returns false, leaving the running
    /// transition untouched, when already busy.
    pub fn begin(&mut self, action: AnimatedAction, now: Millis, timings: &Timings) -> bool {
        if self.is_busy() {
            return false;
        }
        self.transition = Some(Transition {
            action,
            phase: Phase::Conceal,
            due_at: now + timings.phase_duration(action, Phase::Conceal),
        });
        true
    }

    /// Runs every phase end that is due by `now`, in order
    pub fn advance(&mut self, now: Millis, timings: &Timings) -> Vec<GateEvent> {
        let mut events = vec![];
        while let Some(transition) = self.transition {
            if now < transition.due_at {
                break;
            }
            match transition.phase {
                Phase::Conceal => {
                    events.push(GateEvent::Apply(transition.action));
                    self.transition = Some(Transition {
                        phase: Phase::Reveal,
                        due_at: transition.due_at
                            + timings.phase_duration(transition.action, Phase::Reveal),
                        ..transition
                    });
                }
                Phase::Reveal => {
                    events.push(GateEvent::Settled(transition.action));
                    self.transition = None;
                }
            }
        }
        events
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Finger or button lifted over the control
    Normal,
    /// Pointer left the control or the touch sequence was aborted
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Gesture {
    Tap,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressClassifier {
    threshold: Millis,
    pressed_since: Option<Millis>,
}

impl PressClassifier {
    pub fn new(threshold: Millis) -> Self {
        Self {
            threshold,
            pressed_since: None,
        }
    }

    /// Starts a press unless the gate is busy or a press is already running
    pub fn press_start(&mut self, now: Millis, busy: bool) -> bool {
        if busy || self.pressed_since.is_some() {
            return false;
        }
        self.pressed_since = Some(now);
        true
    }

    /// Fires `Hold` once the long-press deadline has been reached
    pub fn poll(&mut self, now: Millis) -> Option<Gesture> {
        match self.pressed_since {
            Some(since) if now.saturating_sub(since) >= self.threshold => {
                self.pressed_since = None;
                Some(Gesture::Hold)
            }
            _ => None,
        }
    }

    pub fn press_end(&mut self, now: Millis, release: Release) -> Option<Gesture> {
        // A deadline that passed without a poll still counts as fired
        if let Some(hold) = self.poll(now) {
            return Some(hold);
        }
        self.pressed_since.take()?;
        match release {
            Release::Normal => Some(Gesture::Tap),
            Release::Cancelled => None,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.pressed_since.is_some()
    }

    /// Progress towards the hold threshold, for a progress ring
    pub fn hold_fraction(&self, now: Millis) -> f32 {
        match self.pressed_since {
            Some(_) if self.threshold == 0 => 1.0,
            Some(since) => (now.saturating_sub(since) as f32 / self.threshold as f32).min(1.0),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_rejects_while_busy() {
        let timings = Timings::default();
        let mut gate = BusyGate::new();
        assert!(gate.begin(AnimatedAction::Draw, 0, &timings));
        assert!(!gate.begin(AnimatedAction::Shuffle, 10, &timings));
        assert_eq!(gate.current(), Some((AnimatedAction::Draw, Phase::Conceal)));
    }

    #[test]
    fn test_phases_run_in_order() {
        let timings = Timings::default();
        let mut gate = BusyGate::new();
        gate.begin(AnimatedAction::Draw, 1000, &timings);

        assert!(gate.advance(1179, &timings).is_empty());
        assert_eq!(
            gate.advance(1180, &timings),
            vec![GateEvent::Apply(AnimatedAction::Draw)]
        );
        assert_eq!(gate.current(), Some((AnimatedAction::Draw, Phase::Reveal)));
        assert!(gate.is_busy());

        assert!(gate.advance(1359, &timings).is_empty());
        assert_eq!(
            gate.advance(1360, &timings),
            vec![GateEvent::Settled(AnimatedAction::Draw)]
        );
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_late_advance_runs_whole_sequence() {
        let timings = Timings::default();
        let mut gate = BusyGate::new();
        gate.begin(AnimatedAction::Shuffle, 0, &timings);
        assert_eq!(
            gate.advance(10_000, &timings),
            vec![
                GateEvent::Apply(AnimatedAction::Shuffle),
                GateEvent::Settled(AnimatedAction::Shuffle)
            ]
        );
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_zero_length_reveal_settles_with_apply() {
        let timings = Timings::default();
        let mut gate = BusyGate::new();
        gate.begin(AnimatedAction::Reset, 0, &timings);
        assert_eq!(
            gate.advance(timings.reset_conceal, &timings),
            vec![
                GateEvent::Apply(AnimatedAction::Reset),
                GateEvent::Settled(AnimatedAction::Reset)
            ]
        );
    }

    #[test]
    fn test_hold_fires_once() {
        let mut press = PressClassifier::new(LONG_PRESS_MS);
        assert!(press.press_start(0, false));
        assert_eq!(press.poll(699), None);
        assert_eq!(press.poll(700), Some(Gesture::Hold));
        assert_eq!(press.poll(800), None);
        assert_eq!(press.press_end(900, Release::Normal), None);
    }

    #[test]
    fn test_quick_release_is_a_tap() {
        let mut press = PressClassifier::new(LONG_PRESS_MS);
        press.press_start(0, false);
        assert_eq!(press.poll(300), None);
        assert_eq!(press.press_end(300, Release::Normal), Some(Gesture::Tap));
        assert!(!press.is_holding());
    }

    #[test]
    fn test_cancel_fires_nothing() {
        let mut press = PressClassifier::new(LONG_PRESS_MS);
        press.press_start(0, false);
        assert_eq!(press.press_end(200, Release::Cancelled), None);
        // Deadline must be disarmed
        assert_eq!(press.poll(5000), None);
    }

    #[test]
    fn test_release_after_missed_deadline_is_a_hold() {
        let mut press = PressClassifier::new(LONG_PRESS_MS);
        press.press_start(100, false);
        assert_eq!(press.press_end(900, Release::Normal), Some(Gesture::Hold));
    }

    #[test]
    fn test_press_ignored_while_busy() {
        let mut press = PressClassifier::new(LONG_PRESS_MS);
        assert!(!press.press_start(0, true));
        assert!(!press.is_holding());
        assert_eq!(press.press_end(100, Release::Normal), None);
    }

    #[test]
    fn test_hold_fraction() {
        let mut press = PressClassifier::new(LONG_PRESS_MS);
        assert_eq!(press.hold_fraction(0), 0.0);
        press.press_start(1000, false);
        assert!((press.hold_fraction(1350) - 0.5).abs() < 1e-6);
        assert_eq!(press.hold_fraction(5000), 1.0);
    }
}

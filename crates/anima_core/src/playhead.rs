//! Playhead - remembers the previous sample for edge detection
//!
//! `Event` nodes only fire when the host passes the previous position as
//! `t0`. A [`Playhead`] does that bookkeeping: each advance plays the tree
//! with `(t, previous)` and records `t` for the next call.
//!
//! The playhead is not a clock. The host still decides every position, in
//! either direction and at any cadence.

use crate::container::{Anim, Container};
use crate::time::TimeValue;

/// Host-side cursor over a timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playhead<T> {
    position: T,
}

impl<T: TimeValue> Playhead<T> {
    /// Create a playhead resting at `start`
    pub fn new(start: T) -> Self {
        Self { position: start }
    }

    /// Last sampled position
    pub fn position(&self) -> T {
        self.position
    }

    /// Play `root` at `t`, using the last sampled position as `t0`
    ///
    /// # Panics
    ///
    /// Panics if `root` was issued by another container.
    pub fn advance_to(&mut self, container: &Container<T>, root: Anim<T>, t: T) {
        let previous = self.position;
        self.position = t;
        root.play(container, t, previous);
    }

    /// Advance by `delta` from the last sampled position
    pub fn step(&mut self, container: &Container<T>, root: Anim<T>, delta: T) {
        let t = self.position + delta;
        self.advance_to(container, root, t);
    }

    /// Move to `t` without playing anything
    ///
    /// Events between the old and new position are skipped; the next advance
    /// measures crossings from `t`.
    pub fn seek(&mut self, t: T) {
        self.position = t;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::trigger;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_event(anim: &mut Container<f64>, moment: f64) -> (Anim<f64>, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        let event = anim.event(moment, trigger(move || sink.set(sink.get() + 1)));
        (event, hits)
    }

    #[test]
    fn test_forward_steps_fire_event_once() {
        let mut anim = Container::<f64>::new();
        let (event, hits) = counting_event(&mut anim, 1.0);
        let mut head = Playhead::new(0.0);

        for _ in 0..8 {
            head.step(&anim, event, 0.25);
        }
        assert_eq!(head.position(), 2.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_scrubbing_back_fires_again() {
        let mut anim = Container::<f64>::new();
        let (event, hits) = counting_event(&mut anim, 1.0);
        let mut head = Playhead::new(0.0);

        head.advance_to(&anim, event, 1.5);
        head.advance_to(&anim, event, 0.5);
        head.advance_to(&anim, event, 0.75);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_seek_skips_crossings() {
        let mut anim = Container::<f64>::new();
        let (event, hits) = counting_event(&mut anim, 1.0);
        let mut head = Playhead::new(0.0);

        head.seek(3.0);
        head.advance_to(&anim, event, 3.5);
        assert_eq!(hits.get(), 0);
        assert_eq!(head.position(), 3.5);
    }

    #[test]
    fn test_event_under_gate_sees_shifted_history() {
        let mut anim = Container::<f64>::new();
        let (event, hits) = counting_event(&mut anim, 0.5);
        let root = anim.after(2.0, event);
        let mut head = Playhead::new(0.0);

        // Gate closed: nothing reaches the event
        head.advance_to(&anim, root, 1.0);
        // Gate opens; the local interval -1.0..0.25 stays below the moment
        head.advance_to(&anim, root, 2.25);
        assert_eq!(hits.get(), 0);
        head.advance_to(&anim, root, 2.75);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_missed_transition_while_gated_out() {
        let mut anim = Container::<f64>::new();
        let (event, hits) = counting_event(&mut anim, 0.5);
        let root = anim.between(0.0, 1.0, event);
        let mut head = Playhead::new(0.25);

        // Jumping from inside the window to past its end never evaluates the child
        head.advance_to(&anim, root, 1.5);
        assert_eq!(hits.get(), 0);
    }
}

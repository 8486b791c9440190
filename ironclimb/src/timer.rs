//! Scene-owned deferred events.
//!
//! A [`Clock`] lives inside the scene that scheduled its events. Dropping or
//! rebuilding the scene drops the clock, so a pending event can never fire
//! against a scene that no longer exists.

use std::time::Duration;

#[derive(Clone, Debug)]
struct Scheduled<E> {
    due: Duration,
    repeat: Option<Duration>,
    seq: u64,
    event: E,
}

/// Delayed and repeating events keyed by an event value of the scene's choosing.
#[derive(Clone, Debug)]
pub struct Clock<E> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Scheduled<E>>,
}

impl<E: Clone> Clock<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// Time advanced so far.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `event` once, `delay` from now.
    pub fn after(&mut self, delay: Duration, event: E) {
        self.schedule(delay, None, event);
    }

    /// Fire `event` every `interval`, first time one interval from now.
    pub fn every(&mut self, interval: Duration, event: E) {
        // A zero interval would fire forever within a single advance.
        let interval = interval.max(Duration::from_millis(1));
        self.schedule(interval, Some(interval), event);
    }

    fn schedule(&mut self, delay: Duration, repeat: Option<Duration>, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due: self.now + delay,
            repeat,
            seq,
            event,
        });
    }

    /// Move time forward and return every event that came due, in firing order.
    /// Ties fire in scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<E> {
        self.now += dt;
        let mut fired: Vec<(Duration, u64, E)> = Vec::new();

        let now = self.now;
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due > now {
                i += 1;
                continue;
            }
            match self.pending[i].repeat {
                Some(interval) => {
                    let entry = &mut self.pending[i];
                    while entry.due <= now {
                        fired.push((entry.due, entry.seq, entry.event.clone()));
                        entry.due += interval;
                    }
                    i += 1;
                }
                None => {
                    let entry = self.pending.swap_remove(i);
                    fired.push((entry.due, entry.seq, entry.event));
                }
            }
        }

        fired.sort_by_key(|(due, seq, _)| (*due, *seq));
        fired.into_iter().map(|(_, _, event)| event).collect()
    }

    /// Number of scheduled entries (a repeating event counts once).
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drop every scheduled event.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<E: Clone> Default for Clock<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Ev {
        Volley,
        Bullet(u32),
        Popup,
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn delayed_events_fire_once_when_due() {
        let mut clock = Clock::new();
        clock.after(ms(100), Ev::Popup);
        assert!(clock.advance(ms(99)).is_empty());
        assert_eq!(clock.advance(ms(1)), vec![Ev::Popup]);
        assert!(clock.advance(ms(1000)).is_empty());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn repeating_events_keep_firing() {
        let mut clock = Clock::new();
        clock.every(ms(2000), Ev::Volley);
        assert!(clock.advance(ms(1999)).is_empty());
        assert_eq!(clock.advance(ms(1)), vec![Ev::Volley]);
        // A long hitch fires every missed repetition.
        assert_eq!(clock.advance(ms(4000)), vec![Ev::Volley, Ev::Volley]);
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn events_fire_in_due_order_then_schedule_order() {
        let mut clock = Clock::new();
        clock.after(ms(300), Ev::Bullet(2));
        clock.after(ms(200), Ev::Bullet(1));
        clock.after(ms(300), Ev::Bullet(3));
        assert_eq!(
            clock.advance(ms(500)),
            vec![Ev::Bullet(1), Ev::Bullet(2), Ev::Bullet(3)]
        );
    }

    #[test]
    fn clear_drops_pending_events() {
        let mut clock = Clock::new();
        clock.every(ms(10), Ev::Volley);
        clock.after(ms(5), Ev::Popup);
        clock.clear();
        assert!(clock.advance(ms(100)).is_empty());
        assert_eq!(clock.now(), ms(100));
    }
}

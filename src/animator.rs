//! Cooperative frame scheduler for scripted sequences.
//!
//! The animator never calls back into its owner. Timers produce tagged
//! [`Firing`]s that the owner dispatches itself, so a handler can schedule or
//! cancel timers without re-entering the scheduler.

use std::collections::VecDeque;
use std::time::Duration;

use crate::timer::Timer;

/// Handle of one scheduled timer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TimerId(u64);

/// Work the owner must perform for one timer firing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Firing<T> {
    /// A repeating timer fired. The handler may [`Animator::disable`] it.
    Tick { id: TimerId, tag: T },
    /// Frame `index` of a sequence is due.
    Frame { id: TimerId, tag: T, index: u32 },
    /// A sequence finished; `cancelled` when [`Animator::stop`] cut it short.
    Complete {
        id: TimerId,
        tag: T,
        cancelled: bool,
    },
}

impl<T: Copy> Firing<T> {
    #[must_use]
    pub fn tag(&self) -> T {
        match *self {
            Self::Tick { tag, .. } | Self::Frame { tag, .. } | Self::Complete { tag, .. } => tag,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Repeating,
    Sequence { frame: u32, frames: u32 },
}

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    tag: T,
    timer: Timer,
    kind: Kind,
    cancelled: bool,
}

/// Schedules repeating timers and fixed-length frame sequences.
#[derive(Debug, Clone)]
pub struct Animator<T> {
    entries: Vec<Entry<T>>,
    ready: VecDeque<Firing<T>>,
    next_id: u64,
}

impl<T> Default for Animator<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            ready: VecDeque::new(),
            next_id: 0,
        }
    }
}

impl<T: Copy + PartialEq> Animator<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a repeating timer. With `tick_at_creation` the first tick is
    /// queued as ready so the caller can run it before returning.
    pub fn create_timer(
        &mut self,
        tag: T,
        interval: Duration,
        tick_at_creation: bool,
        now: Duration,
    ) -> TimerId {
        let id = self.push_entry(tag, interval, Kind::Repeating, now);
        if tick_at_creation {
            self.ready.push_back(Firing::Tick { id, tag });
        }
        id
    }

    /// Starts a sequence of `frames` frames, one per `interval`, followed by a
    /// completion one interval after the last frame. Frame 0 is queued as
    /// ready immediately.
    pub fn do_animation(
        &mut self,
        tag: T,
        frames: u32,
        interval: Duration,
        now: Duration,
    ) -> TimerId {
        let id = self.push_entry(tag, interval, Kind::Sequence { frame: 1, frames }, now);
        if frames == 0 {
            self.entries.pop();
            self.ready.push_back(Firing::Complete {
                id,
                tag,
                cancelled: false,
            });
        } else {
            self.ready.push_back(Firing::Frame { id, tag, index: 0 });
        }
        id
    }

    /// Cancels every live timer. Takes effect at each timer's next firing.
    pub fn stop(&mut self) {
        for entry in &mut self.entries {
            entry.cancelled = true;
        }
    }

    /// Removes a timer without a completion firing.
    pub fn disable(&mut self, id: TimerId) {
        self.entries.retain(|entry| entry.id != id);
    }

    /// Returns true while a timer with `tag` is scheduled and not cancelled.
    #[must_use]
    pub fn is_active(&self, tag: T) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.tag == tag && !entry.cancelled)
    }

    /// Earliest deadline among scheduled timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries
            .iter()
            .filter_map(|entry| entry.timer.deadline())
            .min()
    }

    /// Pops the next firing that was produced synchronously.
    pub fn take_ready(&mut self) -> Option<Firing<T>> {
        self.ready.pop_front()
    }

    /// Fires the earliest timer due at or before `now`.
    ///
    /// Returns `None` when nothing is due, or when the due timer was a
    /// cancelled repeating timer that got dropped silently.
    pub fn fire_due(&mut self, now: Duration) -> Option<Firing<T>> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.timer.deadline().map(|deadline| (deadline, index)))
            .filter(|(deadline, _)| *deadline <= now)
            .min()
            .map(|(_, index)| index)?;

        self.step(index)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty() && self.ready.is_empty()
    }

    fn push_entry(&mut self, tag: T, interval: Duration, kind: Kind, now: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let mut timer = Timer::new(interval);
        timer.start(now);

        self.entries.push(Entry {
            id,
            tag,
            timer,
            kind,
            cancelled: false,
        });
        id
    }

    fn step(&mut self, index: usize) -> Option<Firing<T>> {
        let entry = &self.entries[index];
        let (id, tag, kind, cancelled) = (entry.id, entry.tag, entry.kind, entry.cancelled);

        match kind {
            Kind::Repeating if cancelled => {
                self.entries.remove(index);
                None
            }
            Kind::Repeating => {
                self.entries[index].timer.fire();
                Some(Firing::Tick { id, tag })
            }
            Kind::Sequence { frame, frames } if cancelled || frame >= frames => {
                self.entries.remove(index);
                Some(Firing::Complete { id, tag, cancelled })
            }
            Kind::Sequence { frame, frames } => {
                let entry = &mut self.entries[index];
                entry.kind = Kind::Sequence {
                    frame: frame + 1,
                    frames,
                };
                entry.timer.fire();
                Some(Firing::Frame {
                    id,
                    tag,
                    index: frame,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Animator, Firing};

    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    enum Tag {
        Fade,
        Loop,
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Drains ready firings and every firing due up to `until`, in order.
    fn run_until(animator: &mut Animator<Tag>, until: Duration) -> Vec<Firing<Tag>> {
        let mut firings = Vec::new();
        while let Some(firing) = animator.take_ready() {
            firings.push(firing);
        }
        while let Some(deadline) = animator.next_deadline() {
            if deadline > until {
                break;
            }
            if let Some(firing) = animator.fire_due(deadline) {
                firings.push(firing);
            }
        }
        firings
    }

    #[test]
    fn animation_runs_every_frame_then_completes() {
        let mut animator = Animator::new();
        animator.do_animation(Tag::Fade, 3, ms(100), ms(0));

        let firings = run_until(&mut animator, ms(1_000));
        let frames: Vec<u32> = firings
            .iter()
            .filter_map(|firing| match firing {
                Firing::Frame { index, .. } => Some(*index),
                _ => None,
            })
            .collect();

        assert_eq!(frames, vec![0, 1, 2]);
        assert!(matches!(
            firings.last(),
            Some(Firing::Complete {
                tag: Tag::Fade,
                cancelled: false,
                ..
            })
        ));
        assert!(animator.is_idle());
    }

    #[test]
    fn frame_zero_is_ready_synchronously() {
        let mut animator = Animator::new();
        animator.do_animation(Tag::Fade, 10, ms(100), ms(0));

        assert!(matches!(
            animator.take_ready(),
            Some(Firing::Frame { index: 0, .. })
        ));
        assert_eq!(animator.next_deadline(), Some(ms(100)));
        assert_eq!(animator.fire_due(ms(99)), None);
    }

    #[test]
    fn completion_arrives_one_interval_after_the_last_frame() {
        let mut animator = Animator::new();
        animator.do_animation(Tag::Fade, 10, ms(100), ms(0));

        let before = run_until(&mut animator, ms(999));
        assert_eq!(before.len(), 10);
        assert!(animator.is_active(Tag::Fade));

        let after = run_until(&mut animator, ms(1_000));
        assert!(matches!(after.as_slice(), [Firing::Complete { .. }]));
    }

    #[test]
    fn zero_frame_animation_completes_immediately() {
        let mut animator = Animator::new();
        animator.do_animation(Tag::Fade, 0, ms(100), ms(0));

        assert!(matches!(
            animator.take_ready(),
            Some(Firing::Complete {
                cancelled: false,
                ..
            })
        ));
        assert!(animator.is_idle());
    }

    #[test]
    fn stop_skips_remaining_frames_at_next_firing() {
        let mut animator = Animator::new();
        animator.do_animation(Tag::Fade, 10, ms(100), ms(0));
        let _ = run_until(&mut animator, ms(250));

        animator.stop();
        assert!(!animator.is_active(Tag::Fade));

        let firings = run_until(&mut animator, ms(10_000));
        assert!(matches!(
            firings.as_slice(),
            [Firing::Complete {
                tag: Tag::Fade,
                cancelled: true,
                ..
            }]
        ));
    }

    #[test]
    fn repeating_timer_ticks_until_disabled() {
        let mut animator = Animator::new();
        let id = animator.create_timer(Tag::Loop, ms(50), true, ms(0));

        assert_eq!(animator.take_ready(), Some(Firing::Tick { id, tag: Tag::Loop }));
        assert_eq!(animator.fire_due(ms(50)), Some(Firing::Tick { id, tag: Tag::Loop }));

        animator.disable(id);
        assert_eq!(animator.next_deadline(), None);
        assert_eq!(animator.fire_due(ms(1_000)), None);
    }

    #[test]
    fn stopped_repeating_timer_is_dropped_silently() {
        let mut animator = Animator::new();
        animator.create_timer(Tag::Loop, ms(50), false, ms(0));
        animator.stop();

        assert_eq!(animator.take_ready(), None);
        assert_eq!(animator.fire_due(ms(50)), None);
        assert!(animator.is_idle());
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut animator = Animator::new();
        animator.create_timer(Tag::Loop, ms(30), false, ms(0));
        animator.do_animation(Tag::Fade, 1, ms(100), ms(0));

        let tags: Vec<Tag> = run_until(&mut animator, ms(100))
            .iter()
            .map(|firing| firing.tag())
            .collect();

        // Fade frame 0 (ready), loop at 30/60/90, fade completion at 100.
        assert_eq!(
            tags,
            vec![Tag::Fade, Tag::Loop, Tag::Loop, Tag::Loop, Tag::Fade]
        );
    }
}

use std::time::Duration;

/// What a pending timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Decrement the countdown.
    CountdownTick,
    /// Leave `Advancing` and start the next countdown.
    Advance,
    /// Clear the capture flash.
    FlashEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    due: Duration,
    seq: u64,
    kind: TimerKind,
}

/// Cancellable one-shot timers on a virtual monotonic clock.
///
/// Timers due at the same instant fire in scheduling order.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl TimerQueue {
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn schedule(&mut self, kind: TimerKind, after: Duration) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: self.now + after,
            seq,
            kind,
        });
    }

    pub(crate) fn cancel(&mut self, kind: TimerKind) {
        self.pending.retain(|p| p.kind != kind);
    }

    pub(crate) fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|p| p.kind == kind)
    }

    /// Remove and return the earliest timer due at or before `until`, moving the clock to it.
    pub(crate) fn pop_due(&mut self, until: Duration) -> Option<TimerKind> {
        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| (p.due, p.seq))?;
        let p = self.pending.swap_remove(idx);
        self.now = self.now.max(p.due);
        Some(p.kind)
    }

    /// Move the clock forward without firing anything.
    pub(crate) fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/timer.rs"]
mod tests;

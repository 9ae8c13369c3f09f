//! Cancellable one-shot timer used to debounce fuzzy searches.
//!
//! [`Debouncer`] holds at most one pending value. Scheduling a new value
//! replaces (cancels) the previous one; a pending value fires exactly once,
//! either when polled after its deadline or when flushed.

#[derive(Debug)]
pub struct Debouncer<T> {
    delay_ms: i64,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    deadline_ms: i64,
    value: T,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> i64 {
        self.delay_ms
    }

    /// Start (or restart) the timer with `value`, dropping any pending one.
    pub fn schedule(&mut self, now_ms: i64, value: T) {
        self.pending = Some(Pending {
            deadline_ms: now_ms + self.delay_ms,
            value,
        });
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline_ms(&self) -> Option<i64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    /// Fire the pending value if its deadline has passed.
    pub fn poll(&mut self, now_ms: i64) -> Option<T> {
        match &self.pending {
            Some(p) if now_ms >= p.deadline_ms => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Fire the pending value immediately, regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_deadline() {
        let mut timer = Debouncer::new(100);
        timer.schedule(1_000, "src");
        assert_eq!(timer.poll(1_050), None);
        assert_eq!(timer.poll(1_100), Some("src"));
        assert_eq!(timer.poll(1_200), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_reschedule_cancels_previous() {
        let mut timer = Debouncer::new(100);
        timer.schedule(0, "s");
        timer.schedule(60, "sr");
        assert_eq!(timer.deadline_ms(), Some(160));
        assert_eq!(timer.poll(100), None);
        assert_eq!(timer.poll(160), Some("sr"));
    }

    #[test]
    fn test_cancel() {
        let mut timer = Debouncer::new(100);
        assert!(!timer.cancel());
        timer.schedule(0, 1);
        assert!(timer.cancel());
        assert_eq!(timer.poll(1_000), None);
    }

    #[test]
    fn test_flush_ignores_deadline() {
        let mut timer = Debouncer::new(100);
        timer.schedule(0, 7);
        assert_eq!(timer.flush(), Some(7));
        assert_eq!(timer.flush(), None);
    }
}

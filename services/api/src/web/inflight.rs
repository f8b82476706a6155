//! services/api/src/web/inflight.rs
//!
//! Single-flight bookkeeping for one capability of one user session.
//!
//! A `RequestSlot` admits at most one pending call. The caller holds a
//! `SlotTicket` for the duration of the call and hands the outcome back through
//! `SlotTicket::finish`, which only commits it if nobody reset the slot in the
//! meantime.

use news_guardian_core::error::{GuardianError, GuardianResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

struct SlotInner<T> {
    /// Bumped on every reset so that tickets issued before it can no longer commit.
    generation: u64,
    pending: Option<CancellationToken>,
    latest: Option<T>,
}

pub struct RequestSlot<T> {
    inner: Arc<Mutex<SlotInner<T>>>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotInner {
                generation: 0,
                pending: None,
                latest: None,
            })),
        }
    }
}

impl<T: Clone> RequestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or fails with `Busy` while another call is pending.
    pub fn begin(&self) -> GuardianResult<SlotTicket<T>> {
        let mut inner = lock(&self.inner);
        if inner.pending.is_some() {
            return Err(GuardianError::Busy);
        }

        let token = CancellationToken::new();
        inner.pending = Some(token.clone());
        Ok(SlotTicket {
            generation: inner.generation,
            token,
            slot: Arc::clone(&self.inner),
            finished: false,
        })
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.inner).pending.is_some()
    }

    /// The last successfully committed result.
    pub fn latest(&self) -> Option<T> {
        lock(&self.inner).latest.clone()
    }

    /// Cancels the pending call, if any, and forgets the last result.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        if let Some(token) = inner.pending.take() {
            token.cancel();
        }
        inner.generation += 1;
        inner.latest = None;
    }
}

/// Proof that the holder owns the pending call of a slot.
///
/// Dropping an unfinished ticket releases the slot without touching the last result.
pub struct SlotTicket<T> {
    generation: u64,
    token: CancellationToken,
    slot: Arc<Mutex<SlotInner<T>>>,
    finished: bool,
}

impl<T: Clone> SlotTicket<T> {
    /// Cancelled when the slot is reset.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Releases the slot and commits a successful result.
    ///
    /// Returns `Cancelled` instead of the result if the slot was reset after this
    /// ticket was issued. Errors never overwrite the last committed result.
    pub fn finish(mut self, result: GuardianResult<T>) -> GuardianResult<T> {
        self.finished = true;
        let mut inner = lock(&self.slot);
        if inner.generation != self.generation {
            return Err(GuardianError::Cancelled);
        }

        inner.pending = None;
        if self.token.is_cancelled() {
            return Err(GuardianError::Cancelled);
        }
        if let Ok(value) = &result {
            inner.latest = Some(value.clone());
        }
        result
    }
}

impl<T> Drop for SlotTicket<T> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut inner = lock(&self.slot);
        if inner.generation == self.generation {
            inner.pending = None;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_second_call_is_rejected_while_one_is_pending() {
        let slot: RequestSlot<u32> = RequestSlot::new();
        let ticket = slot.begin().unwrap();
        assert!(slot.is_busy());
        assert!(matches!(slot.begin(), Err(GuardianError::Busy)));

        assert_eq!(ticket.finish(Ok(7)), Ok(7));
        assert!(!slot.is_busy());
        assert_eq!(slot.latest(), Some(7));
    }

    #[test]
    fn failures_keep_the_previous_result() {
        let slot: RequestSlot<u32> = RequestSlot::new();
        slot.begin().unwrap().finish(Ok(1)).unwrap();

        let err = slot
            .begin()
            .unwrap()
            .finish(Err(GuardianError::Analysis("boom".to_string())));
        assert!(err.is_err());
        assert_eq!(slot.latest(), Some(1));
    }

    #[test]
    fn reset_cancels_the_pending_call_and_discards_its_result() {
        let slot: RequestSlot<u32> = RequestSlot::new();
        slot.begin().unwrap().finish(Ok(1)).unwrap();

        let ticket = slot.begin().unwrap();
        let token = ticket.token();
        slot.reset();

        assert!(token.is_cancelled());
        assert!(!slot.is_busy());
        assert_eq!(slot.latest(), None);
        assert_eq!(ticket.finish(Ok(2)), Err(GuardianError::Cancelled));
        assert_eq!(slot.latest(), None);
    }

    #[test]
    fn a_stale_ticket_cannot_release_a_newer_call() {
        let slot: RequestSlot<u32> = RequestSlot::new();
        let stale = slot.begin().unwrap();
        slot.reset();

        let current = slot.begin().unwrap();
        drop(stale);
        assert!(slot.is_busy());

        assert_eq!(current.finish(Ok(3)), Ok(3));
        assert_eq!(slot.latest(), Some(3));
    }

    #[test]
    fn dropping_an_unfinished_ticket_frees_the_slot() {
        let slot: RequestSlot<u32> = RequestSlot::new();
        drop(slot.begin().unwrap());
        assert!(!slot.is_busy());
        assert!(slot.begin().is_ok());
    }
}

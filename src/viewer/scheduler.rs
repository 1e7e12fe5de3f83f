//! Single-flight draw scheduling.
//!
//! At most one draw runs per grid. A request arriving while a draw is in
//! flight replaces any request already waiting; when the running draw
//! finishes, the waiting request (if any) runs next. Requests are never
//! queued behind each other.

use std::cell::Cell;

/// Parameters of one draw request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawRequest {
    /// Redraw even when the viewport did not change
    pub force: bool,
    /// Keep the scroll anchor of the previous row count
    pub preserve_scroll: bool,
}

impl DrawRequest {
    pub const fn new(force: bool, preserve_scroll: bool) -> Self {
        Self {
            force,
            preserve_scroll,
        }
    }

    /// Combine a waiting request with a newer one. The newer request's
    /// parameters win, except that a pending forced redraw is never dropped.
    #[must_use]
    pub const fn merge(self, newer: Self) -> Self {
        Self {
            force: self.force || newer.force,
            preserve_scroll: newer.preserve_scroll,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    Drawing { pending: Option<DrawRequest> },
}

#[derive(Debug, Default)]
pub struct DrawScheduler {
    state: Cell<State>,
}

impl DrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state.get(), State::Drawing { .. })
    }

    /// Request a draw. Returns the request to run now, or `None` when a draw
    /// is already in flight and the request was left waiting behind it.
    pub fn begin(&self, request: DrawRequest) -> Option<DrawRequest> {
        match self.state.get() {
            State::Idle => {
                self.state.set(State::Drawing { pending: None });
                Some(request)
            }
            State::Drawing { pending } => {
                let pending = pending.map_or(request, |p| p.merge(request));
                self.state.set(State::Drawing {
                    pending: Some(pending),
                });
                None
            }
        }
    }

    /// Called when the running draw completes. Returns the waiting request
    /// to run next; goes idle when there is none.
    pub fn finish(&self) -> Option<DrawRequest> {
        match self.state.get() {
            State::Drawing {
                pending: Some(next),
            } => {
                self.state.set(State::Drawing { pending: None });
                Some(next)
            }
            State::Drawing { pending: None } | State::Idle => {
                self.state.set(State::Idle);
                None
            }
        }
    }

    /// Drop any in-flight state, e.g. when a draw future is abandoned.
    pub fn reset(&self) {
        self.state.set(State::Idle);
    }
}

/// Puts the scheduler back to idle if the draw loop holding it is dropped
/// before finishing.
pub(crate) struct IdleOnDrop<'a>(pub(crate) &'a DrawScheduler);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.reset();
    }
}

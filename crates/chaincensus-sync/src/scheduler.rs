//! Pipelined request scheduling.
//!
//! Chain-sync round trips dominate wall-clock time when requests are issued
//! one at a time, so the client keeps a fixed window of `nextBlock` requests
//! in flight and tops it up by exactly one per consumed reply. The scheduler
//! tracks the window as an explicit state machine; the client owns the
//! sockets and just asks it what to do next.

/// Number of `nextBlock` requests kept in flight while streaming.
pub const PIPELINE_WINDOW: usize = 100;

/// Phase of the chain-sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// `findIntersection` sent, reply not yet consumed.
    AwaitingIntersection,
    /// Window full, one replacement request per consumed reply.
    Streaming,
    /// Boundary reached: consume outstanding replies, issue nothing.
    Draining,
    /// All outstanding replies consumed.
    Done,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::AwaitingIntersection => "awaiting-intersection",
            Self::Streaming => "streaming",
            Self::Draining => "draining",
            Self::Done => "done",
        })
    }
}

/// Tracks the in-flight request window through the session's phases.
#[derive(Debug)]
pub struct PipelineScheduler {
    window: usize,
    outstanding: usize,
    state: SyncState,
}

impl PipelineScheduler {
    pub fn new(window: usize) -> Self {
        Self { window, outstanding: 0, state: SyncState::AwaitingIntersection }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn is_done(&self) -> bool {
        self.state == SyncState::Done
    }

    /// Enter the streaming phase. Returns how many `nextBlock` requests to
    /// issue up front to fill the window.
    pub fn start_streaming(&mut self) -> usize {
        self.state = SyncState::Streaming;
        self.outstanding = self.window;
        self.window
    }

    /// Account for one consumed `nextBlock` reply.
    ///
    /// `boundary_reached` is the cursor's verdict after applying the reply.
    /// Returns `true` when the caller should issue one replacement request;
    /// never more than one, so `outstanding` can never exceed the window.
    pub fn on_reply(&mut self, boundary_reached: bool) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        if boundary_reached && self.state == SyncState::Streaming {
            self.state = SyncState::Draining;
        }
        match self.state {
            SyncState::Streaming => {
                self.outstanding += 1;
                true
            }
            SyncState::Draining => {
                if self.outstanding == 0 {
                    self.state = SyncState::Done;
                }
                false
            }
            SyncState::AwaitingIntersection | SyncState::Done => false,
        }
    }
}

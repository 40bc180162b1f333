//! Client-side polling state machine for preview completion
//!
//! Cooperative single-consumer polling over the preview store: one immediate
//! read, then a read every `POLL_INTERVAL` until a terminal status appears
//! or the `POLL_CEILING` elapses. Exactly one pipeline run writes a given
//! preview, so correctness needs only eventual consistency of the store, not
//! any ordering between concurrent writers.

use std::time::Duration;

use sqlx::SqlitePool;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::models::{Preview, PreviewStatus};

/// Fixed delay between reads while the preview is still generating
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Ceiling after which polling stops regardless of status
pub const POLL_CEILING: Duration = Duration::from_secs(180);

/// Poller view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Before the first read
    Loading,
    /// Preview absent or still generating
    Generating,
    /// Terminal: preview completed
    Ready,
    /// Terminal: preview generation failed
    Failed,
    /// Terminal: ceiling elapsed with no terminal status observed
    TimedOut,
}

/// Terminal result of one polling run
#[derive(Debug)]
pub enum PollOutcome {
    /// Preview completed; snapshot of the ready record
    Ready(Preview),
    /// Preview generation failed; snapshot of the failed record
    Failed(Preview),
    /// Ceiling elapsed with no terminal status observed
    TimedOut,
    /// Caller tore the poller down (e.g., page navigation)
    Cancelled,
}

/// Polls the newest preview row for one lead until terminal or timed out
pub struct PreviewPoller {
    db: SqlitePool,
    lead_id: Uuid,
    state: PollState,
    reads_issued: u32,
}

impl PreviewPoller {
    pub fn new(db: SqlitePool, lead_id: Uuid) -> Self {
        Self { db, lead_id, state: PollState::Loading, reads_issued: 0 }
    }

    /// Current view state
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Number of store reads issued so far
    pub fn reads_issued(&self) -> u32 {
        self.reads_issued
    }

    /// Run until a terminal outcome
    ///
    /// No reads are issued after a terminal state is reached; cancelling the
    /// token tears down both timers immediately.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<PollOutcome> {
        let deadline = Instant::now() + POLL_CEILING;

        loop {
            self.reads_issued += 1;
            let snapshot = db::previews::latest_for_lead(&self.db, self.lead_id).await?;

            match snapshot {
                Some(preview) if preview.status == PreviewStatus::Ready => {
                    self.transition_to(PollState::Ready);
                    return Ok(PollOutcome::Ready(preview));
                }
                Some(preview) if preview.status == PreviewStatus::Failed => {
                    self.transition_to(PollState::Failed);
                    return Ok(PollOutcome::Failed(preview));
                }
                // Absent or still generating: keep polling.
                _ => self.transition_to(PollState::Generating),
            }

            let next_read = Instant::now() + POLL_INTERVAL;

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(lead_id = %self.lead_id, "Polling cancelled");
                    return Ok(PollOutcome::Cancelled);
                }
                _ = tokio::time::sleep_until(deadline) => {
                    self.transition_to(PollState::TimedOut);
                    return Ok(PollOutcome::TimedOut);
                }
                _ = tokio::time::sleep_until(next_read) => {}
            }
        }
    }

    fn transition_to(&mut self, new_state: PollState) {
        if self.state != new_state {
            tracing::debug!(
                lead_id = %self.lead_id,
                old_state = ?self.state,
                new_state = ?new_state,
                "Poller state transition"
            );
            self.state = new_state;
        }
    }
}

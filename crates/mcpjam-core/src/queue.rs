//! In-memory FIFO of pending canvas commands.
//!
//! Producers (HTTP dispatch, RPC tools) see the queue only as a
//! [`CommandSink`]; the pull endpoint sees it as a [`CommandSource`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::command::Command;

/// Write side of the queue.
pub trait CommandSink: Send + Sync {
    /// Append a command to the tail.
    fn enqueue(&self, cmd: Command);
}

/// Read side of the queue.
pub trait CommandSource: Send + Sync {
    /// Remove and return up to `limit` commands from the head, oldest first.
    /// `None` drains everything. Never blocks on an empty queue.
    fn pull(&self, limit: Option<usize>) -> Vec<Command>;

    /// Number of commands currently waiting.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unbounded FIFO guarded by a mutex held only for the append/drain itself.
#[derive(Debug, Default)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<Command>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the deque half-mutated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Command>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommandSink for CommandQueue {
    fn enqueue(&self, cmd: Command) {
        let op = cmd.op();
        let depth = {
            let mut queue = self.lock();
            queue.push_back(cmd);
            queue.len()
        };
        debug!(%op, depth, "Command enqueued");
    }
}

impl CommandSource for CommandQueue {
    fn pull(&self, limit: Option<usize>) -> Vec<Command> {
        let (out, remaining) = {
            let mut queue = self.lock();
            let n = limit.map_or(queue.len(), |l| l.min(queue.len()));
            let out: Vec<Command> = queue.drain(..n).collect();
            (out, queue.len())
        };
        if !out.is_empty() {
            debug!(pulled = out.len(), remaining, "Commands pulled");
        }
        out
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

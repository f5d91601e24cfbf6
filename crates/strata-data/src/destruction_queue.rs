// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Teardown deferred until the GPU is done with an object.
//!
//! A destroyed object may still be read by work the GPU has not finished. The
//! queue keeps it, together with the completion token of the last submission
//! that could use it, and only runs its teardown once that token is reached.

use std::collections::VecDeque;
use std::fmt;
use strata_core::{BackendError, CompletionToken};
use thiserror::Error;

/// The action that releases a native object.
pub type TeardownFn<T> = Box<dyn FnOnce(T) -> Result<(), BackendError> + Send>;

/// Progress of the GPU with respect to one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// The GPU finished every submission up to the token.
    Complete,
    /// The token is not reached yet.
    Pending,
    /// The device is gone.
    DeviceLost,
}

/// Reports GPU progress to a [`DestructionQueue`].
pub trait CompletionSource {
    /// The status of `token`. Must not block.
    fn token_status(&self, token: CompletionToken) -> TokenStatus;
}

impl<F> CompletionSource for F
where
    F: Fn(CompletionToken) -> TokenStatus,
{
    fn token_status(&self, token: CompletionToken) -> TokenStatus {
        self(token)
    }
}

/// A failure while draining a queue.
#[derive(Debug, Error)]
pub enum DestructionError {
    /// The device was lost; every remaining entry was torn down without waiting.
    #[error("Device lost while draining the {queue} queue ({torn_down} entries force-torn-down)")]
    DeviceLost {
        /// The queue's name.
        queue: &'static str,
        /// Entries force-torn-down.
        torn_down: usize,
    },
    /// A teardown of a completed entry failed.
    #[error("Teardown failed in the {queue} queue")]
    TeardownFailed {
        /// The queue's name.
        queue: &'static str,
        /// The backend failure.
        #[source]
        source: BackendError,
    },
}

struct Entry<T> {
    object: T,
    /// `None` until the frame that enqueued the entry is submitted.
    token: Option<CompletionToken>,
    teardown: TeardownFn<T>,
}

/// A FIFO of objects waiting for their completion token.
///
/// Entries are torn down strictly in enqueue order. Tokens of a single
/// in-order queue are monotonic, so the scan stops at the first entry whose
/// token is not reached yet.
pub struct DestructionQueue<T> {
    name: &'static str,
    entries: VecDeque<Entry<T>>,
    torn_down: u64,
}

impl<T> fmt::Debug for DestructionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestructionQueue")
            .field("name", &self.name)
            .field("len", &self.entries.len())
            .field("pending", &self.pending_count())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl<T> DestructionQueue<T> {
    /// Creates an empty queue. `name` only appears in logs and errors.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: VecDeque::new(),
            torn_down: 0,
        }
    }

    /// Enqueues an object whose completion token is already known.
    pub fn enqueue(&mut self, object: T, token: CompletionToken, teardown: TeardownFn<T>) {
        self.entries.push_back(Entry {
            object,
            token: Some(token),
            teardown,
        });
    }

    /// Enqueues an object destroyed during the frame being recorded.
    ///
    /// Its token is not known until the frame is submitted; see
    /// [`assign_pending`](Self::assign_pending). Until then the entry blocks
    /// every entry behind it.
    pub fn enqueue_pending(&mut self, object: T, teardown: TeardownFn<T>) {
        self.entries.push_back(Entry {
            object,
            token: None,
            teardown,
        });
    }

    /// Stamps every pending entry with `token`. Returns how many were stamped.
    pub fn assign_pending(&mut self, token: CompletionToken) -> usize {
        let mut count = 0;
        for entry in self.entries.iter_mut().rev() {
            if entry.token.is_some() {
                break;
            }
            entry.token = Some(token);
            count += 1;
        }
        count
    }

    /// Tears down every entry at the front of the queue whose token `source`
    /// reports complete. Never blocks.
    ///
    /// Returns the number of entries torn down. On device loss every remaining
    /// entry is torn down without waiting, teardown errors are ignored, and
    /// [`DestructionError::DeviceLost`] is returned.
    pub fn process_completed(
        &mut self,
        source: &impl CompletionSource,
    ) -> Result<usize, DestructionError> {
        let mut count = 0;
        while let Some(token) = self.entries.front().and_then(|entry| entry.token) {
            match source.token_status(token) {
                TokenStatus::Pending => break,
                TokenStatus::DeviceLost => {
                    let torn_down = self.force_drain_ignoring_errors();
                    return Err(DestructionError::DeviceLost {
                        queue: self.name,
                        torn_down,
                    });
                }
                TokenStatus::Complete => {
                    let Some(entry) = self.entries.pop_front() else {
                        break;
                    };
                    self.torn_down += 1;
                    count += 1;
                    (entry.teardown)(entry.object).map_err(|source| {
                        DestructionError::TeardownFailed {
                            queue: self.name,
                            source,
                        }
                    })?;
                }
            }
        }
        if count > 0 {
            log::debug!("Tore down {} deferred {} object(s)", count, self.name);
        }
        Ok(count)
    }

    /// Tears down every entry now, whatever its token.
    ///
    /// Only valid once the GPU is idle or gone. Every entry is torn down even if
    /// some teardowns fail; the first failure is returned.
    pub fn force_drain(&mut self) -> Result<usize, DestructionError> {
        let mut count = 0;
        let mut first_error = None;
        while let Some(entry) = self.entries.pop_front() {
            self.torn_down += 1;
            count += 1;
            if let Err(source) = (entry.teardown)(entry.object) {
                log::error!("Teardown failed while draining the {} queue: {}", self.name, source);
                first_error.get_or_insert(source);
            }
        }
        match first_error {
            Some(source) => Err(DestructionError::TeardownFailed {
                queue: self.name,
                source,
            }),
            None => Ok(count),
        }
    }

    fn force_drain_ignoring_errors(&mut self) -> usize {
        let mut count = 0;
        while let Some(entry) = self.entries.pop_front() {
            self.torn_down += 1;
            count += 1;
            let _ = (entry.teardown)(entry.object);
        }
        count
    }

    /// The queue's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The number of entries waiting.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of entries still waiting for their frame to be submitted.
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .rev()
            .take_while(|entry| entry.token.is_none())
            .count()
    }

    /// The number of entries torn down over the queue's lifetime.
    pub fn torn_down_total(&self) -> u64 {
        self.torn_down
    }
}

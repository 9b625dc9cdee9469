//! Ordering of pipelined responses.
//!
//! Responses are created in request order but finish in any order. The queue
//! keeps one slot per response: the active slot owns the transport and its
//! bytes go out as soon as they arrive, the bytes of waiting slots are staged
//! until ownership reaches them. A slot flagged last closes the queue once it
//! is flushed; nothing queued behind it is ever written.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;

use bytes::Bytes;
use tracing::trace;

use crate::message::WriteState;

#[derive(Debug)]
struct ResponseSlot {
    id: u64,
    staged: VecDeque<Bytes>,
    finished: bool,
    is_last: bool,
    write_state: triomphe::Arc<WriteState>,
}

/// Output of [`ResponseQueue::poll_flush`].
#[derive(Debug, Default)]
pub(crate) struct Flush {
    /// bytes to write, in wire order
    pub(crate) bytes: Vec<Bytes>,
    /// ids of the responses completely handed over
    pub(crate) retired: Vec<u64>,
    /// the transport must be shut down after `bytes`
    pub(crate) close: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ResponseQueue {
    active: Option<ResponseSlot>,
    waiting: VecDeque<ResponseSlot>,
    closed: bool,
}

impl ResponseQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a slot for a new response, behind every slot already queued.
    pub(crate) fn enqueue(&mut self, id: u64, is_last: bool) -> triomphe::Arc<WriteState> {
        let write_state = triomphe::Arc::new(WriteState::default());
        let slot = ResponseSlot { id, staged: VecDeque::new(), finished: false, is_last, write_state: write_state.clone() };

        if self.active.is_none() && self.waiting.is_empty() && !self.closed {
            write_state.owner.store(true, Ordering::Release);
            trace!(id, "response owns the transport");
            self.active = Some(slot);
        } else {
            self.waiting.push_back(slot);
        }
        write_state
    }

    pub(crate) fn stage(&mut self, id: u64, bytes: Bytes) {
        match self.slot_mut(id) {
            Some(slot) if !slot.finished => slot.staged.push_back(bytes),
            Some(_) => trace!(id, "bytes for a finished response, dropped"),
            None => trace!(id, "bytes for an unknown response, dropped"),
        }
    }

    /// Marks a response complete. `last` only ever adds the last flag.
    pub(crate) fn finish(&mut self, id: u64, last: bool) {
        if let Some(slot) = self.slot_mut(id) {
            slot.finished = true;
            slot.is_last |= last;
        }
    }

    /// Marks a response dropped unfinished: what it staged is written, then
    /// the connection closes since its framing cannot be completed.
    pub(crate) fn abandon(&mut self, id: u64) {
        if let Some(slot) = self.slot_mut(id) {
            slot.finished = true;
            slot.is_last = true;
        }
    }

    /// Flags the most recently queued response as the last one.
    ///
    /// Returns false when nothing is queued.
    pub(crate) fn mark_last(&mut self) -> bool {
        match self.waiting.back_mut().or(self.active.as_mut()) {
            Some(slot) => {
                slot.is_last = true;
                true
            }
            None => false,
        }
    }

    /// Collects everything writable now, rotating ownership as responses complete.
    pub(crate) fn poll_flush(&mut self) -> Flush {
        let mut flush = Flush::default();

        loop {
            if self.active.is_none() {
                if self.closed {
                    break;
                }
                let Some(slot) = self.waiting.pop_front() else { break };
                slot.write_state.owner.store(true, Ordering::Release);
                trace!(id = slot.id, staged = slot.staged.len(), "response owns the transport");
                self.active = Some(slot);
            }

            let Some(active) = self.active.as_mut() else { break };

            for bytes in active.staged.drain(..) {
                let _ = active.write_state.queued.fetch_update(Ordering::AcqRel, Ordering::Acquire, |queued| {
                    Some(queued.saturating_sub(bytes.len()))
                });
                flush.bytes.push(bytes);
            }

            if !active.finished {
                break;
            }

            let Some(slot) = self.active.take() else { break };
            slot.write_state.owner.store(false, Ordering::Release);
            flush.retired.push(slot.id);

            if slot.is_last {
                trace!(id = slot.id, dropped = self.waiting.len(), "last response flushed, closing");
                self.closed = true;
                flush.close = true;
                break;
            }
        }

        flush
    }

    /// Number of responses not handed over yet.
    pub(crate) fn len(&self) -> usize {
        self.waiting.len() + usize::from(self.active.is_some())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    fn slot_mut(&mut self, id: u64) -> Option<&mut ResponseSlot> {
        match self.active.as_mut() {
            Some(active) if active.id == id => Some(active),
            _ => self.waiting.iter_mut().find(|slot| slot.id == id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(flush: &Flush) -> String {
        flush.bytes.iter().map(|bytes| std::str::from_utf8(bytes).unwrap()).collect()
    }

    #[test]
    fn later_response_waits_for_earlier() {
        let mut queue = ResponseQueue::new();
        let first = queue.enqueue(1, false);
        let second = queue.enqueue(2, false);
        assert!(first.owner.load(Ordering::Acquire));
        assert!(!second.owner.load(Ordering::Acquire));

        // the second response completes first
        queue.stage(2, Bytes::from_static(b"B"));
        queue.finish(2, false);
        let flush = queue.poll_flush();
        assert!(flush.bytes.is_empty());
        assert!(flush.retired.is_empty());

        queue.stage(1, Bytes::from_static(b"A1"));
        assert_eq!(text(&queue.poll_flush()), "A1");

        queue.stage(1, Bytes::from_static(b"A2"));
        queue.finish(1, false);
        let flush = queue.poll_flush();
        assert_eq!(text(&flush), "A2B");
        assert_eq!(flush.retired, vec![1, 2]);
        assert!(!flush.close);
        assert!(queue.is_empty());
        assert!(!first.owner.load(Ordering::Acquire));
    }

    #[test]
    fn ownership_passes_to_unfinished_slot() {
        let mut queue = ResponseQueue::new();
        queue.enqueue(1, false);
        let second = queue.enqueue(2, false);
        queue.stage(2, Bytes::from_static(b"B1"));
        queue.finish(1, false);

        let flush = queue.poll_flush();
        assert_eq!(text(&flush), "B1");
        assert_eq!(flush.retired, vec![1]);
        assert!(second.owner.load(Ordering::Acquire));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn last_slot_closes_queue() {
        let mut queue = ResponseQueue::new();
        queue.enqueue(1, true);
        queue.enqueue(2, false);
        queue.stage(2, Bytes::from_static(b"never"));
        queue.finish(2, false);
        queue.stage(1, Bytes::from_static(b"bye"));
        queue.finish(1, false);

        let flush = queue.poll_flush();
        assert_eq!(text(&flush), "bye");
        assert!(flush.close);
        assert!(queue.is_closed());
        assert!(queue.poll_flush().bytes.is_empty());
    }

    #[test]
    fn finish_can_add_last_flag() {
        let mut queue = ResponseQueue::new();
        queue.enqueue(1, false);
        queue.enqueue(2, false);
        queue.finish(1, true);
        let flush = queue.poll_flush();
        assert!(flush.close);
        assert_eq!(flush.retired, vec![1]);
    }

    #[test]
    fn abandon_and_mark_last() {
        let mut queue = ResponseQueue::new();
        assert!(!queue.mark_last());

        queue.enqueue(1, false);
        queue.stage(1, Bytes::from_static(b"partial"));
        queue.abandon(1);
        let flush = queue.poll_flush();
        assert_eq!(text(&flush), "partial");
        assert!(flush.close);

        let mut queue = ResponseQueue::new();
        queue.enqueue(1, false);
        queue.enqueue(2, false);
        assert!(queue.mark_last());
        queue.finish(1, false);
        queue.finish(2, false);
        let flush = queue.poll_flush();
        assert_eq!(flush.retired, vec![1, 2]);
        assert!(flush.close);
    }

    #[test]
    fn queued_bytes_are_released() {
        let mut queue = ResponseQueue::new();
        let state = queue.enqueue(1, false);
        state.queued.fetch_add(5, Ordering::AcqRel);
        queue.stage(1, Bytes::from_static(b"hello"));
        queue.poll_flush();
        assert_eq!(state.queued.load(Ordering::Acquire), 0);
    }
}

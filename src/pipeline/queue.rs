// src/pipeline/queue.rs

//! Bounded queues between pipeline stages.
//!
//! A queue is a [`crossbeam_channel::bounded`] channel. Sending to a full
//! queue blocks the sender; that is the only flow control between stages.
//! Receiving from an empty queue blocks the receiver.
//!
//! [`crossbeam_channel::bounded`]: https://docs.rs/crossbeam-channel/0.5/crossbeam_channel/fn.bounded.html

use crate::data::event::Event;

use ::crossbeam_channel;

/// Default capacity of a queue, in events.
pub const QUEUE_CAPACITY: usize = 0x40000;

/// Sending end of a queue of [`Event`]s.
pub type EventSender = crossbeam_channel::Sender<Event>;

/// Receiving end of a queue of [`Event`]s.
pub type EventReceiver = crossbeam_channel::Receiver<Event>;

/// Create a queue holding at most `capacity` events.
pub fn queue(capacity: usize) -> (EventSender, EventReceiver) {
    crossbeam_channel::bounded(capacity)
}
